//! Engine configuration.
//!
//! Every struct implements `Default` and deserializes with `#[serde(default)]`
//! so a JSON config only needs the fields it overrides.
//!
//! ```
//! use riposte_core::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{
//!     "tick_rate": 30,
//!     "input": { "buffer_window_frames": 8 }
//! }"#).unwrap();
//!
//! assert_eq!(config.tick_rate, 30);
//! assert_eq!(config.input.buffer_window_frames, Some(8));
//! assert_eq!(config.input.released_recently_frames, 6);
//! ```

use drift::MotionConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default primary tick rate (Hz).
pub const DEFAULT_TICK_RATE: u32 = 60;

/// Input edge and command buffering parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Frames after a release during which `released_recently` stays true.
    pub released_recently_frames: u32,
    /// Buffered commands older than this many frames are dropped.
    pub buffer_window_frames: Option<u32>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            released_recently_frames: 6,
            buffer_window_frames: None,
        }
    }
}

/// Pass frequencies relative to the primary tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// A secondary pass runs every `secondary_divisor` primary ticks.
    pub secondary_divisor: u32,
    /// A tertiary pass runs every `tertiary_divisor` primary ticks.
    pub tertiary_divisor: u32,
    /// Upper bound on primary ticks run by a single `advance` call.
    pub max_catch_up: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            secondary_divisor: 2,
            tertiary_divisor: 6,
            max_catch_up: 8,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Primary ticks per second. Also converts second-based durations to frames.
    pub tick_rate: u32,
    /// Input parameters.
    pub input: InputConfig,
    /// Pass scheduling.
    pub schedule: ScheduleConfig,
    /// Movement compositor parameters. `dt` is overwritten from `tick_rate`.
    pub motion: MotionConfig,
    /// Emit a movement sample output for every actor every tick.
    pub emit_motion_samples: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            input: InputConfig::default(),
            schedule: ScheduleConfig::default(),
            motion: MotionConfig::default(),
            emit_motion_samples: true,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the JSON is malformed or a rate is zero.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks rates and divisors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for zero tick rate or divisors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.schedule.secondary_divisor == 0 {
            return Err(ConfigError::ZeroDivisor {
                name: "secondary_divisor",
            });
        }
        if self.schedule.tertiary_divisor == 0 {
            return Err(ConfigError::ZeroDivisor {
                name: "tertiary_divisor",
            });
        }
        Ok(())
    }

    /// Seconds per primary tick.
    #[must_use]
    pub fn dt(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let rate = self.tick_rate.max(1) as f32;
        1.0 / rate
    }

    /// Motion config with `dt` derived from the tick rate.
    #[must_use]
    pub fn motion_config(&self) -> MotionConfig {
        MotionConfig {
            dt: self.dt(),
            ..self.motion.clone()
        }
    }
}
