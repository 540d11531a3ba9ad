//! Tuning parameters for the compositor pass.

use serde::{Deserialize, Serialize};

/// Fixed timestep matching a 60 Hz primary tick.
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

/// Configuration for a [`Compositor`](crate::Compositor).
///
/// All values have sensible defaults; JSON configs may override any subset.
///
/// # Example
///
/// ```
/// use drift::MotionConfig;
///
/// let config: MotionConfig = serde_json::from_str(r#"{ "max_speed": 4.0 }"#).unwrap();
/// assert!((config.max_speed - 4.0).abs() < f32::EPSILON);
/// assert!((config.kinematic_share - 0.2).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Seconds per tick.
    pub dt: f32,
    /// Upper bound on base locomotion speed (m/s).
    pub max_speed: f32,
    /// Base locomotion acceleration (m/s²).
    pub acceleration: f32,
    /// Dynamic magnitude above which dynamic forces dominate.
    pub force_threshold: f32,
    /// Share of the kinematic target kept when dynamic forces dominate.
    pub kinematic_share: f32,
    /// Fraction of the previous velocity retained each tick (0 = snap to target).
    pub momentum_retention: f32,
    /// Minimum previous speed for reversal damping to engage.
    pub reversal_min_speed: f32,
    /// Dot product (previous direction vs facing) below which a reversal is detected.
    pub reversal_dot_threshold: f32,
    /// Scales acceleration while damping a reversal.
    pub inertia_scale: f32,
    /// Exponential friction coefficient (1/s).
    pub friction: f32,
    /// Apply friction every tick, not only while locomotion is idle.
    pub global_friction: bool,
    /// Body mass used for the reported momentum.
    pub mass: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            max_speed: 6.0,
            acceleration: 40.0,
            force_threshold: 2.0,
            kinematic_share: 0.2,
            momentum_retention: 0.0,
            reversal_min_speed: 3.0,
            reversal_dot_threshold: -0.5,
            inertia_scale: 0.5,
            friction: 0.0,
            global_friction: false,
            mass: 1.0,
        }
    }
}

impl MotionConfig {
    /// Returns a config with a custom timestep.
    #[must_use]
    pub fn with_dt(dt: f32) -> Self {
        Self {
            dt,
            ..Default::default()
        }
    }
}
