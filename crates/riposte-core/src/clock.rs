//! Fixed-rate clock driving the primary, secondary and tertiary passes.
//!
//! Elapsed wall time is accumulated in integer nanoseconds so that, for
//! example, one second at 60 Hz always yields exactly 60 primary ticks.
//! Secondary and tertiary passes run on every `n`th primary tick.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ScheduleConfig;

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Passes that became due during one [`FixedClock::advance`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSchedule {
    /// Primary ticks to run (the action engine runs on these).
    pub primary: u32,
    /// Secondary passes due.
    pub secondary: u32,
    /// Tertiary passes due.
    pub tertiary: u32,
}

/// Accumulating fixed-step clock.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use riposte_core::clock::FixedClock;
/// use riposte_core::config::ScheduleConfig;
///
/// let mut clock = FixedClock::new(60, ScheduleConfig { max_catch_up: 120, ..Default::default() });
/// let passes = clock.advance(Duration::from_secs(1));
/// assert_eq!(passes.primary, 60);
/// assert_eq!(passes.secondary, 30);
/// assert_eq!(passes.tertiary, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedClock {
    step_nanos: u64,
    schedule: ScheduleConfig,
    accumulator: u64,
    ticks: u64,
}

impl FixedClock {
    /// Creates a clock ticking `tick_rate` times per second.
    #[must_use]
    pub fn new(tick_rate: u32, schedule: ScheduleConfig) -> Self {
        Self {
            step_nanos: NANOS_PER_SECOND / u64::from(tick_rate.max(1)),
            schedule,
            accumulator: 0,
            ticks: 0,
        }
    }

    /// Accumulates `elapsed` and returns the passes now due.
    ///
    /// At most `max_catch_up` primary ticks run per call; the surplus is
    /// discarded so a long stall does not trigger a burst of catch-up ticks.
    pub fn advance(&mut self, elapsed: Duration) -> PassSchedule {
        let elapsed_nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.accumulator = self.accumulator.saturating_add(elapsed_nanos);

        let mut passes = PassSchedule::default();
        while self.accumulator >= self.step_nanos {
            if passes.primary >= self.schedule.max_catch_up {
                warn!(
                    dropped_nanos = self.accumulator,
                    "clock fell behind, discarding accumulated time"
                );
                self.accumulator = 0;
                break;
            }
            self.accumulator -= self.step_nanos;
            self.ticks += 1;
            passes.primary += 1;
            if self.ticks % u64::from(self.schedule.secondary_divisor.max(1)) == 0 {
                passes.secondary += 1;
            }
            if self.ticks % u64::from(self.schedule.tertiary_divisor.max(1)) == 0 {
                passes.tertiary += 1;
            }
        }
        passes
    }

    /// Primary ticks elapsed since creation.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Length of one primary tick.
    #[must_use]
    pub fn step(&self) -> Duration {
        Duration::from_nanos(self.step_nanos)
    }
}
