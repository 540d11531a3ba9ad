//! Base locomotion input and vector helpers.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Locomotion request for one body during one tick.
///
/// `facing` is the direction the body wants to move in, `desired_speed` how
/// fast. `unrestricted` is false while something (usually an action) roots
/// free movement; directives still apply in that case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Locomotion {
    /// Facing / movement direction (normalized on use).
    pub facing: Vec3,
    /// Requested speed in m/s before modifiers.
    pub desired_speed: f32,
    /// Whether free locomotion is currently permitted.
    pub unrestricted: bool,
}

impl Locomotion {
    /// Locomotion moving along `facing` at `speed`.
    #[must_use]
    pub fn moving(facing: Vec3, speed: f32) -> Self {
        Self {
            facing,
            desired_speed: speed,
            unrestricted: true,
        }
    }

    /// Idle locomotion facing `facing`.
    #[must_use]
    pub fn idle(facing: Vec3) -> Self {
        Self::moving(facing, 0.0)
    }

    /// Returns a copy with free locomotion disabled.
    #[must_use]
    pub fn rooted(mut self) -> Self {
        self.unrestricted = false;
        self
    }

    /// True when no movement is requested.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.desired_speed <= f32::EPSILON
    }

    /// Normalized facing, falling back to +Z for a zero vector.
    #[must_use]
    pub fn facing_dir(&self) -> Vec3 {
        let dir = self.facing.normalize_or_zero();
        if dir == Vec3::ZERO {
            Vec3::Z
        } else {
            dir
        }
    }
}

impl Default for Locomotion {
    fn default() -> Self {
        Self::idle(Vec3::Z)
    }
}

/// Moves `current` toward `target` by at most `max_delta`.
///
/// # Example
///
/// ```
/// use drift::move_toward;
/// use glam::Vec3;
///
/// let v = move_toward(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 2.0);
/// assert_eq!(v, Vec3::new(2.0, 0.0, 0.0));
/// ```
#[must_use]
pub fn move_toward(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance <= f32::EPSILON {
        target
    } else {
        current + delta / distance * max_delta
    }
}
