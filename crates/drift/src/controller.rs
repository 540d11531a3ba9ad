//! Movement controllers: the per-tick velocity sources behind directives.
//!
//! A controller is polymorphic over two axes:
//!
//! - [`ControllerKind`]: kinematic (a velocity to adopt) or dynamic (a force
//!   to add)
//! - [`BlendMode`]: how the contribution composes with lower-priority ones
//!
//! The compositor asks each active controller for its velocity once per tick,
//! in descending priority order.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::owner::OwnerId;

/// Whether a controller contributes a target velocity or a force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerKind {
    /// Velocity the body should adopt.
    Kinematic,
    /// Force-like contribution summed on top of the kinematic result.
    Dynamic,
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kinematic => write!(f, "Kinematic"),
            Self::Dynamic => write!(f, "Dynamic"),
        }
    }
}

/// How a contribution composes with the running target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendMode {
    /// Replace the target outright and stop blending lower priorities.
    Ignore,
    /// Add `velocity * weight` to the target.
    Blend,
    /// Interpolate the target toward `velocity` by `weight`.
    AllowOverride,
    /// Add the raw velocity (the only mode summed for dynamic controllers).
    Additive,
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => write!(f, "Ignore"),
            Self::Blend => write!(f, "Blend"),
            Self::AllowOverride => write!(f, "AllowOverride"),
            Self::Additive => write!(f, "Additive"),
        }
    }
}

/// Read-only inputs handed to a controller when it is evaluated.
#[derive(Debug, Clone, Copy)]
pub struct ControllerContext {
    /// Owner of the directive being evaluated.
    pub owner: OwnerId,
    /// Compositor frame counter.
    pub frame: u64,
    /// Seconds per tick.
    pub dt: f32,
    /// Normalized facing of the body.
    pub facing: Vec3,
    /// Body velocity at the end of the previous tick.
    pub previous_velocity: Vec3,
}

impl ControllerContext {
    /// Converts a facing-local vector (x = right, y = up, z = forward) to world space.
    #[must_use]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        let forward = self.facing;
        let right = Vec3::Y.cross(forward).normalize_or_zero();
        right * local.x + Vec3::Y * local.y + forward * local.z
    }
}

/// A source of velocity for one directive.
///
/// Implementations must be deterministic: the same sequence of contexts must
/// produce the same sequence of velocities.
pub trait MovementController: Send + Sync {
    /// Kinematic or dynamic.
    fn kind(&self) -> ControllerKind;

    /// Composition mode.
    fn blend_mode(&self) -> BlendMode;

    /// Higher priorities are blended first.
    fn priority(&self) -> i32;

    /// Blend weight, used by `Blend` and `AllowOverride`.
    fn weight(&self) -> f32 {
        1.0
    }

    /// Inactive controllers are dropped at the start of the next pass.
    fn is_active(&self) -> bool;

    /// Velocity contribution for this tick.
    fn velocity(&mut self, ctx: &ControllerContext) -> Vec3;
}

// =============================================================================
// Constant Velocity
// =============================================================================

/// Fixed velocity contribution with an optional frame lifetime.
///
/// # Example
///
/// ```
/// use drift::{BlendMode, ConstantVelocity, ControllerKind, MovementController};
/// use glam::Vec3;
///
/// let dash = ConstantVelocity::kinematic(Vec3::new(0.0, 0.0, 12.0))
///     .with_mode(BlendMode::AllowOverride)
///     .with_weight(0.75)
///     .for_frames(8)
///     .facing_relative();
///
/// assert_eq!(dash.kind(), ControllerKind::Kinematic);
/// assert!(dash.is_active());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantVelocity {
    velocity: Vec3,
    kind: ControllerKind,
    mode: BlendMode,
    priority: i32,
    weight: f32,
    frames_remaining: Option<u32>,
    relative_to_facing: bool,
}

impl ConstantVelocity {
    /// Kinematic contribution, `Blend` mode, priority 0, weight 1.
    #[must_use]
    pub fn kinematic(velocity: Vec3) -> Self {
        Self {
            velocity,
            kind: ControllerKind::Kinematic,
            mode: BlendMode::Blend,
            priority: 0,
            weight: 1.0,
            frames_remaining: None,
            relative_to_facing: false,
        }
    }

    /// Dynamic contribution, `Additive` mode.
    #[must_use]
    pub fn dynamic(velocity: Vec3) -> Self {
        Self {
            kind: ControllerKind::Dynamic,
            mode: BlendMode::Additive,
            ..Self::kinematic(velocity)
        }
    }

    /// Sets the blend mode.
    #[must_use]
    pub fn with_mode(mut self, mode: BlendMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the blend weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Limits the contribution to `frames` evaluations.
    #[must_use]
    pub fn for_frames(mut self, frames: u32) -> Self {
        self.frames_remaining = Some(frames);
        self
    }

    /// Interprets the velocity in the body's facing frame.
    #[must_use]
    pub fn facing_relative(mut self) -> Self {
        self.relative_to_facing = true;
        self
    }
}

impl MovementController for ConstantVelocity {
    fn kind(&self) -> ControllerKind {
        self.kind
    }

    fn blend_mode(&self) -> BlendMode {
        self.mode
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn weight(&self) -> f32 {
        self.weight
    }

    fn is_active(&self) -> bool {
        self.frames_remaining != Some(0)
    }

    fn velocity(&mut self, ctx: &ControllerContext) -> Vec3 {
        if let Some(frames) = self.frames_remaining.as_mut() {
            *frames = frames.saturating_sub(1);
        }
        if self.relative_to_facing {
            ctx.to_world(self.velocity)
        } else {
            self.velocity
        }
    }
}

// =============================================================================
// Impulse
// =============================================================================

/// Dynamic, exponentially decaying force (knockbacks, recoil).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Impulse {
    current: Vec3,
    decay: f32,
    cutoff: f32,
    priority: i32,
}

impl Impulse {
    /// Creates an impulse that decays at `decay` per second.
    ///
    /// The impulse deactivates once its magnitude drops below 0.01.
    #[must_use]
    pub fn new(force: Vec3, decay: f32) -> Self {
        Self {
            current: force,
            decay,
            cutoff: 0.01,
            priority: 0,
        }
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Current magnitude vector.
    #[must_use]
    pub fn current(&self) -> Vec3 {
        self.current
    }
}

impl MovementController for Impulse {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Dynamic
    }

    fn blend_mode(&self) -> BlendMode {
        BlendMode::Additive
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn is_active(&self) -> bool {
        self.current.length() >= self.cutoff
    }

    fn velocity(&mut self, ctx: &ControllerContext) -> Vec3 {
        let out = self.current;
        self.current *= (-self.decay * ctx.dt).exp();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(facing: Vec3) -> ControllerContext {
        ControllerContext {
            owner: OwnerId::new(0),
            frame: 0,
            dt: 1.0 / 60.0,
            facing,
            previous_velocity: Vec3::ZERO,
        }
    }

    #[test]
    fn constant_velocity_expires_after_frames() {
        let mut c = ConstantVelocity::kinematic(Vec3::X).for_frames(2);
        assert!(c.is_active());
        c.velocity(&ctx(Vec3::Z));
        assert!(c.is_active());
        c.velocity(&ctx(Vec3::Z));
        assert!(!c.is_active());
    }

    #[test]
    fn unlimited_constant_velocity_stays_active() {
        let mut c = ConstantVelocity::kinematic(Vec3::X);
        for _ in 0..100 {
            c.velocity(&ctx(Vec3::Z));
        }
        assert!(c.is_active());
    }

    #[test]
    fn facing_relative_forward_follows_facing() {
        let mut c = ConstantVelocity::kinematic(Vec3::new(0.0, 0.0, 5.0)).facing_relative();
        let v = c.velocity(&ctx(Vec3::X));
        assert!((v - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn facing_relative_right_is_perpendicular() {
        let c = ctx(Vec3::Z);
        let right = c.to_world(Vec3::X);
        assert!(right.dot(Vec3::Z).abs() < 1e-6);
        assert!((right.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn dynamic_defaults_to_additive() {
        let c = ConstantVelocity::dynamic(Vec3::Y);
        assert_eq!(c.kind(), ControllerKind::Dynamic);
        assert_eq!(c.blend_mode(), BlendMode::Additive);
    }

    #[test]
    fn impulse_decays_and_deactivates() {
        let mut impulse = Impulse::new(Vec3::new(10.0, 0.0, 0.0), 30.0);
        let first = impulse.velocity(&ctx(Vec3::Z));
        assert_eq!(first, Vec3::new(10.0, 0.0, 0.0));
        assert!(impulse.current().x < 10.0);

        let mut ticks = 0;
        while impulse.is_active() && ticks < 1000 {
            impulse.velocity(&ctx(Vec3::Z));
            ticks += 1;
        }
        assert!(!impulse.is_active());
    }

    #[test]
    fn controllers_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConstantVelocity>();
        assert_send_sync::<Impulse>();
    }
}
