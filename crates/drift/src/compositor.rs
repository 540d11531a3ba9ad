//! The compositor pass: directives in, one velocity/momentum pair out.
//!
//! # Pass Order
//!
//! 1. Drop directives whose controller reports inactive
//! 2. Combine speed modifiers (mean per effect type, then across types)
//! 3. Kinematic target: base locomotion (if unrestricted), then kinematic
//!    directives by descending priority
//! 4. Dynamic contribution: sum of `Additive` dynamic directives
//! 5. Combine: dynamic dominates above `force_threshold`
//! 6. Reversal damping or momentum retention
//! 7. Friction
//! 8. Momentum = mass × velocity
//!
//! Ties in priority keep insertion order, so the pass is deterministic for a
//! given sequence of `push` calls.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::MotionConfig;
use crate::controller::{BlendMode, ControllerContext, ControllerKind};
use crate::directive::MovementDirective;
use crate::locomotion::{move_toward, Locomotion};
use crate::modifier::SpeedModifiers;
use crate::owner::{OwnerId, ScopeId};

/// Everything the compositor computed during one pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CompositeSample {
    /// Kinematic target after priority blending.
    pub kinematic: Vec3,
    /// Sum of additive dynamic contributions.
    pub dynamic: Vec3,
    /// Combined target before momentum and friction.
    pub target: Vec3,
    /// Final velocity.
    pub velocity: Vec3,
    /// Mass × velocity.
    pub momentum: Vec3,
    /// Combined speed modifier used for base locomotion.
    pub speed_modifier: f32,
    /// Directives that took part in this pass.
    pub directive_count: usize,
}

/// Per-body movement directive compositor.
#[derive(Debug)]
pub struct Compositor {
    config: MotionConfig,
    directives: Vec<MovementDirective>,
    modifiers: SpeedModifiers,
    velocity: Vec3,
    frame: u64,
}

impl Compositor {
    /// Creates an empty compositor at rest.
    #[must_use]
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            directives: Vec::new(),
            modifiers: SpeedModifiers::new(),
            velocity: Vec3::ZERO,
            frame: 0,
        }
    }

    /// Adds a directive. It takes part starting with the next `step`.
    pub fn push(&mut self, directive: MovementDirective) {
        trace!(
            owner = %directive.owner(),
            scope = %directive.scope(),
            label = %directive.definition().label,
            "directive pushed"
        );
        self.directives.push(directive);
    }

    /// Removes every directive with the given owner and scope.
    ///
    /// Returns the number removed.
    pub fn remove_scope(&mut self, owner: OwnerId, scope: ScopeId) -> usize {
        let before = self.directives.len();
        self.directives
            .retain(|d| !(d.owner() == owner && d.scope() == scope));
        before - self.directives.len()
    }

    /// Removes every non-persistent directive of `owner`.
    ///
    /// Returns the number removed.
    pub fn remove_owner(&mut self, owner: OwnerId) -> usize {
        let before = self.directives.len();
        self.directives
            .retain(|d| d.owner() != owner || d.definition().persist);
        before - self.directives.len()
    }

    /// Number of directives currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// True when no directives are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Iterates directives in insertion order.
    pub fn directives(&self) -> impl Iterator<Item = &MovementDirective> + '_ {
        self.directives.iter()
    }

    /// Speed modifiers applied to base locomotion.
    #[must_use]
    pub fn modifiers(&self) -> &SpeedModifiers {
        &self.modifiers
    }

    /// Mutable access to the speed modifiers.
    pub fn modifiers_mut(&mut self) -> &mut SpeedModifiers {
        &mut self.modifiers
    }

    /// Velocity produced by the last pass.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Overrides the current velocity (teleports, external physics corrections).
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Momentum for the current velocity.
    #[must_use]
    pub fn momentum(&self) -> Vec3 {
        self.velocity * self.config.mass
    }

    /// Number of passes run so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Runs one compositor pass.
    pub fn step(&mut self, locomotion: &Locomotion) -> CompositeSample {
        let dt = self.config.dt;
        let previous = self.velocity;
        let facing = locomotion.facing_dir();

        // 1. Expire
        let before = self.directives.len();
        self.directives.retain(MovementDirective::is_active);
        if self.directives.len() != before {
            trace!(dropped = before - self.directives.len(), "expired directives dropped");
        }

        // 2. Speed modifier
        let speed_modifier = self.modifiers.combined();

        // Evaluate every controller once so lifetimes advance even when an
        // `Ignore` directive masks lower priorities.
        let frame = self.frame;
        let mut contributions: Vec<(i32, ControllerKind, BlendMode, f32, Vec3)> = self
            .directives
            .iter_mut()
            .map(|d| {
                let ctx = ControllerContext {
                    owner: d.owner(),
                    frame,
                    dt,
                    facing,
                    previous_velocity: previous,
                };
                let v = d.controller_mut().velocity(&ctx);
                (d.priority(), d.kind(), d.blend_mode(), d.weight(), v)
            })
            .collect();
        contributions.sort_by(|a, b| b.0.cmp(&a.0));

        // 3. Kinematic target
        let mut kinematic = if locomotion.unrestricted {
            let speed = (locomotion.desired_speed * speed_modifier).min(self.config.max_speed);
            move_toward(previous, facing * speed, self.config.acceleration * dt)
        } else {
            Vec3::ZERO
        };
        for &(_, kind, mode, weight, v) in &contributions {
            if kind != ControllerKind::Kinematic {
                continue;
            }
            match mode {
                BlendMode::Ignore => {
                    kinematic = v;
                    break;
                }
                BlendMode::Blend => kinematic += v * weight,
                BlendMode::AllowOverride => kinematic = kinematic.lerp(v, weight),
                BlendMode::Additive => kinematic += v,
            }
        }

        // 4. Dynamic contribution
        let mut dynamic = Vec3::ZERO;
        for &(_, kind, mode, _, v) in &contributions {
            if kind != ControllerKind::Dynamic {
                continue;
            }
            if mode == BlendMode::Additive {
                dynamic += v;
            } else {
                trace!(%mode, "non-additive dynamic contribution ignored");
            }
        }

        // 5. Combine
        let target = if dynamic.length() > self.config.force_threshold {
            dynamic + kinematic * self.config.kinematic_share
        } else {
            kinematic
        };

        // 6. Reversal damping / momentum retention
        let reversing = locomotion.unrestricted
            && self.directives.is_empty()
            && previous.length() > self.config.reversal_min_speed
            && previous.normalize_or_zero().dot(facing) < self.config.reversal_dot_threshold;
        let mut velocity = if reversing {
            let rate = self.config.acceleration * self.config.inertia_scale * dt;
            move_toward(previous, Vec3::ZERO, rate)
        } else {
            target.lerp(previous, self.config.momentum_retention)
        };

        // 7. Friction
        if locomotion.is_idle() || self.config.global_friction {
            velocity *= (-self.config.friction * dt).exp();
        }

        // 8. Momentum
        self.velocity = velocity;
        self.frame += 1;

        CompositeSample {
            kinematic,
            dynamic,
            target,
            velocity,
            momentum: velocity * self.config.mass,
            speed_modifier,
            directive_count: contributions.len(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
