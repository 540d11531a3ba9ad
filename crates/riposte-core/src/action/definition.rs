//! Static action (ability/weapon) definitions.

use std::collections::BTreeMap;

use bitflags::bitflags;
use drift::{
    BlendMode, ConstantVelocity, ControllerKind, DirectiveDefinition, MovementController,
    MovementDirective, OwnerId, ScopeId,
};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::action::runtime::Phase;
use crate::ids::{ActionName, Intent};

// =============================================================================
// Policies and Timing
// =============================================================================

/// When a charging action fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationPolicy {
    /// Fires as soon as charging completes.
    #[default]
    OnPress,
    /// Same as `OnPress`; kept distinct for authoring.
    OnChargeComplete,
    /// Fires when a required capability is released with enough charge.
    OnRelease,
    /// Fires at charge completion and stays in Fire while held.
    WhileHeld,
}

/// What ends an action instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationPolicy {
    /// Releases after Fire and the control window.
    #[default]
    AfterFire,
    /// Releases early once any required capability is up.
    OnRelease,
    /// Releases early once the root capability is up.
    OnRootRelease,
    /// Waits in FireEnd until finished externally.
    Manual,
}

/// A duration given in frames or seconds. Frames win when both are set.
///
/// # Example
///
/// ```
/// use riposte_core::action::Timing;
///
/// assert_eq!(Timing::seconds(0.5).to_frames(60), 30);
/// assert_eq!(Timing { frames: Some(4), seconds: Some(9.0) }.to_frames(60), 4);
/// assert_eq!(Timing::ZERO.to_frames(60), 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Duration in ticks.
    pub frames: Option<u32>,
    /// Duration in seconds, converted with the tick rate and truncated.
    pub seconds: Option<f32>,
}

impl Timing {
    /// No duration.
    pub const ZERO: Self = Self {
        frames: None,
        seconds: None,
    };

    /// Duration in frames.
    #[must_use]
    pub const fn frames(frames: u32) -> Self {
        Self {
            frames: Some(frames),
            seconds: None,
        }
    }

    /// Duration in seconds.
    #[must_use]
    pub const fn seconds(seconds: f32) -> Self {
        Self {
            frames: None,
            seconds: Some(seconds),
        }
    }

    /// Resolves to whole frames at `tick_rate`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn to_frames(&self, tick_rate: u32) -> u32 {
        if let Some(frames) = self.frames {
            return frames;
        }
        match self.seconds {
            Some(seconds) if seconds > 0.0 => (seconds * tick_rate as f32) as u32,
            _ => 0,
        }
    }
}

// =============================================================================
// Flags
// =============================================================================

bitflags! {
    /// Behaviour switches of an action.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ActionFlags: u16 {
        /// May interrupt a live instance it is not chained from.
        const INTERRUPTS = 1 << 0;
        /// May be interrupted.
        const CANCELABLE = 1 << 1;
        /// Interrupts even instances that are not cancelable.
        const CANCEL_DISABLES = 1 << 2;
        /// Activation is blocked by foreign trigger locks.
        const RESPECT_LOCKS = 1 << 3;
        /// Trigger-locks its capabilities while live.
        const REQUEST_LOCKS = 1 << 4;
        /// Locks its claimed commands while live.
        const LOCK_COMMANDS = 1 << 5;
        /// `OnRelease` actions fire at full charge without waiting for release.
        const FORCE_FIRE_AT_FULL_CHARGE = 1 << 6;
        /// Suspends free locomotion while live.
        const ROOTS_LOCOMOTION = 1 << 7;
    }
}

impl ActionFlags {
    /// Flags given to new definitions: cancelable and respecting locks.
    #[must_use]
    pub const fn standard() -> Self {
        Self::CANCELABLE.union(Self::RESPECT_LOCKS)
    }
}

impl Default for ActionFlags {
    fn default() -> Self {
        Self::standard()
    }
}

// =============================================================================
// Per-phase Declarations
// =============================================================================

/// Actions added to and removed from the available controls on phase entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlDelta {
    /// Actions that become chainable.
    pub add: Vec<ActionName>,
    /// Actions that stop being chainable.
    pub remove: Vec<ActionName>,
}

impl ControlDelta {
    /// Delta that only adds `names`.
    #[must_use]
    pub fn add(names: &[&str]) -> Self {
        Self {
            add: names.iter().map(|n| ActionName::new(n)).collect(),
            remove: Vec::new(),
        }
    }
}

/// Whether a declaration applies or cancels its effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectAction {
    /// Request the effect.
    #[default]
    Apply,
    /// Cancel an effect this instance applied earlier.
    Cancel,
}

/// An effect requested or cancelled when a phase is entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDeclaration {
    /// Effect name understood by the effect registry.
    pub effect: String,
    /// Phase whose entry triggers the declaration.
    pub phase: Phase,
    /// Apply or cancel.
    #[serde(default)]
    pub action: EffectAction,
    /// Whether release may cancel the effect.
    #[serde(default = "cancelable_by_default")]
    pub cancelable: bool,
}

const fn cancelable_by_default() -> bool {
    true
}

impl EffectDeclaration {
    /// Applies `effect` on entering `phase`.
    #[must_use]
    pub fn apply(effect: &str, phase: Phase) -> Self {
        Self {
            effect: effect.to_string(),
            phase,
            action: EffectAction::Apply,
            cancelable: true,
        }
    }

    /// Cancels `effect` on entering `phase`.
    #[must_use]
    pub fn cancel(effect: &str, phase: Phase) -> Self {
        Self {
            action: EffectAction::Cancel,
            ..Self::apply(effect, phase)
        }
    }

    /// Makes the effect survive release.
    #[must_use]
    pub fn persistent(mut self) -> Self {
        self.cancelable = false;
        self
    }
}

/// Movement declarations one action may carry. Each maps to a distinct
/// directive scope under the instance serial.
pub const MAX_MOVEMENT_DECLARATIONS: usize = 256;

/// A constant-velocity directive pushed while a phase is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementDeclaration {
    /// Label for debugging.
    pub label: String,
    /// Phase that pushes the directive; leaving it removes the directive.
    pub phase: Phase,
    /// Velocity contribution.
    pub velocity: Vec3,
    /// Kinematic or dynamic.
    pub kind: ControllerKind,
    /// Blend mode.
    pub mode: BlendMode,
    /// Blend priority.
    pub priority: i32,
    /// Blend weight.
    pub weight: f32,
    /// Lifetime in frames, unlimited if `None`.
    pub frames: Option<u32>,
    /// Interpret `velocity` in the actor's facing frame.
    pub facing_relative: bool,
}

impl Default for MovementDeclaration {
    fn default() -> Self {
        Self {
            label: String::new(),
            phase: Phase::Fire,
            velocity: Vec3::ZERO,
            kind: ControllerKind::Kinematic,
            mode: BlendMode::Blend,
            priority: 0,
            weight: 1.0,
            frames: None,
            facing_relative: false,
        }
    }
}

impl MovementDeclaration {
    /// Kinematic `Blend` contribution.
    #[must_use]
    pub fn kinematic(label: &str, phase: Phase, velocity: Vec3) -> Self {
        Self {
            label: label.to_string(),
            phase,
            velocity,
            ..Self::default()
        }
    }

    /// Dynamic `Additive` contribution.
    #[must_use]
    pub fn dynamic(label: &str, phase: Phase, velocity: Vec3) -> Self {
        Self {
            kind: ControllerKind::Dynamic,
            mode: BlendMode::Additive,
            ..Self::kinematic(label, phase, velocity)
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

    /// Limits the lifetime.
    #[must_use]
    pub fn for_frames(mut self, frames: u32) -> Self {
        self.frames = Some(frames);
        self
    }

    /// Velocity is relative to facing.
    #[must_use]
    pub fn facing_relative(mut self) -> Self {
        self.facing_relative = true;
        self
    }

    /// Builds the directive for `owner` under `scope`.
    #[must_use]
    pub fn to_directive(&self, owner: OwnerId, scope: ScopeId) -> MovementDirective {
        let mut controller = match self.kind {
            ControllerKind::Kinematic => ConstantVelocity::kinematic(self.velocity),
            ControllerKind::Dynamic => ConstantVelocity::dynamic(self.velocity),
        }
        .with_mode(self.mode)
        .with_priority(self.priority)
        .with_weight(self.weight);
        if let Some(frames) = self.frames {
            controller = controller.for_frames(frames);
        }
        if self.facing_relative {
            controller = controller.facing_relative();
        }
        let controller: Box<dyn MovementController> = Box::new(controller);
        MovementDirective::new(
            owner,
            scope,
            controller,
            DirectiveDefinition::new(self.label.clone()),
        )
    }
}

// =============================================================================
// Action Definition
// =============================================================================

/// Static description of an ability or weapon.
///
/// # Example
///
/// ```
/// use riposte_core::action::{ActionDefinition, ActionFlags, ActivationPolicy, Phase, ControlDelta};
///
/// let slash = ActionDefinition::new("Slash", &["Attack1"])
///     .with_fire_frames(10)
///     .with_control_window_frames(6)
///     .with_controls(Phase::FireEnd, ControlDelta::add(&["Slash2"]))
///     .with_flags(ActionFlags::standard() | ActionFlags::INTERRUPTS);
///
/// assert_eq!(slash.root().map(|i| i.as_str()), Some("Attack1"));
/// assert_eq!(slash.activation, ActivationPolicy::OnPress);
/// assert!((slash.charge_fraction(0, 60) - 1.0).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Unique name.
    pub name: ActionName,
    /// Required capabilities; the first is the root.
    pub capabilities: Vec<Intent>,
    /// When charging turns into Fire.
    #[serde(default)]
    pub activation: ActivationPolicy,
    /// What ends the instance.
    #[serde(default)]
    pub termination: TerminationPolicy,
    /// Charging duration.
    #[serde(default)]
    pub charge: Timing,
    /// Fire duration.
    #[serde(default)]
    pub fire: Timing,
    /// FireEnd control window.
    #[serde(default)]
    pub control_window: Timing,
    /// Cooldown registered on release.
    #[serde(default)]
    pub cooldown: Timing,
    /// Control changes applied on entering each phase.
    #[serde(default)]
    pub controls: BTreeMap<Phase, ControlDelta>,
    /// Action made available on entering Fire.
    #[serde(default)]
    pub swap_on_fire: Option<ActionName>,
    /// Behaviour switches.
    #[serde(default)]
    pub flags: ActionFlags,
    /// Minimum charge fraction for an `OnRelease` action to fire.
    #[serde(default)]
    pub min_charge_to_fire: f32,
    /// Named predicate that must pass for activation.
    #[serde(default)]
    pub activation_predicate: Option<String>,
    /// Named predicate that must pass for this action to be interrupted.
    #[serde(default)]
    pub cancel_predicate: Option<String>,
    /// Effects applied or cancelled on phase entry.
    #[serde(default)]
    pub effects: Vec<EffectDeclaration>,
    /// Movement pushed while phases are active.
    #[serde(default)]
    pub movement: Vec<MovementDeclaration>,
}

impl ActionDefinition {
    /// Creates a definition with instant charge and fire, no window and no cooldown.
    #[must_use]
    pub fn new(name: &str, capabilities: &[&str]) -> Self {
        Self {
            name: ActionName::new(name),
            capabilities: capabilities.iter().map(|c| Intent::new(c)).collect(),
            activation: ActivationPolicy::default(),
            termination: TerminationPolicy::default(),
            charge: Timing::ZERO,
            fire: Timing::ZERO,
            control_window: Timing::ZERO,
            cooldown: Timing::ZERO,
            controls: BTreeMap::new(),
            swap_on_fire: None,
            flags: ActionFlags::standard(),
            min_charge_to_fire: 0.0,
            activation_predicate: None,
            cancel_predicate: None,
            effects: Vec::new(),
            movement: Vec::new(),
        }
    }

    /// Sets the activation policy.
    #[must_use]
    pub fn with_activation(mut self, policy: ActivationPolicy) -> Self {
        self.activation = policy;
        self
    }

    /// Sets the termination policy.
    #[must_use]
    pub fn with_termination(mut self, policy: TerminationPolicy) -> Self {
        self.termination = policy;
        self
    }

    /// Sets the charge duration in frames.
    #[must_use]
    pub fn with_charge_frames(mut self, frames: u32) -> Self {
        self.charge = Timing::frames(frames);
        self
    }

    /// Sets the fire duration in frames.
    #[must_use]
    pub fn with_fire_frames(mut self, frames: u32) -> Self {
        self.fire = Timing::frames(frames);
        self
    }

    /// Sets the control window in frames.
    #[must_use]
    pub fn with_control_window_frames(mut self, frames: u32) -> Self {
        self.control_window = Timing::frames(frames);
        self
    }

    /// Sets the cooldown.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Timing) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Sets the control delta applied on entering `phase`.
    #[must_use]
    pub fn with_controls(mut self, phase: Phase, delta: ControlDelta) -> Self {
        self.controls.insert(phase, delta);
        self
    }

    /// Sets the swap-on-fire target.
    #[must_use]
    pub fn with_swap_on_fire(mut self, target: &str) -> Self {
        self.swap_on_fire = Some(ActionName::new(target));
        self
    }

    /// Replaces the flags.
    #[must_use]
    pub fn with_flags(mut self, flags: ActionFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the minimum charge fraction for `OnRelease` firing.
    #[must_use]
    pub fn with_min_charge(mut self, fraction: f32) -> Self {
        self.min_charge_to_fire = fraction;
        self
    }

    /// Sets the activation predicate.
    #[must_use]
    pub fn with_activation_predicate(mut self, name: &str) -> Self {
        self.activation_predicate = Some(name.to_string());
        self
    }

    /// Sets the cancel predicate.
    #[must_use]
    pub fn with_cancel_predicate(mut self, name: &str) -> Self {
        self.cancel_predicate = Some(name.to_string());
        self
    }

    /// Adds an effect declaration.
    #[must_use]
    pub fn with_effect(mut self, effect: EffectDeclaration) -> Self {
        self.effects.push(effect);
        self
    }

    /// Adds a movement declaration.
    #[must_use]
    pub fn with_movement(mut self, movement: MovementDeclaration) -> Self {
        self.movement.push(movement);
        self
    }

    /// Root capability.
    #[must_use]
    pub fn root(&self) -> Option<&Intent> {
        self.capabilities.first()
    }

    /// Whether `intent` is one of the required capabilities.
    #[must_use]
    pub fn requires(&self, intent: &Intent) -> bool {
        self.capabilities.contains(intent)
    }

    /// Charge duration in frames.
    #[must_use]
    pub fn charge_frames(&self, tick_rate: u32) -> u32 {
        self.charge.to_frames(tick_rate)
    }

    /// Fire duration in frames.
    #[must_use]
    pub fn fire_frames(&self, tick_rate: u32) -> u32 {
        self.fire.to_frames(tick_rate)
    }

    /// Control window in frames.
    #[must_use]
    pub fn control_window_frames(&self, tick_rate: u32) -> u32 {
        self.control_window.to_frames(tick_rate)
    }

    /// Cooldown in frames.
    #[must_use]
    pub fn cooldown_frames(&self, tick_rate: u32) -> u32 {
        self.cooldown.to_frames(tick_rate)
    }

    /// Charge completion in `[0, 1]` after `phase_frame` ticks of charging.
    /// Zero charge frames is instantly complete.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn charge_fraction(&self, phase_frame: u32, tick_rate: u32) -> f32 {
        let frames = self.charge_frames(tick_rate);
        if frames == 0 {
            return 1.0;
        }
        (phase_frame as f32 / frames as f32).min(1.0)
    }
}
