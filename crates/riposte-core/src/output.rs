//! Typed outputs of the phase machine and the engine.
//!
//! The phase machine never mutates the command buffer, lock registry or
//! compositor directly. It emits [`Output`]s, the engine wraps them in
//! [`OutputEnvelope`]s and routes them to resolvers by [`OutputKind`]:
//!
//! - [`CommandOp`]: consume/lock/unlock commands
//! - [`LockRequest`]: trigger lock mutations
//! - [`MovementOp`]: push/remove movement directives
//! - [`Event`]: lifecycle notifications for animation, audio and UI
//! - [`EffectRequest`]: effect creation/cancellation for the effect registry
//! - [`MovementSample`]: per-tick velocity/momentum for physics
//!
//! Events, effect requests and movement samples are forwarded to the
//! engine's outbox.
//!
//! # Example
//!
//! ```
//! use riposte_core::ids::{ActionName, ActorId};
//! use riposte_core::action::Phase;
//! use riposte_core::output::{Event, Output, OutputEnvelope, OutputKind};
//!
//! let envelope = OutputEnvelope::new(
//!     Output::Event(Event::PhaseEntered {
//!         action: ActionName::new("Slash"),
//!         serial: 1,
//!         phase: Phase::Fire,
//!     }),
//!     ActorId::new(1),
//!     12, // tick
//!     0,  // sequence
//! );
//!
//! assert_eq!(envelope.kind(), OutputKind::Event);
//! assert_eq!(envelope.tick(), 12);
//! ```

use drift::{CompositeSample, ScopeId};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::action::{MovementDeclaration, Phase};
use crate::ids::{ActionName, ActorId, Intent};
use crate::lock::LockRequest;

// =============================================================================
// Reasons
// =============================================================================

/// How an instance came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationKind {
    /// No instance was live.
    Fresh,
    /// Reached through the live instance's available controls.
    Chained,
    /// Replaced a live instance it was not chained from.
    Interrupt,
}

/// Why an instance ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReleaseReason {
    /// Ran through FireEnd.
    Completed,
    /// A watched capability was released.
    InputReleased,
    /// Replaced by a chained action.
    Chained,
    /// Replaced by an interrupting action.
    Interrupted,
    /// Charging was abandoned or cancel was requested.
    Cancelled,
    /// Finished externally.
    Finished,
}

/// Why a fresh command did not activate anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DenialReason {
    /// The intent has no default action.
    Unbound,
    /// A live instance neither offers the action nor may be interrupted by it.
    NotAvailable,
    /// The action is cooling down.
    OnCooldown,
    /// The activation predicate failed or is missing.
    PredicateFailed,
    /// A required capability is trigger-locked.
    Locked,
    /// The live instance refuses to be interrupted.
    NotCancelable,
    /// A required capability has no live command.
    MissingCapability,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Unbound => "unbound",
            Self::NotAvailable => "not available",
            Self::OnCooldown => "on cooldown",
            Self::PredicateFailed => "predicate failed",
            Self::Locked => "locked",
            Self::NotCancelable => "not cancelable",
            Self::MissingCapability => "missing capability",
        };
        write!(f, "{text}")
    }
}

// =============================================================================
// Output Payloads
// =============================================================================

/// Command buffer mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOp {
    /// Move the buffered command to active.
    Consume {
        /// Command intent.
        intent: Intent,
    },
    /// Lock the active command.
    Lock {
        /// Command intent.
        intent: Intent,
    },
    /// Unlock the active command.
    Unlock {
        /// Command intent.
        intent: Intent,
    },
}

/// Movement compositor mutation for the emitting actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MovementOp {
    /// Push a directive built from a declaration.
    Push {
        /// Directive scope.
        scope: ScopeId,
        /// Directive parameters.
        declaration: MovementDeclaration,
    },
    /// Remove the actor's directives under `scope`.
    RemoveScope {
        /// Scope to remove.
        scope: ScopeId,
    },
}

/// Action lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// An instance started.
    Activated {
        /// Action name.
        action: ActionName,
        /// Instance serial.
        serial: u64,
        /// How it started.
        kind: ActivationKind,
    },
    /// An instance entered a phase.
    PhaseEntered {
        /// Action name.
        action: ActionName,
        /// Instance serial.
        serial: u64,
        /// Entered phase.
        phase: Phase,
    },
    /// An instance ended.
    Released {
        /// Action name.
        action: ActionName,
        /// Instance serial.
        serial: u64,
        /// Why it ended.
        reason: ReleaseReason,
    },
    /// A fresh press did not activate anything.
    ActivationDenied {
        /// Pressed intent.
        intent: Intent,
        /// Candidate action, if one was found.
        action: Option<ActionName>,
        /// Why it was denied.
        reason: DenialReason,
    },
}

/// Request to the effect registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectRequest {
    /// Create an effect.
    Apply {
        /// Effect name.
        effect: String,
        /// Requesting instance origin.
        origin: String,
        /// Whether the instance may cancel it on release.
        cancelable: bool,
    },
    /// Cancel an effect created earlier by `origin`.
    Cancel {
        /// Effect name.
        effect: String,
        /// Requesting instance origin.
        origin: String,
    },
}

/// Velocity and momentum of one actor after the compositor pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MovementSample {
    /// Final velocity.
    pub velocity: Vec3,
    /// Mass × velocity.
    pub momentum: Vec3,
    /// Directives that took part.
    pub directive_count: usize,
}

impl From<CompositeSample> for MovementSample {
    fn from(sample: CompositeSample) -> Self {
        Self {
            velocity: sample.velocity,
            momentum: sample.momentum,
            directive_count: sample.directive_count,
        }
    }
}

// =============================================================================
// Output and Envelope
// =============================================================================

/// Anything the engine produces during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// Command buffer mutation.
    Command(CommandOp),
    /// Trigger lock mutation.
    Lock(LockRequest),
    /// Movement compositor mutation.
    Movement(MovementOp),
    /// Lifecycle notification.
    Event(Event),
    /// Effect registry request.
    Effect(EffectRequest),
    /// Compositor result.
    Motion(MovementSample),
}

impl Output {
    /// Routing category.
    #[must_use]
    pub const fn kind(&self) -> OutputKind {
        match self {
            Self::Command(_) => OutputKind::Command,
            Self::Lock(_) => OutputKind::Lock,
            Self::Movement(_) => OutputKind::Movement,
            Self::Event(_) => OutputKind::Event,
            Self::Effect(_) => OutputKind::Effect,
            Self::Motion(_) => OutputKind::Motion,
        }
    }
}

/// Routing category of an [`Output`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OutputKind {
    /// [`Output::Command`]
    Command,
    /// [`Output::Lock`]
    Lock,
    /// [`Output::Movement`]
    Movement,
    /// [`Output::Event`]
    Event,
    /// [`Output::Effect`]
    Effect,
    /// [`Output::Motion`]
    Motion,
}

impl OutputKind {
    /// Whether outputs of this kind leave the engine through the outbox.
    #[must_use]
    pub const fn is_outbound(self) -> bool {
        matches!(self, Self::Event | Self::Effect | Self::Motion)
    }
}

/// An output tagged with its actor, tick and global sequence number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputEnvelope {
    output: Output,
    actor: ActorId,
    tick: u64,
    sequence: u64,
}

impl OutputEnvelope {
    /// Wraps an output.
    #[must_use]
    pub const fn new(output: Output, actor: ActorId, tick: u64, sequence: u64) -> Self {
        Self {
            output,
            actor,
            tick,
            sequence,
        }
    }

    /// The wrapped output.
    #[must_use]
    pub const fn output(&self) -> &Output {
        &self.output
    }

    /// Unwraps the output.
    #[must_use]
    pub fn into_output(self) -> Output {
        self.output
    }

    /// Emitting actor.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// Tick of emission.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Engine-wide emission order.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Routing category.
    #[must_use]
    pub const fn kind(&self) -> OutputKind {
        self.output.kind()
    }
}
