//! Live action instance state.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use drift::ScopeId;
use serde::{Deserialize, Serialize};

use crate::ids::{ActionName, CommandId, Intent};
use crate::output::ReleaseReason;

/// Lifecycle phase of an action instance.
///
/// Phases only move forward within one activation:
/// `Charging → Fire → FireEnd`, then release or re-chain.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Phase {
    /// No instance.
    #[default]
    Idle,
    /// Accumulating charge.
    Charging,
    /// Executing.
    Fire,
    /// Recovery and control window.
    FireEnd,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Charging => write!(f, "Charging"),
            Self::Fire => write!(f, "Fire"),
            Self::FireEnd => write!(f, "FireEnd"),
        }
    }
}

/// State of the one live action instance of an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRuntimeState {
    /// Definition being executed.
    pub action: ActionName,
    /// Activation serial, unique per actor.
    pub serial: u64,
    /// Current phase.
    pub phase: Phase,
    /// Ticks spent in the current phase.
    pub phase_frame: u32,
    /// Commands claimed per capability.
    pub claimed: BTreeMap<Intent, CommandId>,
    /// Claimed commands that were already active when the instance started.
    pub carried: BTreeSet<CommandId>,
    /// Capabilities owned for release purposes.
    pub owned: BTreeSet<Intent>,
    /// Capability whose release ends `OnRootRelease` actions.
    pub root: Intent,
    /// Actions currently reachable by chaining.
    pub available: BTreeSet<ActionName>,
    /// Set once the instance should release (or chain) this tick.
    pub ready_to_release: bool,
    /// Why the instance is ready to release.
    pub release_reason: Option<ReleaseReason>,
    /// Effects applied by this instance and whether each is cancelable.
    pub applied_effects: BTreeMap<String, bool>,
    /// Movement scopes pushed by this instance, with the phase that pushed them.
    pub movement_scopes: Vec<(Phase, ScopeId)>,
    /// Lock origin used for this instance's trigger locks and effects.
    pub origin: String,
    /// Whether trigger locks were requested on activation.
    pub locks_requested: bool,
    /// Capabilities whose commands were locked on activation.
    pub locked_commands: Vec<Intent>,
}

impl ActionRuntimeState {
    /// Fresh instance in `Idle`, about to enter `Charging`.
    #[must_use]
    pub fn new(action: ActionName, serial: u64, root: Intent) -> Self {
        let origin = format!("action:{action}#{serial}");
        Self {
            action,
            serial,
            phase: Phase::Idle,
            phase_frame: 0,
            claimed: BTreeMap::new(),
            carried: BTreeSet::new(),
            owned: BTreeSet::new(),
            root,
            available: BTreeSet::new(),
            ready_to_release: false,
            release_reason: None,
            applied_effects: BTreeMap::new(),
            movement_scopes: Vec::new(),
            origin,
            locks_requested: false,
            locked_commands: Vec::new(),
        }
    }

    /// Marks the instance ready to release unless it already is.
    pub fn mark_ready(&mut self, reason: ReleaseReason) {
        if !self.ready_to_release {
            self.ready_to_release = true;
            self.release_reason = Some(reason);
        }
    }

    /// Whether `id` was claimed by this instance.
    #[must_use]
    pub fn has_claimed(&self, id: CommandId) -> bool {
        self.claimed.values().any(|c| *c == id)
    }
}
