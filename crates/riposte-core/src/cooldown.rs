//! Per-action cooldown countdowns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::ActionName;

/// Remaining cooldown frames per action.
///
/// Re-registering an action replaces its remaining time rather than stacking
/// a second countdown.
///
/// # Example
///
/// ```
/// use riposte_core::cooldown::CooldownTracker;
/// use riposte_core::ids::ActionName;
///
/// let slash = ActionName::new("Slash");
/// let mut cooldowns = CooldownTracker::new();
///
/// cooldowns.register(slash.clone(), 2);
/// assert!(cooldowns.is_on_cooldown(&slash));
/// cooldowns.tick();
/// cooldowns.tick();
/// assert!(!cooldowns.is_on_cooldown(&slash));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownTracker {
    remaining: BTreeMap<ActionName, u32>,
}

impl CooldownTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) a countdown. Zero frames is ignored.
    pub fn register(&mut self, action: ActionName, frames: u32) {
        if frames > 0 {
            self.remaining.insert(action, frames);
        }
    }

    /// Whether `action` is cooling down.
    #[must_use]
    pub fn is_on_cooldown(&self, action: &ActionName) -> bool {
        self.remaining.contains_key(action)
    }

    /// Frames left for `action`, zero if not cooling down.
    #[must_use]
    pub fn remaining(&self, action: &ActionName) -> u32 {
        self.remaining.get(action).copied().unwrap_or(0)
    }

    /// Advances every countdown by one frame and drops finished ones.
    pub fn tick(&mut self) {
        self.remaining.retain(|_, frames| {
            *frames = frames.saturating_sub(1);
            *frames > 0
        });
    }

    /// Clears every countdown.
    pub fn clear(&mut self) {
        self.remaining.clear();
    }

    /// Number of actions cooling down.
    #[must_use]
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    /// Whether nothing is cooling down.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Iterates countdowns in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&ActionName, u32)> {
        self.remaining.iter().map(|(name, frames)| (name, *frames))
    }
}
