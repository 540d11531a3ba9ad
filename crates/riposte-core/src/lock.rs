//! Trigger lock registry.
//!
//! A trigger lock is an origin-tagged veto on a capability. While a
//! capability is locked, its command cannot release and actions that respect
//! locks cannot activate through it. Several origins may lock the same
//! capability; it stays locked until every one of them has unlocked.
//!
//! Locks are either cancelable (requested by actions, may be overridden by
//! an interrupt) or hard (stuns, scripted sequences).

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LockError;
use crate::ids::Intent;

/// One origin's lock on a capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockEntry {
    /// Who holds the lock.
    pub origin: String,
    /// Whether an interrupting action may override this lock.
    pub cancelable: bool,
}

/// Immutable view of the lock registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSnapshot {
    /// Bumped on every mutation.
    pub version: u64,
    /// Lock entries per capability. Capabilities without locks are absent.
    pub locks: BTreeMap<Intent, Vec<LockEntry>>,
    /// Whether new lock requests are accepted.
    pub requests_enabled: bool,
}

impl Default for LockSnapshot {
    fn default() -> Self {
        Self {
            version: 0,
            locks: BTreeMap::new(),
            requests_enabled: true,
        }
    }
}

impl LockSnapshot {
    /// Whether any origin locks `capability`.
    #[must_use]
    pub fn is_locked(&self, capability: &Intent) -> bool {
        self.locks.get(capability).is_some_and(|l| !l.is_empty())
    }

    /// Whether an origin other than `origin` locks `capability`.
    #[must_use]
    pub fn is_locked_excluding(&self, capability: &Intent, origin: &str) -> bool {
        self.entries(capability).iter().any(|e| e.origin != origin)
    }

    /// Whether a non-cancelable lock is held on `capability`.
    #[must_use]
    pub fn has_hard_lock(&self, capability: &Intent) -> bool {
        self.entries(capability).iter().any(|e| !e.cancelable)
    }

    /// Whether every lock on `capability` is cancelable (vacuously true).
    #[must_use]
    pub fn only_cancelable(&self, capability: &Intent) -> bool {
        !self.has_hard_lock(capability)
    }

    /// Lock entries for `capability`.
    #[must_use]
    pub fn entries(&self, capability: &Intent) -> &[LockEntry] {
        self.locks
            .get(capability)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// A lock mutation requested by an external system or by an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockRequest {
    /// Adds `origin` to the lockers of `capability`.
    Lock {
        /// Capability to lock.
        capability: Intent,
        /// Locking origin.
        origin: String,
        /// Whether an interrupt may override the lock.
        cancelable: bool,
    },
    /// Removes `origin` from the lockers of `capability`.
    Unlock {
        /// Capability to unlock.
        capability: Intent,
        /// Origin to remove.
        origin: String,
    },
    /// Removes `origin` from every capability.
    UnlockOrigin {
        /// Origin to remove.
        origin: String,
    },
    /// Accept lock requests again.
    EnableRequests,
    /// Decline new lock requests. Existing locks stay.
    DisableRequests,
}

/// Capability → origin-list lock map for one actor.
///
/// # Example
///
/// ```
/// use riposte_core::ids::Intent;
/// use riposte_core::lock::TriggerLockRegistry;
///
/// let attack = Intent::new("Attack1");
/// let mut locks = TriggerLockRegistry::new();
///
/// locks.lock(attack.clone(), "EffectA", false).unwrap();
/// locks.lock(attack.clone(), "EffectB", false).unwrap();
/// locks.unlock(&attack, "EffectA");
/// assert!(locks.is_locked(&attack));
///
/// locks.unlock(&attack, "EffectB");
/// assert!(!locks.is_locked(&attack));
/// ```
#[derive(Debug, Clone)]
pub struct TriggerLockRegistry {
    locks: BTreeMap<Intent, Vec<LockEntry>>,
    requests_enabled: bool,
    version: u64,
    snapshot: Arc<LockSnapshot>,
}

impl Default for TriggerLockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerLockRegistry {
    /// Creates an empty registry accepting requests.
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: BTreeMap::new(),
            requests_enabled: true,
            version: 0,
            snapshot: Arc::new(LockSnapshot::default()),
        }
    }

    /// Locks `capability` for `origin`.
    ///
    /// Returns `Ok(false)` if `origin` already held the lock.
    ///
    /// # Errors
    ///
    /// [`LockError::RequestsDisabled`] while requests are disabled.
    pub fn lock(
        &mut self,
        capability: Intent,
        origin: impl Into<String>,
        cancelable: bool,
    ) -> Result<bool, LockError> {
        let origin = origin.into();
        if !self.requests_enabled {
            return Err(LockError::RequestsDisabled { capability, origin });
        }
        let entries = self.locks.entry(capability).or_default();
        if entries.iter().any(|e| e.origin == origin) {
            return Ok(false);
        }
        entries.push(LockEntry { origin, cancelable });
        self.publish();
        Ok(true)
    }

    /// Removes `origin`'s lock on `capability`. Always succeeds, even while
    /// requests are disabled; returns whether a lock was removed.
    pub fn unlock(&mut self, capability: &Intent, origin: &str) -> bool {
        let Some(entries) = self.locks.get_mut(capability) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|e| e.origin != origin);
        let removed = entries.len() != before;
        if entries.is_empty() {
            self.locks.remove(capability);
        }
        if removed {
            self.publish();
        }
        removed
    }

    /// Removes every lock held by `origin`; returns how many were removed.
    pub fn unlock_origin(&mut self, origin: &str) -> usize {
        let mut removed = 0;
        for entries in self.locks.values_mut() {
            let before = entries.len();
            entries.retain(|e| e.origin != origin);
            removed += before - entries.len();
        }
        self.locks.retain(|_, entries| !entries.is_empty());
        if removed > 0 {
            self.publish();
        }
        removed
    }

    /// Accepts lock requests.
    pub fn enable_requests(&mut self) {
        if !self.requests_enabled {
            self.requests_enabled = true;
            self.publish();
        }
    }

    /// Declines new lock requests. Existing locks are kept.
    pub fn disable_requests(&mut self) {
        if self.requests_enabled {
            self.requests_enabled = false;
            self.publish();
        }
    }

    /// Applies a [`LockRequest`].
    ///
    /// # Errors
    ///
    /// [`LockError::RequestsDisabled`] for a lock while requests are disabled.
    pub fn apply(&mut self, request: &LockRequest) -> Result<(), LockError> {
        match request {
            LockRequest::Lock {
                capability,
                origin,
                cancelable,
            } => {
                self.lock(capability.clone(), origin.clone(), *cancelable)?;
            }
            LockRequest::Unlock { capability, origin } => {
                if !self.unlock(capability, origin) {
                    debug!(capability = %capability, origin, "unlock matched no lock");
                }
            }
            LockRequest::UnlockOrigin { origin } => {
                self.unlock_origin(origin);
            }
            LockRequest::EnableRequests => self.enable_requests(),
            LockRequest::DisableRequests => self.disable_requests(),
        }
        Ok(())
    }

    /// Whether any origin locks `capability`.
    #[must_use]
    pub fn is_locked(&self, capability: &Intent) -> bool {
        self.locks.get(capability).is_some_and(|l| !l.is_empty())
    }

    /// Whether lock requests are accepted.
    #[must_use]
    pub const fn requests_enabled(&self) -> bool {
        self.requests_enabled
    }

    /// Most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<LockSnapshot> {
        Arc::clone(&self.snapshot)
    }

    fn publish(&mut self) {
        self.version += 1;
        self.snapshot = Arc::new(LockSnapshot {
            version: self.version,
            locks: self.locks.clone(),
            requests_enabled: self.requests_enabled,
        });
    }
}
