//! Identifier types shared across the engine.
//!
//! - [`ActorId`]: arena handle for one simulated character
//! - [`Intent`]: named input/capability (`Attack1`, `Dash`, ...)
//! - [`ActionName`]: key of an [`ActionDefinition`](crate::action::ActionDefinition)
//! - [`CommandId`]: identity of one press-to-release command token

use serde::{Deserialize, Serialize};
use std::fmt;

use drift::OwnerId;

/// Unique identifier for an actor.
///
/// Actor IDs are ordered by their numeric value, which fixes the order in
/// which actors are ticked.
///
/// # Example
///
/// ```
/// use riposte_core::ids::ActorId;
///
/// let a = ActorId::new(1);
/// let b = ActorId::new(2);
/// assert!(a < b);
/// assert_eq!(a.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(u64);

impl ActorId {
    /// Creates an `ActorId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Directive owner handle for this actor.
    #[must_use]
    pub const fn owner(self) -> OwnerId {
        OwnerId::new(self.0)
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// A named input intent, also used as the capability key for locks.
///
/// # Example
///
/// ```
/// use riposte_core::ids::Intent;
///
/// let attack = Intent::new("Attack1");
/// assert_eq!(attack.as_str(), "Attack1");
/// assert_eq!(attack, Intent::from("Attack1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Intent(String);

impl Intent {
    /// Creates an intent from a name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Returns the intent name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Intent {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Intent {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Name of an action (ability or weapon) definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionName(String);

impl ActionName {
    /// Creates an action name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Returns the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActionName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ActionName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identity of a single command token.
///
/// Command IDs increase monotonically per command buffer, so a larger ID
/// always means a later press.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommandId(u64);

impl CommandId {
    /// Creates a command ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmd:{}", self.0)
    }
}
