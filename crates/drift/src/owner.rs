//! Owner and scope handles for directives.
//!
//! Directives never hold a reference to the body or system that created
//! them. They carry an [`OwnerId`] (a stable arena handle) and a [`ScopeId`]
//! that lets the owner remove a group of directives at once.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle for whoever contributed a directive.
///
/// # Example
///
/// ```
/// use drift::OwnerId;
///
/// let owner = OwnerId::new(3);
/// assert_eq!(owner.as_u64(), 3);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Creates an owner handle from a raw value.
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

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner:{}", self.0)
    }
}

impl From<u64> for OwnerId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Group identifier within one owner's directives.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScopeId(u64);

impl ScopeId {
    /// Creates a scope handle from a raw value.
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

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope:{}", self.0)
    }
}

impl From<u64> for ScopeId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}
