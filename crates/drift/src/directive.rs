//! Movement directives: owned, scoped wrappers around controllers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::controller::{BlendMode, ControllerKind, MovementController};
use crate::owner::{OwnerId, ScopeId};

/// Static description attached to a directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveDefinition {
    /// Human-readable label for logs.
    pub label: String,
    /// Survives `remove_owner` (only explicit scope removal or expiry clears it).
    pub persist: bool,
}

impl DirectiveDefinition {
    /// Creates a non-persistent definition.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            persist: false,
        }
    }

    /// Marks the directive as persistent.
    #[must_use]
    pub fn persistent(mut self) -> Self {
        self.persist = true;
        self
    }
}

/// A request to influence a body's velocity.
pub struct MovementDirective {
    owner: OwnerId,
    scope: ScopeId,
    controller: Box<dyn MovementController>,
    definition: DirectiveDefinition,
}

impl fmt::Debug for MovementDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MovementDirective")
            .field("owner", &self.owner)
            .field("scope", &self.scope)
            .field("kind", &self.controller.kind())
            .field("mode", &self.controller.blend_mode())
            .field("priority", &self.controller.priority())
            .field("definition", &self.definition)
            .finish()
    }
}

impl MovementDirective {
    /// Creates a directive.
    #[must_use]
    pub fn new(
        owner: OwnerId,
        scope: ScopeId,
        controller: Box<dyn MovementController>,
        definition: DirectiveDefinition,
    ) -> Self {
        Self {
            owner,
            scope,
            controller,
            definition,
        }
    }

    /// Owner handle.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Scope handle.
    #[must_use]
    pub const fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Static definition.
    #[must_use]
    pub fn definition(&self) -> &DirectiveDefinition {
        &self.definition
    }

    /// Controller kind.
    #[must_use]
    pub fn kind(&self) -> ControllerKind {
        self.controller.kind()
    }

    /// Controller blend mode.
    #[must_use]
    pub fn blend_mode(&self) -> BlendMode {
        self.controller.blend_mode()
    }

    /// Controller priority.
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.controller.priority()
    }

    /// Whether the controller is still active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.controller.is_active()
    }

    pub(crate) fn controller_mut(&mut self) -> &mut dyn MovementController {
        self.controller.as_mut()
    }

    pub(crate) fn weight(&self) -> f32 {
        self.controller.weight()
    }
}
