//! Action definition registry and intent bindings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::action::definition::{ActionDefinition, MAX_MOVEMENT_DECLARATIONS};
use crate::error::DefinitionError;
use crate::ids::{ActionName, Intent};

/// A name referenced by a definition or binding that has no definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedReference {
    /// Definition holding the reference, `None` for bindings.
    pub from: Option<ActionName>,
    /// Missing target.
    pub target: ActionName,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LibraryFile {
    actions: Vec<ActionDefinition>,
    bindings: BTreeMap<Intent, ActionName>,
}

/// Immutable-after-build set of action definitions.
///
/// Built once and shared between actors behind an `Arc`.
///
/// # Example
///
/// ```
/// use riposte_core::action::{ActionDefinition, ActionLibrary};
/// use riposte_core::ids::Intent;
///
/// let mut library = ActionLibrary::new();
/// library.insert(ActionDefinition::new("Slash", &["Attack1"])).unwrap();
/// library.bind("Attack1", "Slash");
///
/// let action = library.default_for(&Intent::new("Attack1")).unwrap();
/// assert_eq!(action.name.as_str(), "Slash");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ActionLibrary {
    definitions: BTreeMap<ActionName, ActionDefinition>,
    bindings: BTreeMap<Intent, ActionName>,
}

impl ActionLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a library from JSON of the form
    /// `{ "actions": [...], "bindings": { "<intent>": "<action>" } }`.
    ///
    /// Unresolved control, swap and binding targets are logged, not rejected.
    ///
    /// # Errors
    ///
    /// [`DefinitionError`] for malformed JSON or invalid definitions.
    pub fn from_json_str(json: &str) -> Result<Self, DefinitionError> {
        let file: LibraryFile = serde_json::from_str(json)?;
        let mut library = Self::new();
        for definition in file.actions {
            library.insert(definition)?;
        }
        for (intent, action) in file.bindings {
            library.bindings.insert(intent, action);
        }
        for unresolved in library.unresolved_references() {
            warn!(
                from = ?unresolved.from,
                target = %unresolved.target,
                "action library references an unknown action"
            );
        }
        Ok(library)
    }

    /// Adds a definition.
    ///
    /// # Errors
    ///
    /// [`DefinitionError`] for duplicate names, empty capability sets, an
    /// out-of-range `min_charge_to_fire` or more than
    /// [`MAX_MOVEMENT_DECLARATIONS`] movement declarations.
    pub fn insert(&mut self, definition: ActionDefinition) -> Result<(), DefinitionError> {
        if self.definitions.contains_key(&definition.name) {
            return Err(DefinitionError::Duplicate(definition.name));
        }
        if definition.capabilities.is_empty() {
            return Err(DefinitionError::NoCapabilities(definition.name));
        }
        if !(0.0..=1.0).contains(&definition.min_charge_to_fire) {
            return Err(DefinitionError::InvalidChargeFraction {
                value: definition.min_charge_to_fire,
                name: definition.name,
            });
        }
        if definition.movement.len() > MAX_MOVEMENT_DECLARATIONS {
            return Err(DefinitionError::TooManyMovementDeclarations {
                count: definition.movement.len(),
                name: definition.name,
            });
        }
        self.definitions.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Binds `intent` to its default action.
    pub fn bind(&mut self, intent: impl Into<Intent>, action: impl Into<ActionName>) {
        self.bindings.insert(intent.into(), action.into());
    }

    /// Definition named `name`.
    #[must_use]
    pub fn get(&self, name: &ActionName) -> Option<&ActionDefinition> {
        self.definitions.get(name)
    }

    /// Default action bound to `intent`.
    #[must_use]
    pub fn default_for(&self, intent: &Intent) -> Option<&ActionDefinition> {
        let name = self.bindings.get(intent)?;
        let definition = self.definitions.get(name);
        if definition.is_none() {
            debug!(intent = %intent, action = %name, "binding targets an unknown action");
        }
        definition
    }

    /// Names referenced by bindings, controls or swap targets that have no
    /// definition.
    #[must_use]
    pub fn unresolved_references(&self) -> Vec<UnresolvedReference> {
        let mut missing = Vec::new();
        for target in self.bindings.values() {
            if !self.definitions.contains_key(target) {
                missing.push(UnresolvedReference {
                    from: None,
                    target: target.clone(),
                });
            }
        }
        for definition in self.definitions.values() {
            let targets = definition
                .controls
                .values()
                .flat_map(|delta| delta.add.iter())
                .chain(definition.swap_on_fire.iter());
            for target in targets {
                if !self.definitions.contains_key(target) {
                    missing.push(UnresolvedReference {
                        from: Some(definition.name.clone()),
                        target: target.clone(),
                    });
                }
            }
        }
        missing
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the library has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterates definitions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.definitions.values()
    }
}
