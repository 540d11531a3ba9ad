//! Named activation and cancel predicates.
//!
//! Definitions refer to predicates by name; the registry holding the actual
//! closures is handed to each phase machine at construction.

use std::collections::BTreeMap;
use std::fmt;

use crate::action::runtime::ActionRuntimeState;
use crate::ids::{ActionName, ActorId};
use crate::input::CommandSnapshot;
use crate::lock::LockSnapshot;

/// What a predicate can see.
#[derive(Debug, Clone, Copy)]
pub struct PredicateContext<'a> {
    /// Actor being evaluated.
    pub actor: ActorId,
    /// Action the predicate guards.
    pub action: &'a ActionName,
    /// Current tick.
    pub tick: u64,
    /// Live instance, if any.
    pub current: Option<&'a ActionRuntimeState>,
    /// Command snapshot for this tick.
    pub commands: &'a CommandSnapshot,
    /// Lock snapshot for this tick.
    pub locks: &'a LockSnapshot,
}

type PredicateFn = Box<dyn Fn(&PredicateContext<'_>) -> bool + Send + Sync>;

/// Name → predicate map.
///
/// # Example
///
/// ```
/// use riposte_core::action::PredicateRegistry;
///
/// let mut predicates = PredicateRegistry::new();
/// predicates.register("late_in_fire", |ctx| {
///     ctx.current.is_some_and(|state| state.phase_frame >= 4)
/// });
/// assert!(predicates.contains("late_in_fire"));
/// ```
#[derive(Default)]
pub struct PredicateRegistry {
    predicates: BTreeMap<String, PredicateFn>,
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRegistry")
            .field("names", &self.predicates.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PredicateRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a predicate.
    pub fn register<F>(&mut self, name: &str, predicate: F)
    where
        F: Fn(&PredicateContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(name.to_string(), Box::new(predicate));
    }

    /// Evaluates `name`; `None` if no such predicate is registered.
    #[must_use]
    pub fn evaluate(&self, name: &str, ctx: &PredicateContext<'_>) -> Option<bool> {
        self.predicates.get(name).map(|p| p(ctx))
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Number of predicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}
