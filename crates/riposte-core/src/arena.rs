//! Actor storage with deterministic iteration order.
//!
//! Actors live in a `BTreeMap` keyed by [`ActorId`]. IDs are handed out
//! monotonically and never reused, so iteration (and therefore the order in
//! which actors are ticked) is the same on every run.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use riposte_core::actor::Actor;
//! use riposte_core::action::{ActionLibrary, PredicateRegistry};
//! use riposte_core::arena::ActorArena;
//! use riposte_core::config::EngineConfig;
//!
//! let mut arena = ActorArena::new();
//! let id = arena.allocate_id();
//! arena.insert(Actor::new(
//!     id,
//!     &EngineConfig::default(),
//!     Arc::new(ActionLibrary::new()),
//!     Arc::new(PredicateRegistry::new()),
//! ));
//!
//! assert!(arena.contains(id));
//! assert_eq!(arena.ids().collect::<Vec<_>>(), vec![id]);
//! ```

use std::collections::BTreeMap;

use tracing::warn;

use crate::actor::Actor;
use crate::ids::ActorId;

/// Container for every actor in the simulation.
#[derive(Debug, Default)]
pub struct ActorArena {
    actors: BTreeMap<ActorId, Actor>,
    next_id: u64,
}

impl ActorArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next actor ID.
    pub fn allocate_id(&mut self) -> ActorId {
        let id = ActorId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Inserts an actor under its own ID, replacing any previous occupant.
    pub fn insert(&mut self, actor: Actor) -> ActorId {
        let id = actor.id();
        if self.actors.insert(id, actor).is_some() {
            warn!(actor = %id, "replaced an existing actor");
        }
        self.next_id = self.next_id.max(id.as_u64() + 1);
        id
    }

    /// Removes an actor.
    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        self.actors.remove(&id)
    }

    /// Actor by ID.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Mutable actor by ID.
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Whether `id` is present.
    #[must_use]
    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    /// Number of actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Actor IDs in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.keys().copied()
    }

    /// Actors in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Mutable actors in ID order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionLibrary, PredicateRegistry};
    use crate::config::EngineConfig;
    use std::sync::Arc;

    fn actor(id: ActorId) -> Actor {
        Actor::new(
            id,
            &EngineConfig::default(),
            Arc::new(ActionLibrary::new()),
            Arc::new(PredicateRegistry::new()),
        )
    }

    #[test]
    fn ids_are_monotonic_and_not_reused() {
        let mut arena = ActorArena::new();
        let a = arena.allocate_id();
        arena.insert(actor(a));
        let b = arena.allocate_id();
        arena.insert(actor(b));
        assert!(a < b);

        arena.remove(a);
        let c = arena.allocate_id();
        assert!(c > b);
    }

    #[test]
    fn iteration_follows_id_order() {
        let mut arena = ActorArena::new();
        arena.insert(actor(ActorId::new(5)));
        arena.insert(actor(ActorId::new(2)));
        arena.insert(actor(ActorId::new(9)));
        let ids: Vec<u64> = arena.iter().map(|a| a.id().as_u64()).collect();
        assert_eq!(ids, vec![2, 5, 9]);
        assert_eq!(arena.allocate_id(), ActorId::new(10));
    }

    #[test]
    fn missing_actor_lookups_are_none() {
        let mut arena = ActorArena::new();
        assert!(arena.get(ActorId::new(1)).is_none());
        assert!(arena.get_mut(ActorId::new(1)).is_none());
        assert!(arena.remove(ActorId::new(1)).is_none());
        assert!(arena.is_empty());
    }
}
