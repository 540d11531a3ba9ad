//! # Riposte Core
//!
//! Deterministic fixed-tick action execution engine for real-time combat.
//!
//! Riposte decides, every tick, which input intents are live, which ability
//! or weapon an actor is executing, what phase it is in and how its movement
//! composes with locomotion.
//!
//! ## Architecture
//!
//! - **Input**: edge-triggered [`ButtonRegistry`](input::ButtonRegistry) and
//!   the [`CommandBuffer`](input::CommandBuffer) of press-to-release tokens
//! - **Locks**: [`TriggerLockRegistry`](lock::TriggerLockRegistry), capability
//!   locks contributed by status effects and live actions
//! - **Actions**: static [`ActionDefinition`](action::ActionDefinition)s and
//!   the per-actor [`PhaseMachine`](action::PhaseMachine)
//! - **Resolvers**: apply machine outputs to the actor
//! - **Movement**: the [`drift`] compositor, one per actor
//!
//! The phase machine only emits typed [`Output`](output::Output)s. The
//! [`Engine`](engine::Engine) routes them to resolvers and forwards events,
//! effect requests and movement samples to its outbox.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use riposte_core::action::{ActionDefinition, ActionLibrary, PredicateRegistry};
//! use riposte_core::config::EngineConfig;
//! use riposte_core::engine::Engine;
//! use riposte_core::output::{Event, Output};
//!
//! let library = ActionLibrary::from_json_str(r#"{
//!     "actions": [
//!         { "name": "Slash", "capabilities": ["Attack1"], "fire": { "frames": 10 } }
//!     ],
//!     "bindings": { "Attack1": "Slash" }
//! }"#).unwrap();
//!
//! let mut engine = Engine::new(
//!     EngineConfig::default(),
//!     Arc::new(library),
//!     Arc::new(PredicateRegistry::new()),
//! ).unwrap();
//! let hero = engine.spawn_actor();
//!
//! engine.press(hero, "Attack1");
//! for _ in 0..12 {
//!     engine.step();
//! }
//!
//! let released = engine.take_outputs().iter().any(|e| {
//!     matches!(e.output(), Output::Event(Event::Released { .. }))
//! });
//! assert!(released);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export drift for movement types
pub use drift;

pub mod action;
pub mod actor;
pub mod arena;
pub mod clock;
pub mod config;
pub mod cooldown;
pub mod engine;
pub mod error;
pub mod hash;
pub mod ids;
pub mod input;
pub mod lock;
pub mod output;
pub mod resolver;

#[cfg(test)]
mod tests;

pub use action::{ActionDefinition, ActionFlags, ActionLibrary, Phase, PredicateRegistry};
pub use engine::Engine;
pub use error::{CommandError, ConfigError, DefinitionError, LockError};
pub use ids::{ActionName, ActorId, CommandId, Intent};
pub use input::{InputEdge, InputEvent};
pub use output::{Event, Output, OutputEnvelope, OutputKind};
