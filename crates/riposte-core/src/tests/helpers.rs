//! Test helpers for building engines and inspecting their outputs.

use std::sync::Arc;

use crate::action::{ActionDefinition, ActionLibrary, Phase, PredicateRegistry};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::ids::{ActionName, ActorId};
use crate::output::{EffectRequest, Event, Output, OutputEnvelope};

// =============================================================================
// Setup
// =============================================================================

/// Installs a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Builds a library from `defs`, binding each root intent to the first
/// definition that uses it.
pub fn library(defs: Vec<ActionDefinition>) -> ActionLibrary {
    let mut library = ActionLibrary::new();
    for def in defs {
        let name = def.name.clone();
        let root = def.root().cloned();
        library.insert(def).unwrap();
        if let Some(root) = root {
            if library.default_for(&root).is_none() {
                library.bind(root, name);
            }
        }
    }
    library
}

/// Engine with default config, the given definitions and predicates, and
/// one spawned actor.
pub fn engine_with_predicates(
    defs: Vec<ActionDefinition>,
    predicates: PredicateRegistry,
) -> (Engine, ActorId) {
    init_tracing();
    let mut engine = Engine::new(
        EngineConfig::default(),
        Arc::new(library(defs)),
        Arc::new(predicates),
    )
    .unwrap();
    let actor = engine.spawn_actor();
    (engine, actor)
}

/// Engine with default config, the given definitions and one spawned actor.
pub fn engine_with(defs: Vec<ActionDefinition>) -> (Engine, ActorId) {
    engine_with_predicates(defs, PredicateRegistry::new())
}

/// Steps `engine` `n` times.
pub fn step_n(engine: &mut Engine, n: usize) {
    for _ in 0..n {
        engine.step();
    }
}

// =============================================================================
// Output Filters
// =============================================================================

/// Events with their tick.
pub fn events(outputs: &[OutputEnvelope]) -> Vec<(u64, Event)> {
    outputs
        .iter()
        .filter_map(|e| match e.output() {
            Output::Event(event) => Some((e.tick(), event.clone())),
            _ => None,
        })
        .collect()
}

/// `(tick, action, phase)` for every phase entry.
pub fn phase_entries(outputs: &[OutputEnvelope]) -> Vec<(u64, ActionName, Phase)> {
    events(outputs)
        .into_iter()
        .filter_map(|(tick, event)| match event {
            Event::PhaseEntered { action, phase, .. } => Some((tick, action, phase)),
            _ => None,
        })
        .collect()
}

/// Effect requests with their tick.
pub fn effect_requests(outputs: &[OutputEnvelope]) -> Vec<(u64, EffectRequest)> {
    outputs
        .iter()
        .filter_map(|e| match e.output() {
            Output::Effect(request) => Some((e.tick(), request.clone())),
            _ => None,
        })
        .collect()
}

/// Current phase of `actor`.
pub fn phase_of(engine: &Engine, actor: ActorId) -> Phase {
    engine.actor(actor).unwrap().machine().phase()
}

/// Name of the live action of `actor`, if any.
pub fn live_action(engine: &Engine, actor: ActorId) -> Option<String> {
    engine
        .actor(actor)
        .unwrap()
        .machine()
        .instance()
        .map(|s| s.action.as_str().to_string())
}
