//! State hashing for determinism verification.
//!
//! Two engines fed identical libraries, configs and input sequences must
//! produce identical hashes after every tick. Floats are hashed through their
//! bit patterns and every map is a `BTreeMap`, so the hash does not depend on
//! allocation or insertion history.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::Vec3;

use crate::action::ActionRuntimeState;
use crate::actor::Actor;
use crate::engine::Engine;
use crate::input::CommandSnapshot;
use crate::lock::LockSnapshot;

/// Compute a deterministic hash of engine state.
///
/// This hash includes:
/// - The current tick
/// - Per actor, in ID order: live instance, cooldowns, command snapshot,
///   lock snapshot, compositor velocity and directive count
#[must_use]
pub fn hash_engine(engine: &Engine) -> u64 {
    let mut hasher = DefaultHasher::new();

    engine.tick().hash(&mut hasher);
    engine.arena().len().hash(&mut hasher);
    for actor in engine.arena().iter() {
        hash_actor(actor, &mut hasher);
    }

    hasher.finish()
}

/// Compute a deterministic hash of a single actor.
#[must_use]
pub fn hash_actor_state(actor: &Actor) -> u64 {
    let mut hasher = DefaultHasher::new();
    hash_actor(actor, &mut hasher);
    hasher.finish()
}

fn hash_actor<H: Hasher>(actor: &Actor, hasher: &mut H) {
    actor.id().hash(hasher);

    match actor.machine().instance() {
        Some(state) => {
            1u8.hash(hasher);
            hash_instance(state, hasher);
        }
        None => 0u8.hash(hasher),
    }

    for (name, remaining) in actor.machine().cooldowns().iter() {
        name.hash(hasher);
        remaining.hash(hasher);
    }

    hash_commands(&actor.commands().snapshot(), hasher);
    hash_locks(&actor.locks().snapshot(), hasher);

    hash_vec3(actor.compositor().velocity(), hasher);
    actor.compositor().len().hash(hasher);
}

fn hash_instance<H: Hasher>(state: &ActionRuntimeState, hasher: &mut H) {
    state.action.hash(hasher);
    state.serial.hash(hasher);
    state.phase.hash(hasher);
    state.phase_frame.hash(hasher);
    state.ready_to_release.hash(hasher);
    state.claimed.hash(hasher);
    state.available.hash(hasher);
    state.applied_effects.hash(hasher);
}

fn hash_commands<H: Hasher>(snapshot: &CommandSnapshot, hasher: &mut H) {
    // Version counts updates, not content; skip it
    snapshot.frame.hash(hasher);
    snapshot.active.hash(hasher);
    snapshot.buffer.hash(hasher);
    snapshot.buttons.hash(hasher);
}

fn hash_locks<H: Hasher>(snapshot: &LockSnapshot, hasher: &mut H) {
    snapshot.requests_enabled.hash(hasher);
    snapshot.locks.hash(hasher);
}

/// Hash a vector by converting each component to bits.
fn hash_vec3<H: Hasher>(v: Vec3, hasher: &mut H) {
    v.x.to_bits().hash(hasher);
    v.y.to_bits().hash(hasher);
    v.z.to_bits().hash(hasher);
}
