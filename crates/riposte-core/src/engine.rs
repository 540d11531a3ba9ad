//! Engine orchestration: the per-tick pipeline over every actor.
//!
//! Each primary tick runs, per actor in ascending [`ActorId`] order:
//!
//! 1. **LOCKS**: apply lock requests queued since the last tick
//! 2. **INPUT**: resolve at most one queued edge per intent
//! 3. **COMMANDS**: update the command buffer and publish its snapshot
//! 4. **MACHINE**: tick the phase machine against the snapshots
//! 5. **RESOLUTION**: route the machine's outputs to resolvers by kind
//! 6. **COMPOSITE**: run the movement compositor, including directives
//!    pushed during resolution
//! 7. **OUTBOX**: forward events, effect requests and the movement sample
//!
//! Actors never observe each other within a tick, so the order only fixes
//! output sequence numbers.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use riposte_core::action::{ActionDefinition, ActionLibrary, Phase, PredicateRegistry};
//! use riposte_core::config::EngineConfig;
//! use riposte_core::engine::Engine;
//!
//! let mut library = ActionLibrary::new();
//! library
//!     .insert(ActionDefinition::new("Slash", &["Attack1"]).with_fire_frames(4))
//!     .unwrap();
//! library.bind("Attack1", "Slash");
//!
//! let mut engine = Engine::new(
//!     EngineConfig::default(),
//!     Arc::new(library),
//!     Arc::new(PredicateRegistry::new()),
//! )
//! .unwrap();
//! let hero = engine.spawn_actor();
//!
//! engine.press(hero, "Attack1");
//! engine.step();
//!
//! assert_eq!(engine.actor(hero).unwrap().machine().phase(), Phase::Fire);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use drift::{Locomotion, MovementDirective};
use tracing::{debug, trace, warn};

use crate::action::{ActionLibrary, PredicateRegistry};
use crate::actor::Actor;
use crate::arena::ActorArena;
use crate::clock::{FixedClock, PassSchedule};
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::ids::{ActorId, Intent};
use crate::input::{CommandSnapshot, InputEdge, InputEvent};
use crate::lock::{LockRequest, LockSnapshot};
use crate::output::{MovementSample, Output, OutputEnvelope};
use crate::resolver::{default_resolvers, Resolver};

// =============================================================================
// Engine
// =============================================================================

/// Deterministic fixed-tick action execution engine.
///
/// Given the same library, config and input sequence, two engines produce
/// identical outputs and identical [`hash_engine`](crate::hash::hash_engine)
/// values on every tick.
pub struct Engine {
    config: EngineConfig,
    library: Arc<ActionLibrary>,
    predicates: Arc<PredicateRegistry>,
    arena: ActorArena,
    resolvers: Vec<Box<dyn Resolver>>,
    clock: FixedClock,
    tick: u64,
    sequence: u64,
    outbox: Vec<OutputEnvelope>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("arena", &self.arena)
            .field("resolvers", &format!("[{} resolvers]", self.resolvers.len()))
            .field("tick", &self.tick)
            .field("outbox", &self.outbox.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine with no actors and the default resolvers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn new(
        config: EngineConfig,
        library: Arc<ActionLibrary>,
        predicates: Arc<PredicateRegistry>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let clock = FixedClock::new(config.tick_rate, config.schedule.clone());
        Ok(Self {
            config,
            library,
            predicates,
            arena: ActorArena::new(),
            resolvers: default_resolvers(),
            clock,
            tick: 0,
            sequence: 0,
            outbox: Vec::new(),
        })
    }

    /// Appends a resolver. It runs after the existing ones.
    pub fn add_resolver(&mut self, resolver: Box<dyn Resolver>) {
        self.resolvers.push(resolver);
    }

    // =========================================================================
    // Actors
    // =========================================================================

    /// Spawns an idle actor and returns its ID.
    pub fn spawn_actor(&mut self) -> ActorId {
        let id = self.arena.allocate_id();
        self.arena.insert(Actor::new(
            id,
            &self.config,
            Arc::clone(&self.library),
            Arc::clone(&self.predicates),
        ));
        debug!(actor = %id, "actor spawned");
        id
    }

    /// Removes an actor. Its pending outputs stay in the outbox.
    pub fn despawn_actor(&mut self, id: ActorId) -> bool {
        let removed = self.arena.remove(id).is_some();
        if removed {
            debug!(actor = %id, "actor despawned");
        }
        removed
    }

    /// Actor by ID.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.arena.get(id)
    }

    /// Mutable actor by ID.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.arena.get_mut(id)
    }

    /// All actors.
    #[must_use]
    pub fn arena(&self) -> &ActorArena {
        &self.arena
    }

    fn with_actor(&mut self, id: ActorId, op: &str, f: impl FnOnce(&mut Actor)) -> bool {
        if let Some(actor) = self.arena.get_mut(id) {
            f(actor);
            true
        } else {
            warn!(actor = %id, op, "unknown actor");
            false
        }
    }

    // =========================================================================
    // Inbound
    // =========================================================================

    /// Queues a raw input edge; it is resolved on the next tick.
    ///
    /// Returns `false` (and logs) if the actor does not exist.
    pub fn push_input(&mut self, event: InputEvent) -> bool {
        let InputEvent {
            actor,
            intent,
            edge,
        } = event;
        self.with_actor(actor, "push_input", |a| a.buttons_mut().queue(intent, edge))
    }

    /// Queues a press of `intent`.
    pub fn press(&mut self, actor: ActorId, intent: impl Into<Intent>) -> bool {
        let intent = intent.into();
        self.with_actor(actor, "press", |a| {
            a.buttons_mut().queue(intent, InputEdge::Press);
        })
    }

    /// Queues a release of `intent`.
    pub fn release(&mut self, actor: ActorId, intent: impl Into<Intent>) -> bool {
        let intent = intent.into();
        self.with_actor(actor, "release", |a| {
            a.buttons_mut().queue(intent, InputEdge::Release);
        })
    }

    /// Queues a trigger lock request applied at the start of the next tick.
    pub fn push_lock_request(&mut self, actor: ActorId, request: LockRequest) -> bool {
        self.with_actor(actor, "push_lock_request", |a| a.queue_lock_request(request))
    }

    /// Sets the locomotion request used from the next tick on.
    pub fn set_locomotion(&mut self, actor: ActorId, locomotion: Locomotion) -> bool {
        self.with_actor(actor, "set_locomotion", |a| a.set_locomotion(locomotion))
    }

    /// Inserts or replaces a speed modifier contributed by `source`.
    pub fn set_speed_modifier(
        &mut self,
        actor: ActorId,
        source: &str,
        effect_type: &str,
        value: f32,
    ) -> bool {
        self.with_actor(actor, "set_speed_modifier", |a| {
            a.compositor_mut()
                .modifiers_mut()
                .set(source, effect_type, value);
        })
    }

    /// Removes the speed modifier contributed by `source`.
    pub fn remove_speed_modifier(&mut self, actor: ActorId, source: &str) -> bool {
        self.arena
            .get_mut(actor)
            .is_some_and(|a| a.compositor_mut().modifiers_mut().remove(source))
    }

    /// Pushes an externally owned directive onto the actor's compositor.
    pub fn push_directive(&mut self, actor: ActorId, directive: MovementDirective) -> bool {
        self.with_actor(actor, "push_directive", |a| {
            a.compositor_mut().push(directive);
        })
    }

    /// Marks the actor's live action finished. Returns whether one was live.
    pub fn finish_action(&mut self, actor: ActorId) -> bool {
        self.arena
            .get_mut(actor)
            .is_some_and(|a| a.machine_mut().finish())
    }

    /// Cancels the actor's live action on the next tick. Returns whether one
    /// was live.
    pub fn cancel_action(&mut self, actor: ActorId) -> bool {
        self.arena
            .get_mut(actor)
            .is_some_and(|a| a.machine_mut().request_cancel())
    }

    // =========================================================================
    // Stepping
    // =========================================================================

    /// Runs one primary tick over every actor.
    pub fn step(&mut self) {
        let tick = self.tick;
        let Self {
            config,
            arena,
            resolvers,
            sequence,
            outbox,
            ..
        } = self;

        for actor in arena.iter_mut() {
            let id = actor.id();
            actor.begin_tick(tick, config.input.released_recently_frames);

            let envelopes: Vec<OutputEnvelope> = actor
                .run_machine(tick)
                .into_iter()
                .map(|output| {
                    let envelope = OutputEnvelope::new(output, id, tick, *sequence);
                    *sequence += 1;
                    envelope
                })
                .collect();

            for resolver in resolvers.iter() {
                let relevant: Vec<&OutputEnvelope> = envelopes
                    .iter()
                    .filter(|e| resolver.handles().contains(&e.kind()))
                    .collect();
                if !relevant.is_empty() {
                    resolver.resolve(&relevant, actor);
                }
            }

            let sample = actor.composite();
            outbox.extend(envelopes.into_iter().filter(|e| e.kind().is_outbound()));
            if config.emit_motion_samples {
                outbox.push(OutputEnvelope::new(
                    Output::Motion(MovementSample::from(sample)),
                    id,
                    tick,
                    *sequence,
                ));
                *sequence += 1;
            }
        }

        trace!(tick, actors = self.arena.len(), "tick complete");
        self.tick += 1;
    }

    /// Advances the fixed clock by `elapsed` and runs the primary ticks that
    /// became due. Returns every pass that became due.
    pub fn advance(&mut self, elapsed: Duration) -> PassSchedule {
        let passes = self.clock.advance(elapsed);
        for _ in 0..passes.primary {
            self.step();
        }
        passes
    }

    // =========================================================================
    // Outbound
    // =========================================================================

    /// Drains the outbox in emission order.
    pub fn take_outputs(&mut self) -> Vec<OutputEnvelope> {
        std::mem::take(&mut self.outbox)
    }

    /// Outputs waiting in the outbox.
    #[must_use]
    pub fn pending_outputs(&self) -> &[OutputEnvelope] {
        &self.outbox
    }

    /// Command snapshot published for the actor on its last tick.
    #[must_use]
    pub fn command_snapshot(&self, actor: ActorId) -> Option<Arc<CommandSnapshot>> {
        self.arena.get(actor).map(|a| a.commands().snapshot())
    }

    /// Current lock snapshot for the actor.
    #[must_use]
    pub fn lock_snapshot(&self, actor: ActorId) -> Option<Arc<LockSnapshot>> {
        self.arena.get(actor).map(|a| a.locks().snapshot())
    }

    /// Next tick to run.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared action library.
    #[must_use]
    pub fn library(&self) -> &Arc<ActionLibrary> {
        &self.library
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionDefinition, Phase};
    use crate::output::{Event, OutputKind};

    fn engine(defs: Vec<ActionDefinition>) -> Engine {
        let mut library = ActionLibrary::new();
        for def in defs {
            let root = def.root().cloned();
            let name = def.name.clone();
            library.insert(def).unwrap();
            if let Some(root) = root {
                library.bind(root, name);
            }
        }
        Engine::new(
            EngineConfig::default(),
            Arc::new(library),
            Arc::new(PredicateRegistry::new()),
        )
        .unwrap()
    }

    mod construction {
        use super::*;

        #[test]
        fn invalid_config_rejected() {
            let config = EngineConfig {
                tick_rate: 0,
                ..EngineConfig::default()
            };
            let result = Engine::new(
                config,
                Arc::new(ActionLibrary::new()),
                Arc::new(PredicateRegistry::new()),
            );
            assert!(matches!(result, Err(ConfigError::ZeroTickRate)));
        }

        #[test]
        fn spawn_assigns_ascending_ids() {
            let mut engine = engine(vec![]);
            let a = engine.spawn_actor();
            let b = engine.spawn_actor();
            assert!(a < b);
            assert!(engine.despawn_actor(a));
            assert!(!engine.despawn_actor(a));
            assert_eq!(engine.arena().len(), 1);
        }
    }

    mod inbound {
        use super::*;

        #[test]
        fn unknown_actor_is_reported() {
            let mut engine = engine(vec![]);
            assert!(!engine.press(ActorId::new(42), "Attack1"));
            assert!(!engine.push_lock_request(ActorId::new(42), LockRequest::EnableRequests));
            assert!(!engine.finish_action(ActorId::new(42)));
        }

        #[test]
        fn queued_lock_applies_on_next_step() {
            let mut engine = engine(vec![]);
            let hero = engine.spawn_actor();
            engine.push_lock_request(
                hero,
                LockRequest::Lock {
                    capability: Intent::new("Dash"),
                    origin: "snare".into(),
                    cancelable: false,
                },
            );
            assert!(!engine
                .lock_snapshot(hero)
                .unwrap()
                .is_locked(&Intent::new("Dash")));
            engine.step();
            assert!(engine
                .lock_snapshot(hero)
                .unwrap()
                .is_locked(&Intent::new("Dash")));
        }
    }

    mod stepping {
        use super::*;

        #[test]
        fn press_activates_on_same_tick() {
            let mut engine = engine(vec![ActionDefinition::new("Slash", &["Attack1"])
                .with_fire_frames(10)]);
            let hero = engine.spawn_actor();
            engine.press(hero, "Attack1");
            engine.step();

            assert_eq!(engine.actor(hero).unwrap().machine().phase(), Phase::Fire);
            let snapshot = engine.command_snapshot(hero).unwrap();
            assert!(snapshot.is_active(&Intent::new("Attack1")));
            assert!(!snapshot.is_buffered(&Intent::new("Attack1")));
        }

        #[test]
        fn outbox_holds_only_outbound_kinds_in_sequence_order() {
            let mut engine = engine(vec![ActionDefinition::new("Slash", &["Attack1"])
                .with_fire_frames(2)]);
            let hero = engine.spawn_actor();
            engine.press(hero, "Attack1");
            for _ in 0..5 {
                engine.step();
            }
            let outputs = engine.take_outputs();
            assert!(outputs.iter().all(|e| e.kind().is_outbound()));
            assert!(outputs.windows(2).all(|w| w[0].sequence() < w[1].sequence()));
            assert_eq!(
                outputs
                    .iter()
                    .filter(|e| e.kind() == OutputKind::Motion)
                    .count(),
                5
            );
            assert!(engine.take_outputs().is_empty());
        }

        #[test]
        fn motion_samples_can_be_disabled() {
            let mut engine = Engine::new(
                EngineConfig {
                    emit_motion_samples: false,
                    ..EngineConfig::default()
                },
                Arc::new(ActionLibrary::new()),
                Arc::new(PredicateRegistry::new()),
            )
            .unwrap();
            engine.spawn_actor();
            engine.step();
            assert!(engine.take_outputs().is_empty());
        }

        #[test]
        fn advance_runs_due_primary_ticks() {
            let mut engine = engine(vec![]);
            engine.spawn_actor();
            let passes = engine.advance(Duration::from_millis(50));
            assert_eq!(passes.primary, 3);
            assert_eq!(engine.tick(), 3);
        }

        #[test]
        fn cancel_releases_next_step() {
            let mut engine = engine(vec![ActionDefinition::new("Guard", &["Block"])
                .with_termination(crate::action::TerminationPolicy::Manual)]);
            let hero = engine.spawn_actor();
            engine.press(hero, "Block");
            engine.step();
            assert!(engine.cancel_action(hero));
            engine.step();
            assert_eq!(engine.actor(hero).unwrap().machine().phase(), Phase::Idle);

            let released = engine.take_outputs().into_iter().any(|e| {
                matches!(
                    e.output(),
                    Output::Event(Event::Released {
                        reason: crate::output::ReleaseReason::Cancelled,
                        ..
                    })
                )
            });
            assert!(released);
        }
    }
}
