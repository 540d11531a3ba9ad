//! One simulated character: its input, locks, phase machine and compositor.

use std::sync::Arc;

use drift::{CompositeSample, Compositor, Locomotion};
use tracing::warn;

use crate::action::{ActionLibrary, MachineInput, PhaseMachine, PredicateRegistry};
use crate::config::EngineConfig;
use crate::ids::ActorId;
use crate::input::{ButtonRegistry, CommandBuffer};
use crate::lock::{LockRequest, TriggerLockRegistry};
use crate::output::Output;

/// Per-actor engine state.
///
/// Every component is owned by the actor; nothing references back into it.
/// Movement directives identify the actor through [`ActorId::owner`].
#[derive(Debug)]
pub struct Actor {
    id: ActorId,
    buttons: ButtonRegistry,
    commands: CommandBuffer,
    locks: TriggerLockRegistry,
    pending_locks: Vec<LockRequest>,
    machine: PhaseMachine,
    compositor: Compositor,
    locomotion: Locomotion,
    last_sample: CompositeSample,
}

impl Actor {
    /// Creates an idle actor at rest.
    #[must_use]
    pub fn new(
        id: ActorId,
        config: &EngineConfig,
        library: Arc<ActionLibrary>,
        predicates: Arc<PredicateRegistry>,
    ) -> Self {
        Self {
            id,
            buttons: ButtonRegistry::new(),
            commands: CommandBuffer::new(config.input.buffer_window_frames),
            locks: TriggerLockRegistry::new(),
            pending_locks: Vec::new(),
            machine: PhaseMachine::new(id, library, predicates, config.tick_rate),
            compositor: Compositor::new(config.motion_config()),
            locomotion: Locomotion::default(),
            last_sample: CompositeSample::default(),
        }
    }

    /// Actor ID.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Button state.
    #[must_use]
    pub fn buttons(&self) -> &ButtonRegistry {
        &self.buttons
    }

    /// Mutable button state, for queuing raw edges.
    pub fn buttons_mut(&mut self) -> &mut ButtonRegistry {
        &mut self.buttons
    }

    /// Command buffer.
    #[must_use]
    pub fn commands(&self) -> &CommandBuffer {
        &self.commands
    }

    /// Mutable command buffer.
    pub fn commands_mut(&mut self) -> &mut CommandBuffer {
        &mut self.commands
    }

    /// Trigger lock registry.
    #[must_use]
    pub fn locks(&self) -> &TriggerLockRegistry {
        &self.locks
    }

    /// Mutable trigger lock registry.
    pub fn locks_mut(&mut self) -> &mut TriggerLockRegistry {
        &mut self.locks
    }

    /// Queues a lock request applied at the start of the next tick.
    pub fn queue_lock_request(&mut self, request: LockRequest) {
        self.pending_locks.push(request);
    }

    /// Lock requests waiting for the next tick.
    #[must_use]
    pub fn pending_lock_requests(&self) -> &[LockRequest] {
        &self.pending_locks
    }

    /// Phase machine.
    #[must_use]
    pub fn machine(&self) -> &PhaseMachine {
        &self.machine
    }

    /// Mutable phase machine.
    pub fn machine_mut(&mut self) -> &mut PhaseMachine {
        &mut self.machine
    }

    /// Movement compositor.
    #[must_use]
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Mutable movement compositor.
    pub fn compositor_mut(&mut self) -> &mut Compositor {
        &mut self.compositor
    }

    /// Locomotion request used by the next compositor pass.
    #[must_use]
    pub const fn locomotion(&self) -> &Locomotion {
        &self.locomotion
    }

    /// Sets the locomotion request.
    pub fn set_locomotion(&mut self, locomotion: Locomotion) {
        self.locomotion = locomotion;
    }

    /// Result of the last compositor pass.
    #[must_use]
    pub const fn last_sample(&self) -> &CompositeSample {
        &self.last_sample
    }

    /// Applies queued lock requests, resolves input edges and publishes the
    /// command snapshot for `tick`.
    pub(crate) fn begin_tick(&mut self, tick: u64, released_recently_frames: u32) {
        for request in std::mem::take(&mut self.pending_locks) {
            if let Err(err) = self.locks.apply(&request) {
                warn!(actor = %self.id, %err, "queued lock request declined");
            }
        }
        self.buttons.resolve_edges(released_recently_frames);
        let locks = self.locks.snapshot();
        self.commands.update(tick, &self.buttons, &locks);
    }

    /// Ticks the phase machine against the snapshots published this tick.
    pub(crate) fn run_machine(&mut self, tick: u64) -> Vec<Output> {
        let commands = self.commands.snapshot();
        let locks = self.locks.snapshot();
        self.machine.tick(&MachineInput {
            tick,
            commands: &commands,
            locks: &locks,
        })
    }

    /// Runs the compositor, rooting free locomotion while the live action
    /// asks for it.
    pub(crate) fn composite(&mut self) -> CompositeSample {
        let locomotion = if self.machine.roots_locomotion() {
            self.locomotion.rooted()
        } else {
            self.locomotion
        };
        self.last_sample = self.compositor.step(&locomotion);
        self.last_sample
    }
}
