//! The per-actor ability/weapon phase state machine.
//!
//! # Tick Order
//!
//! 1. Advance cooldowns and age the live instance
//! 2. Activation: buffered commands in FIFO order, first candidate that
//!    passes every gate wins (at most one activation per tick)
//! 3. Drive the live instance: forced-exit check, then the phase loop.
//!    `Charging → Fire` may cascade within one tick, as may `Fire → FireEnd`
//!    for a zero fire duration. FireEnd never releases on its entry tick.
//! 4. A ready instance chains through its available controls if it can,
//!    otherwise it releases
//!
//! The machine never touches the command buffer, lock registry or
//! compositor. Every side effect is an [`Output`] resolved by the engine.

use std::collections::BTreeSet;
use std::sync::Arc;

use drift::ScopeId;
use tracing::{debug, trace, warn};

use crate::action::definition::{
    ActionDefinition, ActionFlags, ActivationPolicy, EffectAction, TerminationPolicy,
};
use crate::action::library::ActionLibrary;
use crate::action::predicate::{PredicateContext, PredicateRegistry};
use crate::action::runtime::{ActionRuntimeState, Phase};
use crate::cooldown::CooldownTracker;
use crate::ids::{ActionName, ActorId, CommandId, Intent};
use crate::input::CommandSnapshot;
use crate::lock::{LockRequest, LockSnapshot};
use crate::output::{
    ActivationKind, CommandOp, DenialReason, EffectRequest, Event, MovementOp, Output,
    ReleaseReason,
};

/// Snapshots the machine reads during one tick.
#[derive(Debug, Clone, Copy)]
pub struct MachineInput<'a> {
    /// Current tick.
    pub tick: u64,
    /// Command snapshot published this tick.
    pub commands: &'a CommandSnapshot,
    /// Lock snapshot for this tick.
    pub locks: &'a LockSnapshot,
}

type Denial = (Option<ActionName>, DenialReason);

enum ChargeOutcome {
    Hold,
    Fire,
    Cancel,
}

/// Phase state machine for one actor.
#[derive(Debug)]
pub struct PhaseMachine {
    actor: ActorId,
    library: Arc<ActionLibrary>,
    predicates: Arc<PredicateRegistry>,
    tick_rate: u32,
    cooldowns: CooldownTracker,
    instance: Option<ActionRuntimeState>,
    serial: u64,
    consumed: BTreeSet<CommandId>,
    outputs: Vec<Output>,
}

impl PhaseMachine {
    /// Creates an idle machine.
    #[must_use]
    pub fn new(
        actor: ActorId,
        library: Arc<ActionLibrary>,
        predicates: Arc<PredicateRegistry>,
        tick_rate: u32,
    ) -> Self {
        Self {
            actor,
            library,
            predicates,
            tick_rate: tick_rate.max(1),
            cooldowns: CooldownTracker::new(),
            instance: None,
            serial: 0,
            consumed: BTreeSet::new(),
            outputs: Vec::new(),
        }
    }

    // =========================================================================
    // Accessors and External Requests
    // =========================================================================

    /// Owning actor.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// Live instance, if any.
    #[must_use]
    pub fn instance(&self) -> Option<&ActionRuntimeState> {
        self.instance.as_ref()
    }

    /// Phase of the live instance, `Idle` if none.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.instance.as_ref().map_or(Phase::Idle, |s| s.phase)
    }

    /// Cooldown countdowns.
    #[must_use]
    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    /// Mutable cooldowns, for external resets.
    pub fn cooldowns_mut(&mut self) -> &mut CooldownTracker {
        &mut self.cooldowns
    }

    /// Whether the live action suspends free locomotion.
    #[must_use]
    pub fn roots_locomotion(&self) -> bool {
        self.instance
            .as_ref()
            .and_then(|s| self.library.get(&s.action))
            .is_some_and(|d| d.flags.contains(ActionFlags::ROOTS_LOCOMOTION))
    }

    /// Marks the live instance finished; it releases (or chains) next tick.
    /// Returns whether an instance was live.
    pub fn finish(&mut self) -> bool {
        self.instance.as_mut().is_some_and(|s| {
            s.mark_ready(ReleaseReason::Finished);
            true
        })
    }

    /// Cancels the live instance on the next tick without chaining.
    /// Returns whether an instance was live.
    pub fn request_cancel(&mut self) -> bool {
        self.instance.as_mut().is_some_and(|s| {
            s.mark_ready(ReleaseReason::Cancelled);
            true
        })
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Runs one tick and returns the outputs in emission order.
    pub fn tick(&mut self, input: &MachineInput<'_>) -> Vec<Output> {
        self.consumed.clear();
        self.cooldowns.tick();
        if let Some(state) = self.instance.as_mut() {
            state.phase_frame = state.phase_frame.saturating_add(1);
        }

        self.try_activate(input);
        self.drive(input, true);

        std::mem::take(&mut self.outputs)
    }

    fn try_activate(&mut self, input: &MachineInput<'_>) {
        let library = Arc::clone(&self.library);
        for command in input.commands.buffered_fifo() {
            if self.consumed.contains(&command.id) {
                continue;
            }
            match self.resolve_candidate(&library, &command.intent, input) {
                Ok((definition, kind)) => {
                    let previous = self.instance.take();
                    self.activate(definition, kind, previous, input);
                    return;
                }
                Err((action, reason)) => {
                    trace!(
                        actor = %self.actor,
                        intent = %command.intent,
                        %reason,
                        "activation denied"
                    );
                    if command.press_frame == input.tick {
                        self.outputs.push(Output::Event(Event::ActivationDenied {
                            intent: command.intent.clone(),
                            action,
                            reason,
                        }));
                    }
                }
            }
        }
    }

    fn drive(&mut self, input: &MachineInput<'_>, allow_chain: bool) {
        let Some(mut state) = self.instance.take() else {
            return;
        };
        let library = Arc::clone(&self.library);
        let Some(definition) = library.get(&state.action) else {
            warn!(actor = %self.actor, action = %state.action, "live action has no definition");
            self.release(state, ReleaseReason::Cancelled, input);
            return;
        };

        if !state.ready_to_release && Self::forced_exit(&state, definition, input.commands) {
            state.mark_ready(ReleaseReason::InputReleased);
        }
        if !state.ready_to_release {
            self.advance_phases(&mut state, definition, input.commands);
        }
        if !state.ready_to_release {
            self.instance = Some(state);
            return;
        }

        let reason = state.release_reason.unwrap_or(ReleaseReason::Completed);
        if allow_chain && reason != ReleaseReason::Cancelled {
            if let Some(next) = self.chain_at_release(&library, &state, definition, input) {
                self.activate(next, ActivationKind::Chained, Some(state), input);
                self.drive(input, false);
                return;
            }
        }
        self.release(state, reason, input);
    }

    // =========================================================================
    // Candidate Resolution and Gates
    // =========================================================================

    fn resolve_candidate<'l>(
        &self,
        library: &'l ActionLibrary,
        intent: &Intent,
        input: &MachineInput<'_>,
    ) -> Result<(&'l ActionDefinition, ActivationKind), Denial> {
        let Some(current) = self.instance.as_ref() else {
            let definition = library
                .default_for(intent)
                .ok_or((None, DenialReason::Unbound))?;
            let named = |reason| (Some(definition.name.clone()), reason);
            if !Self::all_live(definition, input.commands) {
                return Err(named(DenialReason::MissingCapability));
            }
            self.check_gates(definition, None, false, input)
                .map_err(named)?;
            return Ok((definition, ActivationKind::Fresh));
        };

        let swap = library
            .get(&current.action)
            .and_then(|d| d.swap_on_fire.as_ref());
        let mut denial: Option<Denial> = None;
        for name in control_order(current, swap) {
            let Some(definition) = library.get(name) else {
                debug!(action = %name, "control target is not defined");
                continue;
            };
            if !definition.requires(intent) || !Self::all_live(definition, input.commands) {
                continue;
            }
            match self.check_gates(definition, Some(current), false, input) {
                Ok(()) => return Ok((definition, ActivationKind::Chained)),
                Err(reason) => {
                    if denial.is_none() {
                        denial = Some((Some(definition.name.clone()), reason));
                    }
                }
            }
        }

        let Some(definition) = library.default_for(intent) else {
            return Err(denial.unwrap_or((None, DenialReason::Unbound)));
        };
        let named = |reason| (Some(definition.name.clone()), reason);
        if current.available.contains(&definition.name) {
            return Err(denial.unwrap_or_else(|| named(DenialReason::MissingCapability)));
        }
        if !definition.flags.contains(ActionFlags::INTERRUPTS) {
            return Err(denial.unwrap_or_else(|| named(DenialReason::NotAvailable)));
        }
        if !Self::all_live(definition, input.commands) {
            return Err(named(DenialReason::MissingCapability));
        }
        self.check_gates(definition, Some(current), true, input)
            .map_err(named)?;
        Ok((definition, ActivationKind::Interrupt))
    }

    fn check_gates(
        &self,
        definition: &ActionDefinition,
        current: Option<&ActionRuntimeState>,
        interrupt: bool,
        input: &MachineInput<'_>,
    ) -> Result<(), DenialReason> {
        if self.cooldowns.is_on_cooldown(&definition.name) {
            return Err(DenialReason::OnCooldown);
        }
        if let Some(predicate) = &definition.activation_predicate {
            if !self.predicate_passes(predicate, &definition.name, current, input) {
                return Err(DenialReason::PredicateFailed);
            }
        }

        let locks = input.locks;
        if interrupt {
            // Interrupts override cancelable locks but never hard ones
            if definition.capabilities.iter().any(|c| locks.has_hard_lock(c)) {
                return Err(DenialReason::Locked);
            }
        } else if definition.flags.contains(ActionFlags::RESPECT_LOCKS) {
            let blocked = definition.capabilities.iter().any(|c| match current {
                Some(state) => locks.is_locked_excluding(c, &state.origin),
                None => locks.is_locked(c),
            });
            if blocked {
                return Err(DenialReason::Locked);
            }
        }

        if interrupt && !definition.flags.contains(ActionFlags::CANCEL_DISABLES) {
            let cancelable = current.is_some_and(|state| {
                self.library.get(&state.action).is_some_and(|d| {
                    d.flags.contains(ActionFlags::CANCELABLE)
                        && d.cancel_predicate.as_ref().map_or(true, |p| {
                            self.predicate_passes(p, &d.name, Some(state), input)
                        })
                })
            });
            if !cancelable {
                return Err(DenialReason::NotCancelable);
            }
        }
        Ok(())
    }

    fn predicate_passes(
        &self,
        name: &str,
        action: &ActionName,
        current: Option<&ActionRuntimeState>,
        input: &MachineInput<'_>,
    ) -> bool {
        let ctx = PredicateContext {
            actor: self.actor,
            action,
            tick: input.tick,
            current,
            commands: input.commands,
            locks: input.locks,
        };
        self.predicates.evaluate(name, &ctx).unwrap_or_else(|| {
            warn!(predicate = name, action = %action, "predicate is not registered");
            false
        })
    }

    fn all_live(definition: &ActionDefinition, commands: &CommandSnapshot) -> bool {
        definition
            .capabilities
            .iter()
            .all(|c| commands.is_buffered(c) || commands.is_active(c))
    }

    fn any_owned_up(state: &ActionRuntimeState, commands: &CommandSnapshot) -> bool {
        state.owned.iter().any(|c| commands.is_up(c))
    }

    // =========================================================================
    // Activation and Release
    // =========================================================================

    fn activate(
        &mut self,
        definition: &ActionDefinition,
        kind: ActivationKind,
        previous: Option<ActionRuntimeState>,
        input: &MachineInput<'_>,
    ) {
        let root = match (&previous, kind) {
            (Some(prev), ActivationKind::Chained) => Some(prev.root.clone()),
            _ => definition.root().cloned(),
        };
        let Some(root) = root else {
            warn!(action = %definition.name, "action has no capabilities");
            if let Some(prev) = previous {
                self.instance = Some(prev);
            }
            return;
        };

        if let Some(prev) = previous {
            let reason = match kind {
                ActivationKind::Interrupt => ReleaseReason::Interrupted,
                ActivationKind::Chained | ActivationKind::Fresh => ReleaseReason::Chained,
            };
            self.release(prev, reason, input);
        }

        self.serial += 1;
        let mut state = ActionRuntimeState::new(definition.name.clone(), self.serial, root);

        for capability in &definition.capabilities {
            if let Some(command) = input.commands.buffer.get(capability) {
                if self.consumed.insert(command.id) {
                    self.outputs.push(Output::Command(CommandOp::Consume {
                        intent: capability.clone(),
                    }));
                } else {
                    state.carried.insert(command.id);
                }
                state.claimed.insert(capability.clone(), command.id);
            } else if let Some(command) = input.commands.active.get(capability) {
                state.claimed.insert(capability.clone(), command.id);
                state.carried.insert(command.id);
            }
            state.owned.insert(capability.clone());
        }

        if definition.flags.contains(ActionFlags::REQUEST_LOCKS) {
            for capability in &definition.capabilities {
                self.outputs.push(Output::Lock(LockRequest::Lock {
                    capability: capability.clone(),
                    origin: state.origin.clone(),
                    cancelable: true,
                }));
            }
            state.locks_requested = true;
        }
        if definition.flags.contains(ActionFlags::LOCK_COMMANDS) {
            for capability in state.claimed.keys() {
                self.outputs.push(Output::Command(CommandOp::Lock {
                    intent: capability.clone(),
                }));
                state.locked_commands.push(capability.clone());
            }
        }

        debug!(
            actor = %self.actor,
            action = %definition.name,
            serial = state.serial,
            ?kind,
            "action activated"
        );
        self.outputs.push(Output::Event(Event::Activated {
            action: definition.name.clone(),
            serial: state.serial,
            kind,
        }));

        self.enter_phase(&mut state, definition, Phase::Charging);
        self.instance = Some(state);
    }

    fn release(
        &mut self,
        state: ActionRuntimeState,
        reason: ReleaseReason,
        input: &MachineInput<'_>,
    ) {
        for (_, scope) in &state.movement_scopes {
            self.outputs
                .push(Output::Movement(MovementOp::RemoveScope { scope: *scope }));
        }

        if state.owned.iter().any(|c| input.locks.has_hard_lock(c)) {
            debug!(
                actor = %self.actor,
                action = %state.action,
                "hard lock held at release, leaving effects to expire"
            );
        } else {
            for (effect, cancelable) in &state.applied_effects {
                if *cancelable {
                    self.outputs.push(Output::Effect(EffectRequest::Cancel {
                        effect: effect.clone(),
                        origin: state.origin.clone(),
                    }));
                }
            }
        }

        if state.locks_requested {
            self.outputs.push(Output::Lock(LockRequest::UnlockOrigin {
                origin: state.origin.clone(),
            }));
        }
        for intent in &state.locked_commands {
            self.outputs.push(Output::Command(CommandOp::Unlock {
                intent: intent.clone(),
            }));
        }

        if let Some(definition) = self.library.get(&state.action) {
            self.cooldowns.register(
                definition.name.clone(),
                definition.cooldown_frames(self.tick_rate),
            );
        }

        debug!(
            actor = %self.actor,
            action = %state.action,
            serial = state.serial,
            ?reason,
            "action released"
        );
        self.outputs.push(Output::Event(Event::Released {
            action: state.action,
            serial: state.serial,
            reason,
        }));
    }

    fn chain_at_release<'l>(
        &self,
        library: &'l ActionLibrary,
        state: &ActionRuntimeState,
        definition: &ActionDefinition,
        input: &MachineInput<'_>,
    ) -> Option<&'l ActionDefinition> {
        let swap = definition.swap_on_fire.as_ref();
        for name in control_order(state, swap) {
            let Some(candidate) = library.get(name) else {
                debug!(action = %name, "control target is not defined");
                continue;
            };
            if !Self::all_live(candidate, input.commands) {
                continue;
            }
            let fresh = candidate.capabilities.iter().any(|c| {
                input
                    .commands
                    .buffer
                    .get(c)
                    .is_some_and(|cmd| !self.consumed.contains(&cmd.id))
            });
            // A locked command can outlive its button; a held chain needs the button down
            let held = candidate.activation == ActivationPolicy::WhileHeld
                && candidate
                    .capabilities
                    .iter()
                    .all(|c| !input.commands.is_up(c));
            let exempt = swap == Some(name) || held;
            if !fresh && !exempt {
                continue;
            }
            if self.check_gates(candidate, Some(state), false, input).is_ok() {
                return Some(candidate);
            }
        }
        None
    }

    // =========================================================================
    // Phase Logic
    // =========================================================================

    fn forced_exit(
        state: &ActionRuntimeState,
        definition: &ActionDefinition,
        commands: &CommandSnapshot,
    ) -> bool {
        // Release is the fire trigger while an OnRelease action charges
        if definition.activation == ActivationPolicy::OnRelease && state.phase == Phase::Charging {
            return false;
        }
        match definition.termination {
            TerminationPolicy::OnRelease => Self::any_owned_up(state, commands),
            TerminationPolicy::OnRootRelease => commands.is_up(&state.root),
            TerminationPolicy::AfterFire | TerminationPolicy::Manual => false,
        }
    }

    fn advance_phases(
        &mut self,
        state: &mut ActionRuntimeState,
        definition: &ActionDefinition,
        commands: &CommandSnapshot,
    ) {
        loop {
            match state.phase {
                Phase::Idle => {
                    state.mark_ready(ReleaseReason::Completed);
                    return;
                }
                Phase::Charging => match self.charge_outcome(state, definition, commands) {
                    ChargeOutcome::Hold => return,
                    ChargeOutcome::Cancel => {
                        state.mark_ready(ReleaseReason::Cancelled);
                        return;
                    }
                    ChargeOutcome::Fire => self.enter_phase(state, definition, Phase::Fire),
                },
                Phase::Fire => {
                    let done = match definition.activation {
                        ActivationPolicy::WhileHeld => Self::any_owned_up(state, commands),
                        ActivationPolicy::OnPress
                        | ActivationPolicy::OnChargeComplete
                        | ActivationPolicy::OnRelease => {
                            state.phase_frame >= definition.fire_frames(self.tick_rate)
                        }
                    };
                    if !done {
                        return;
                    }
                    self.enter_phase(state, definition, Phase::FireEnd);
                }
                Phase::FireEnd => {
                    let window = definition.control_window_frames(self.tick_rate);
                    if state.phase_frame > window
                        && definition.termination != TerminationPolicy::Manual
                    {
                        state.mark_ready(ReleaseReason::Completed);
                    }
                    return;
                }
            }
        }
    }

    fn charge_outcome(
        &self,
        state: &ActionRuntimeState,
        definition: &ActionDefinition,
        commands: &CommandSnapshot,
    ) -> ChargeOutcome {
        let complete = state.phase_frame >= definition.charge_frames(self.tick_rate);
        let released = Self::any_owned_up(state, commands);
        match definition.activation {
            ActivationPolicy::OnPress | ActivationPolicy::OnChargeComplete => {
                if complete {
                    ChargeOutcome::Fire
                } else {
                    ChargeOutcome::Hold
                }
            }
            ActivationPolicy::WhileHeld => {
                if released {
                    ChargeOutcome::Cancel
                } else if complete {
                    ChargeOutcome::Fire
                } else {
                    ChargeOutcome::Hold
                }
            }
            ActivationPolicy::OnRelease => {
                let fraction = definition.charge_fraction(state.phase_frame, self.tick_rate);
                if released {
                    if fraction >= definition.min_charge_to_fire {
                        ChargeOutcome::Fire
                    } else {
                        ChargeOutcome::Cancel
                    }
                } else if complete && definition.flags.contains(ActionFlags::FORCE_FIRE_AT_FULL_CHARGE)
                {
                    ChargeOutcome::Fire
                } else {
                    ChargeOutcome::Hold
                }
            }
        }
    }

    fn enter_phase(
        &mut self,
        state: &mut ActionRuntimeState,
        definition: &ActionDefinition,
        phase: Phase,
    ) {
        let previous = state.phase;
        let outputs = &mut self.outputs;
        state.movement_scopes.retain(|(tag, scope)| {
            if *tag == previous {
                outputs.push(Output::Movement(MovementOp::RemoveScope { scope: *scope }));
                false
            } else {
                true
            }
        });

        state.phase = phase;
        state.phase_frame = 0;

        if let Some(delta) = definition.controls.get(&phase) {
            for name in &delta.remove {
                state.available.remove(name);
            }
            for name in &delta.add {
                state.available.insert(name.clone());
            }
        }
        if phase == Phase::Fire {
            if let Some(target) = &definition.swap_on_fire {
                state.available.insert(target.clone());
            }
        }

        for declaration in definition.effects.iter().filter(|d| d.phase == phase) {
            match declaration.action {
                EffectAction::Apply => {
                    state
                        .applied_effects
                        .insert(declaration.effect.clone(), declaration.cancelable);
                    self.outputs.push(Output::Effect(EffectRequest::Apply {
                        effect: declaration.effect.clone(),
                        origin: state.origin.clone(),
                        cancelable: declaration.cancelable,
                    }));
                }
                EffectAction::Cancel => {
                    if state.applied_effects.remove(&declaration.effect).is_some() {
                        self.outputs.push(Output::Effect(EffectRequest::Cancel {
                            effect: declaration.effect.clone(),
                            origin: state.origin.clone(),
                        }));
                    } else {
                        debug!(effect = %declaration.effect, "cancel targets an effect that was never applied");
                    }
                }
            }
        }

        for (index, declaration) in definition.movement.iter().enumerate() {
            if declaration.phase != phase {
                continue;
            }
            let scope = ScopeId::new((state.serial << 8) | (index as u64 & 0xff));
            self.outputs.push(Output::Movement(MovementOp::Push {
                scope,
                declaration: declaration.clone(),
            }));
            state.movement_scopes.push((phase, scope));
        }

        trace!(
            actor = %self.actor,
            action = %state.action,
            %phase,
            "phase entered"
        );
        self.outputs.push(Output::Event(Event::PhaseEntered {
            action: state.action.clone(),
            serial: state.serial,
            phase,
        }));
    }
}

/// Available controls with the swap target first.
fn control_order<'a>(
    state: &'a ActionRuntimeState,
    swap: Option<&'a ActionName>,
) -> Vec<&'a ActionName> {
    let mut order = Vec::with_capacity(state.available.len());
    if let Some(target) = swap.filter(|t| state.available.contains(*t)) {
        order.push(target);
    }
    order.extend(state.available.iter().filter(|n| Some(*n) != swap));
    order
}
