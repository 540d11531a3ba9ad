//! Command tokens and the per-actor command buffer.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::CommandError;
use crate::ids::{CommandId, Intent};
use crate::input::button::{ButtonRegistry, InputButton};
use crate::lock::LockSnapshot;

/// One press-to-release lifecycle of an intent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    /// Identity, increasing with every press.
    pub id: CommandId,
    /// Intent that was pressed.
    pub intent: Intent,
    /// Tick on which the press edge was seen.
    pub press_frame: u64,
    /// Locked commands survive the release of their button.
    pub locked: bool,
}

/// Immutable view of a command buffer, published once per tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSnapshot {
    /// Bumped on every publish.
    pub version: u64,
    /// Tick the snapshot was taken on.
    pub frame: u64,
    /// Commands claimed by an activation.
    pub active: BTreeMap<Intent, Command>,
    /// Pressed commands waiting to be consumed.
    pub buffer: BTreeMap<Intent, Command>,
    /// Button state at publish time.
    pub buttons: BTreeMap<Intent, InputButton>,
}

impl CommandSnapshot {
    /// Buffered commands, earliest press first (ties by id).
    #[must_use]
    pub fn buffered_fifo(&self) -> Vec<&Command> {
        let mut commands: Vec<&Command> = self.buffer.values().collect();
        commands.sort_by_key(|c| (c.press_frame, c.id));
        commands
    }

    /// Whether `intent` has a buffered command.
    #[must_use]
    pub fn is_buffered(&self, intent: &Intent) -> bool {
        self.buffer.contains_key(intent)
    }

    /// Whether `intent` has an active command.
    #[must_use]
    pub fn is_active(&self, intent: &Intent) -> bool {
        self.active.contains_key(intent)
    }

    /// Button state for `intent`.
    #[must_use]
    pub fn button(&self, intent: &Intent) -> Option<&InputButton> {
        self.buttons.get(intent)
    }

    /// Whether the button for `intent` is up. Unknown intents are up.
    #[must_use]
    pub fn is_up(&self, intent: &Intent) -> bool {
        self.buttons.get(intent).map_or(true, InputButton::is_up)
    }
}

/// Command buffer for one actor.
///
/// # Per-tick update
///
/// 1. Every fresh press creates a command in *buffer*, replacing a stale
///    buffered one and superseding a stale active one for the same intent
/// 2. Commands whose button is up and which are neither command-locked nor
///    trigger-locked are removed
/// 3. Buffered commands older than the buffer window are dropped
/// 4. A new [`CommandSnapshot`] is published
///
/// An intent is never in both *buffer* and *active*.
///
/// # Example
///
/// ```
/// use riposte_core::ids::Intent;
/// use riposte_core::input::{ButtonRegistry, CommandBuffer, InputEdge};
/// use riposte_core::lock::LockSnapshot;
///
/// let attack = Intent::new("Attack1");
/// let mut buttons = ButtonRegistry::new();
/// let mut commands = CommandBuffer::new(None);
///
/// buttons.queue(attack.clone(), InputEdge::Press);
/// buttons.resolve_edges(6);
/// let snapshot = commands.update(0, &buttons, &LockSnapshot::default());
/// assert!(snapshot.is_buffered(&attack));
///
/// commands.consume(&attack).unwrap();
/// assert!(commands.snapshot().is_buffered(&attack)); // published view is unchanged
/// ```
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    next_id: u64,
    active: BTreeMap<Intent, Command>,
    buffer: BTreeMap<Intent, Command>,
    buffer_window: Option<u32>,
    version: u64,
    snapshot: Arc<CommandSnapshot>,
}

impl CommandBuffer {
    /// Creates an empty buffer. Buffered commands older than
    /// `buffer_window` ticks are dropped; `None` keeps them while held.
    #[must_use]
    pub fn new(buffer_window: Option<u32>) -> Self {
        Self {
            next_id: 0,
            active: BTreeMap::new(),
            buffer: BTreeMap::new(),
            buffer_window,
            version: 0,
            snapshot: Arc::new(CommandSnapshot::default()),
        }
    }

    /// Runs the per-tick update and publishes a snapshot.
    pub fn update(
        &mut self,
        frame: u64,
        buttons: &ButtonRegistry,
        locks: &LockSnapshot,
    ) -> Arc<CommandSnapshot> {
        for (intent, button) in buttons.iter() {
            if !button.pressed_this_frame {
                continue;
            }
            if let Some(stale) = self.active.remove(intent) {
                trace!(intent = %intent, command = %stale.id, "fresh press supersedes active command");
            }
            self.next_id += 1;
            let command = Command {
                id: CommandId::new(self.next_id),
                intent: intent.clone(),
                press_frame: frame,
                locked: false,
            };
            self.buffer.insert(intent.clone(), command);
        }

        let releasable =
            |c: &Command| buttons.is_up(&c.intent) && !c.locked && !locks.is_locked(&c.intent);
        self.active.retain(|_, c| !releasable(c));
        self.buffer.retain(|_, c| !releasable(c));

        if let Some(window) = self.buffer_window {
            self.buffer
                .retain(|_, c| frame.saturating_sub(c.press_frame) <= u64::from(window));
        }

        self.version += 1;
        self.snapshot = Arc::new(CommandSnapshot {
            version: self.version,
            frame,
            active: self.active.clone(),
            buffer: self.buffer.clone(),
            buttons: buttons.buttons().clone(),
        });
        Arc::clone(&self.snapshot)
    }

    /// Most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CommandSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Moves the buffered command for `intent` to *active*.
    ///
    /// # Errors
    ///
    /// [`CommandError::NoBufferedCommand`] if nothing is buffered for `intent`.
    pub fn consume(&mut self, intent: &Intent) -> Result<CommandId, CommandError> {
        let command = self
            .buffer
            .remove(intent)
            .ok_or_else(|| CommandError::NoBufferedCommand(intent.clone()))?;
        let id = command.id;
        self.active.insert(intent.clone(), command);
        Ok(id)
    }

    /// Locks the active command for `intent` so it outlives its button.
    ///
    /// # Errors
    ///
    /// [`CommandError::NoActiveCommand`] if `intent` has no active command.
    pub fn lock(&mut self, intent: &Intent) -> Result<(), CommandError> {
        self.set_locked(intent, true)
    }

    /// Unlocks the active command for `intent`.
    ///
    /// # Errors
    ///
    /// [`CommandError::NoActiveCommand`] if `intent` has no active command.
    pub fn unlock(&mut self, intent: &Intent) -> Result<(), CommandError> {
        self.set_locked(intent, false)
    }

    fn set_locked(&mut self, intent: &Intent, locked: bool) -> Result<(), CommandError> {
        let command = self
            .active
            .get_mut(intent)
            .ok_or_else(|| CommandError::NoActiveCommand(intent.clone()))?;
        command.locked = locked;
        Ok(())
    }

    /// Live active command for `intent`.
    #[must_use]
    pub fn active(&self, intent: &Intent) -> Option<&Command> {
        self.active.get(intent)
    }

    /// Live buffered command for `intent`.
    #[must_use]
    pub fn buffered(&self, intent: &Intent) -> Option<&Command> {
        self.buffer.get(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEdge;
    use crate::lock::TriggerLockRegistry;

    fn intent(name: &str) -> Intent {
        Intent::new(name)
    }

    struct Rig {
        buttons: ButtonRegistry,
        commands: CommandBuffer,
        locks: TriggerLockRegistry,
        frame: u64,
    }

    impl Rig {
        fn new(window: Option<u32>) -> Self {
            Self {
                buttons: ButtonRegistry::new(),
                commands: CommandBuffer::new(window),
                locks: TriggerLockRegistry::new(),
                frame: 0,
            }
        }

        fn tick(&mut self) -> Arc<CommandSnapshot> {
            self.buttons.resolve_edges(6);
            let snap = self
                .commands
                .update(self.frame, &self.buttons, &self.locks.snapshot());
            self.frame += 1;
            snap
        }
    }

    #[test]
    fn press_is_buffered_same_tick() {
        let mut rig = Rig::new(None);
        rig.buttons.queue(intent("Attack1"), InputEdge::Press);
        let snap = rig.tick();
        assert!(snap.is_buffered(&intent("Attack1")));
        assert!(!snap.is_active(&intent("Attack1")));
        assert_eq!(snap.version, 1);
    }

    #[test]
    fn unconsumed_tap_leaves_buffer_on_release() {
        let mut rig = Rig::new(None);
        rig.buttons.queue(intent("Attack1"), InputEdge::Press);
        rig.buttons.queue(intent("Attack1"), InputEdge::Release);
        assert!(rig.tick().is_buffered(&intent("Attack1")));
        assert!(!rig.tick().is_buffered(&intent("Attack1")));
    }

    #[test]
    fn consume_moves_to_active() {
        let mut rig = Rig::new(None);
        rig.buttons.queue(intent("Attack1"), InputEdge::Press);
        rig.tick();
        rig.commands.consume(&intent("Attack1")).unwrap();
        let snap = rig.tick();
        assert!(snap.is_active(&intent("Attack1")));
        assert!(!snap.is_buffered(&intent("Attack1")));
    }

    #[test]
    fn consume_without_buffer_errors() {
        let mut buffer = CommandBuffer::new(None);
        assert_eq!(
            buffer.consume(&intent("Dash")),
            Err(CommandError::NoBufferedCommand(intent("Dash")))
        );
    }

    #[test]
    fn buffered_fifo_orders_by_press_frame() {
        let mut rig = Rig::new(None);
        rig.buttons.queue(intent("Dash"), InputEdge::Press);
        rig.tick();
        rig.buttons.queue(intent("Attack1"), InputEdge::Press);
        let snap = rig.tick();

        let order: Vec<&str> = snap.buffered_fifo().iter().map(|c| c.intent.as_str()).collect();
        assert_eq!(order, vec!["Dash", "Attack1"]);
    }

    #[test]
    fn locked_command_outlives_release() {
        let mut rig = Rig::new(None);
        rig.buttons.queue(intent("Attack1"), InputEdge::Press);
        rig.tick();
        rig.commands.consume(&intent("Attack1")).unwrap();
        rig.commands.lock(&intent("Attack1")).unwrap();

        rig.buttons.queue(intent("Attack1"), InputEdge::Release);
        assert!(rig.tick().is_active(&intent("Attack1")));

        rig.commands.unlock(&intent("Attack1")).unwrap();
        assert!(!rig.tick().is_active(&intent("Attack1")));
    }

    #[test]
    fn trigger_lock_holds_command_until_cleared() {
        let mut rig = Rig::new(None);
        rig.buttons.queue(intent("Attack1"), InputEdge::Press);
        rig.tick();
        rig.locks.lock(intent("Attack1"), "stun", false).unwrap();
        rig.buttons.queue(intent("Attack1"), InputEdge::Release);
        assert!(rig.tick().is_buffered(&intent("Attack1")));

        rig.locks.unlock(&intent("Attack1"), "stun");
        assert!(!rig.tick().is_buffered(&intent("Attack1")));
    }

    #[test]
    fn lock_without_active_command_errors() {
        let mut buffer = CommandBuffer::new(None);
        assert_eq!(
            buffer.lock(&intent("Attack1")),
            Err(CommandError::NoActiveCommand(intent("Attack1")))
        );
        assert!(buffer.unlock(&intent("Attack1")).is_err());
    }

    #[test]
    fn fresh_press_supersedes_stale_active() {
        let mut rig = Rig::new(None);
        rig.buttons.queue(intent("Attack1"), InputEdge::Press);
        rig.tick();
        let first = rig.commands.consume(&intent("Attack1")).unwrap();
        rig.commands.lock(&intent("Attack1")).unwrap();
        rig.buttons.queue(intent("Attack1"), InputEdge::Release);
        rig.tick();

        rig.buttons.queue(intent("Attack1"), InputEdge::Press);
        let snap = rig.tick();
        assert!(!snap.is_active(&intent("Attack1")));
        assert!(snap.buffer[&intent("Attack1")].id > first);
    }

    #[test]
    fn buffer_window_expires_held_commands() {
        let mut rig = Rig::new(Some(2));
        rig.buttons.queue(intent("Attack1"), InputEdge::Press);
        assert!(rig.tick().is_buffered(&intent("Attack1")));
        assert!(rig.tick().is_buffered(&intent("Attack1")));
        assert!(rig.tick().is_buffered(&intent("Attack1")));
        assert!(!rig.tick().is_buffered(&intent("Attack1")));
    }
}
