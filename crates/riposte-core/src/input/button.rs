//! Per-intent edge-triggered button state.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::ids::{ActorId, Intent};

/// Direction of a raw input edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputEdge {
    /// Button went down.
    Press,
    /// Button went up.
    Release,
}

impl InputEdge {
    /// Whether the button is down after this edge.
    #[must_use]
    pub const fn is_down(self) -> bool {
        matches!(self, Self::Press)
    }
}

/// A raw edge addressed to one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Receiving actor.
    pub actor: ActorId,
    /// Intent whose button changed.
    pub intent: Intent,
    /// Edge direction.
    pub edge: InputEdge,
}

impl InputEvent {
    /// Press edge for `intent`.
    #[must_use]
    pub fn press(actor: ActorId, intent: impl Into<Intent>) -> Self {
        Self {
            actor,
            intent: intent.into(),
            edge: InputEdge::Press,
        }
    }

    /// Release edge for `intent`.
    #[must_use]
    pub fn release(actor: ActorId, intent: impl Into<Intent>) -> Self {
        Self {
            actor,
            intent: intent.into(),
            edge: InputEdge::Release,
        }
    }
}

/// Edge flags and elapsed-frame counters for one intent.
///
/// Counters saturate at `u32::MAX`, which is also their value before the
/// first press or release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputButton {
    /// Went down this tick.
    pub pressed_this_frame: bool,
    /// Currently down.
    pub pressed: bool,
    /// Went up this tick.
    pub released_this_frame: bool,
    /// Up, and released no more than `released_recently_frames` ago.
    pub released_recently: bool,
    /// Ticks since the last press edge.
    pub frames_since_press: u32,
    /// Ticks since the last release edge.
    pub frames_since_release: u32,
}

impl Default for InputButton {
    fn default() -> Self {
        Self {
            pressed_this_frame: false,
            pressed: false,
            released_this_frame: false,
            released_recently: false,
            frames_since_press: u32::MAX,
            frames_since_release: u32::MAX,
        }
    }
}

impl InputButton {
    /// Whether the button is up.
    #[must_use]
    pub const fn is_up(&self) -> bool {
        !self.pressed
    }

    fn resolve(&mut self, down: bool, recent_window: u32) {
        let was_down = self.pressed;
        self.pressed_this_frame = down && !was_down;
        self.released_this_frame = !down && was_down;
        self.pressed = down;

        self.frames_since_press = if self.pressed_this_frame {
            0
        } else {
            self.frames_since_press.saturating_add(1)
        };
        self.frames_since_release = if self.released_this_frame {
            0
        } else {
            self.frames_since_release.saturating_add(1)
        };
        self.released_recently = !down && self.frames_since_release <= recent_window;
    }
}

/// Buttons for every intent an actor has ever received input for.
///
/// Edges are queued and resolved once per tick. Each tick consumes queued
/// edges until one actually changes the button, so a press and release
/// queued inside one tick show up as a press this tick and a release on the
/// next. Redundant edges (a press while already down) are discarded.
///
/// # Example
///
/// ```
/// use riposte_core::ids::Intent;
/// use riposte_core::input::{ButtonRegistry, InputEdge};
///
/// let mut buttons = ButtonRegistry::new();
/// let dash = Intent::new("Dash");
///
/// buttons.queue(dash.clone(), InputEdge::Press);
/// buttons.queue(dash.clone(), InputEdge::Release);
///
/// buttons.resolve_edges(6);
/// assert!(buttons.get(&dash).unwrap().pressed_this_frame);
///
/// buttons.resolve_edges(6);
/// assert!(buttons.get(&dash).unwrap().released_this_frame);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ButtonRegistry {
    buttons: BTreeMap<Intent, InputButton>,
    pending: BTreeMap<Intent, VecDeque<InputEdge>>,
}

impl ButtonRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a raw edge for the next [`resolve_edges`](Self::resolve_edges).
    pub fn queue(&mut self, intent: Intent, edge: InputEdge) {
        self.buttons.entry(intent.clone()).or_default();
        self.pending.entry(intent).or_default().push_back(edge);
    }

    /// Recomputes edge flags for every button from the queued raw edges.
    pub fn resolve_edges(&mut self, released_recently_frames: u32) {
        for (intent, button) in &mut self.buttons {
            let mut down = button.pressed;
            if let Some(queue) = self.pending.get_mut(intent) {
                while let Some(edge) = queue.pop_front() {
                    if edge.is_down() != down {
                        down = edge.is_down();
                        break;
                    }
                }
            }
            button.resolve(down, released_recently_frames);
        }
        self.pending.retain(|_, queue| !queue.is_empty());
    }

    /// Button state for `intent`.
    #[must_use]
    pub fn get(&self, intent: &Intent) -> Option<&InputButton> {
        self.buttons.get(intent)
    }

    /// Whether `intent` is up. Unknown intents are up.
    #[must_use]
    pub fn is_up(&self, intent: &Intent) -> bool {
        self.buttons.get(intent).map_or(true, InputButton::is_up)
    }

    /// Iterates buttons in intent order.
    pub fn iter(&self) -> impl Iterator<Item = (&Intent, &InputButton)> {
        self.buttons.iter()
    }

    /// Whether edges are still waiting to be resolved.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn buttons(&self) -> &BTreeMap<Intent, InputButton> {
        &self.buttons
    }
}
