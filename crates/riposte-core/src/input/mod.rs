//! Input buttons and the command buffer built on top of them.
//!
//! Raw press/release edges are queued per intent on a [`ButtonRegistry`].
//! Once per tick the registry resolves at most one edge per intent, and the
//! [`CommandBuffer`] turns fresh presses into [`Command`] tokens and
//! publishes an immutable [`CommandSnapshot`].

mod button;
mod command;

pub use button::{ButtonRegistry, InputButton, InputEdge, InputEvent};
pub use command::{Command, CommandBuffer, CommandSnapshot};
