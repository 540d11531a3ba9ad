//! Applies command buffer operations.

use tracing::warn;

use crate::actor::Actor;
use crate::output::{CommandOp, Output, OutputEnvelope, OutputKind};

use super::Resolver;

/// Resolver for [`CommandOp`] outputs.
///
/// A failed operation (consuming a command that is gone, locking an intent
/// without an active command) is logged and skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandResolver;

impl Resolver for CommandResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Command]
    }

    fn resolve(&self, outputs: &[&OutputEnvelope], actor: &mut Actor) {
        for envelope in outputs {
            let Output::Command(op) = envelope.output() else {
                continue;
            };
            let commands = actor.commands_mut();
            let result = match op {
                CommandOp::Consume { intent } => commands.consume(intent).map(|_| ()),
                CommandOp::Lock { intent } => commands.lock(intent),
                CommandOp::Unlock { intent } => commands.unlock(intent),
            };
            if let Err(err) = result {
                warn!(actor = %envelope.actor(), tick = envelope.tick(), %err, "command operation skipped");
            }
        }
    }
}
