//! Applies trigger lock requests emitted by actions.

use tracing::warn;

use crate::actor::Actor;
use crate::output::{Output, OutputEnvelope, OutputKind};

use super::Resolver;

/// Resolver for [`LockRequest`](crate::lock::LockRequest) outputs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LockResolver;

impl Resolver for LockResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Lock]
    }

    fn resolve(&self, outputs: &[&OutputEnvelope], actor: &mut Actor) {
        for envelope in outputs {
            let Output::Lock(request) = envelope.output() else {
                continue;
            };
            if let Err(err) = actor.locks_mut().apply(request) {
                warn!(actor = %envelope.actor(), %err, "lock request declined");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionLibrary, PredicateRegistry};
    use crate::config::EngineConfig;
    use crate::ids::{ActorId, Intent};
    use crate::lock::LockRequest;
    use std::sync::Arc;

    #[test]
    fn lock_then_unlock_origin() {
        let mut actor = Actor::new(
            ActorId::new(0),
            &EngineConfig::default(),
            Arc::new(ActionLibrary::new()),
            Arc::new(PredicateRegistry::new()),
        );
        let lock = OutputEnvelope::new(
            Output::Lock(LockRequest::Lock {
                capability: Intent::new("Dash"),
                origin: "action:Roll#1".into(),
                cancelable: true,
            }),
            actor.id(),
            0,
            0,
        );
        LockResolver.resolve(&[&lock], &mut actor);
        assert!(actor.locks().is_locked(&Intent::new("Dash")));

        let unlock = OutputEnvelope::new(
            Output::Lock(LockRequest::UnlockOrigin {
                origin: "action:Roll#1".into(),
            }),
            actor.id(),
            1,
            1,
        );
        LockResolver.resolve(&[&unlock], &mut actor);
        assert!(!actor.locks().is_locked(&Intent::new("Dash")));
    }
}
