//! Applies movement directive operations to the actor's compositor.

use crate::actor::Actor;
use crate::output::{MovementOp, Output, OutputEnvelope, OutputKind};

use super::Resolver;

/// Resolver for [`MovementOp`] outputs.
///
/// Directives are owned by the actor's [`OwnerId`](drift::OwnerId) handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct MovementResolver;

impl Resolver for MovementResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Movement]
    }

    fn resolve(&self, outputs: &[&OutputEnvelope], actor: &mut Actor) {
        let owner = actor.id().owner();
        for envelope in outputs {
            let Output::Movement(op) = envelope.output() else {
                continue;
            };
            match op {
                MovementOp::Push { scope, declaration } => {
                    actor
                        .compositor_mut()
                        .push(declaration.to_directive(owner, *scope));
                }
                MovementOp::RemoveScope { scope } => {
                    actor.compositor_mut().remove_scope(owner, *scope);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionLibrary, MovementDeclaration, Phase, PredicateRegistry};
    use crate::config::EngineConfig;
    use crate::ids::ActorId;
    use drift::ScopeId;
    use glam::Vec3;
    use std::sync::Arc;

    #[test]
    fn push_and_remove_scope() {
        let mut actor = Actor::new(
            ActorId::new(2),
            &EngineConfig::default(),
            Arc::new(ActionLibrary::new()),
            Arc::new(PredicateRegistry::new()),
        );
        let push = OutputEnvelope::new(
            Output::Movement(MovementOp::Push {
                scope: ScopeId::new(256),
                declaration: MovementDeclaration::kinematic("lunge", Phase::Fire, Vec3::Z),
            }),
            actor.id(),
            0,
            0,
        );
        MovementResolver.resolve(&[&push], &mut actor);
        assert_eq!(actor.compositor().len(), 1);
        let directive = actor.compositor().directives().next().unwrap();
        assert_eq!(directive.owner(), ActorId::new(2).owner());

        let remove = OutputEnvelope::new(
            Output::Movement(MovementOp::RemoveScope {
                scope: ScopeId::new(256),
            }),
            actor.id(),
            1,
            1,
        );
        MovementResolver.resolve(&[&remove], &mut actor);
        assert!(actor.compositor().is_empty());
    }
}
