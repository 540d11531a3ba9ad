//! Resolvers apply phase machine outputs to the emitting actor.
//!
//! Each resolver declares the [`OutputKind`]s it handles. The engine routes
//! an actor's outputs to every resolver that handles their kind, in the
//! order the resolvers were registered, preserving emission order within
//! each resolver.
//!
//! # Invariants
//!
//! - A resolver only mutates the actor it is handed
//! - Failures are logged and skipped; resolution never aborts a tick
//!
//! # Available Resolvers
//!
//! - [`CommandResolver`]: consume/lock/unlock commands
//! - [`LockResolver`]: trigger lock requests
//! - [`MovementResolver`]: push/remove movement directives

mod command;
mod lock;
mod movement;

pub use command::CommandResolver;
pub use lock::LockResolver;
pub use movement::MovementResolver;

use crate::actor::Actor;
use crate::output::{OutputEnvelope, OutputKind};

/// Applies routed outputs to an actor.
///
/// # Example
///
/// ```
/// use riposte_core::actor::Actor;
/// use riposte_core::output::{OutputEnvelope, OutputKind};
/// use riposte_core::resolver::Resolver;
///
/// struct CountingResolver;
///
/// impl Resolver for CountingResolver {
///     fn handles(&self) -> &[OutputKind] {
///         &[OutputKind::Event]
///     }
///
///     fn resolve(&self, outputs: &[&OutputEnvelope], _actor: &mut Actor) {
///         println!("{} events", outputs.len());
///     }
/// }
/// ```
pub trait Resolver: Send + Sync {
    /// Output kinds this resolver handles.
    fn handles(&self) -> &[OutputKind];

    /// Applies `outputs` (already filtered by [`handles`](Self::handles)) to `actor`.
    fn resolve(&self, outputs: &[&OutputEnvelope], actor: &mut Actor);
}

/// The resolvers every engine starts with.
#[must_use]
pub fn default_resolvers() -> Vec<Box<dyn Resolver>> {
    vec![
        Box::new(CommandResolver),
        Box::new(LockResolver),
        Box::new(MovementResolver),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_is_object_safe() {
        fn _accepts_boxed(_resolver: Box<dyn Resolver>) {}
        fn _accepts_slice(_resolvers: &[Box<dyn Resolver>]) {}
    }

    #[test]
    fn default_resolvers_cover_internal_kinds() {
        let resolvers = default_resolvers();
        for kind in [OutputKind::Command, OutputKind::Lock, OutputKind::Movement] {
            assert!(resolvers.iter().any(|r| r.handles().contains(&kind)));
        }
        for kind in [OutputKind::Event, OutputKind::Effect, OutputKind::Motion] {
            assert!(!resolvers.iter().any(|r| r.handles().contains(&kind)));
        }
    }
}
