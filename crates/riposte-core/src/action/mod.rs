//! Actions: static definitions, the shared library, predicates, live
//! instance state and the phase machine that drives it.
//!
//! ```text
//! Idle ──activate──► Charging ──► Fire ──► FireEnd ──► release
//!                        ▲                    │
//!                        └──── chain ◄────────┘
//! ```

mod definition;
mod library;
mod machine;
mod predicate;
mod runtime;

pub use definition::{
    ActionDefinition, ActionFlags, ActivationPolicy, ControlDelta, EffectAction,
    EffectDeclaration, MovementDeclaration, TerminationPolicy, Timing, MAX_MOVEMENT_DECLARATIONS,
};
pub use library::{ActionLibrary, UnresolvedReference};
pub use machine::{MachineInput, PhaseMachine};
pub use predicate::{PredicateContext, PredicateRegistry};
pub use runtime::{ActionRuntimeState, Phase};
