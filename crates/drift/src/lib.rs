//! # Drift
//!
//! Priority-blended movement directive compositor.
//!
//! Drift turns the set of movement requests acting on one body during a tick
//! into a single velocity/momentum pair. Requests ("directives") come from any
//! system that wants to push the body around: an attack lunging forward, a
//! knockback, a dash, a scripted root. Each directive wraps a controller that
//! is either:
//!
//! - **Kinematic**: a velocity the body should adopt, blended by priority
//! - **Dynamic**: a force-like contribution that is summed and, above a
//!   threshold, dominates the kinematic result
//!
//! ## Quick Start
//!
//! ```
//! use drift::{
//!     BlendMode, Compositor, ConstantVelocity, DirectiveDefinition, Locomotion,
//!     MotionConfig, MovementDirective, OwnerId, ScopeId,
//! };
//! use glam::Vec3;
//!
//! let mut compositor = Compositor::new(MotionConfig::default());
//!
//! // A lunge that overrides everything below it for 5 frames
//! compositor.push(MovementDirective::new(
//!     OwnerId::new(1),
//!     ScopeId::new(7),
//!     Box::new(
//!         ConstantVelocity::kinematic(Vec3::new(0.0, 0.0, 8.0))
//!             .with_mode(BlendMode::Ignore)
//!             .with_priority(10)
//!             .for_frames(5),
//!     ),
//!     DirectiveDefinition::new("lunge"),
//! ));
//!
//! let sample = compositor.step(&Locomotion::idle(Vec3::Z));
//! assert_eq!(sample.kinematic, Vec3::new(0.0, 0.0, 8.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod compositor;
pub mod config;
pub mod controller;
pub mod directive;
pub mod locomotion;
pub mod modifier;
pub mod owner;

// Re-exports for convenience
pub use compositor::{CompositeSample, Compositor};
pub use config::MotionConfig;
pub use controller::{
    BlendMode, ConstantVelocity, ControllerContext, ControllerKind, Impulse, MovementController,
};
pub use directive::{DirectiveDefinition, MovementDirective};
pub use locomotion::{move_toward, Locomotion};
pub use modifier::{SpeedModifier, SpeedModifiers};
pub use owner::{OwnerId, ScopeId};
