//! Error types.
//!
//! Nothing here is fatal to the simulation. Command and lock errors are
//! reported by the engine through `tracing` and the tick continues;
//! definition and config errors surface when a library or config is built.

use thiserror::Error;

use crate::ids::{ActionName, Intent};

/// Errors from [`CommandBuffer`](crate::input::CommandBuffer) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Lock/unlock targeted an intent with no active command.
    #[error("no active command for intent {0}")]
    NoActiveCommand(Intent),
    /// Consume targeted an intent with no buffered command.
    #[error("no buffered command for intent {0}")]
    NoBufferedCommand(Intent),
}

/// Errors from [`TriggerLockRegistry`](crate::lock::TriggerLockRegistry) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// Lock requests are currently disabled.
    #[error("lock requests disabled: {origin} could not lock {capability}")]
    RequestsDisabled {
        /// Capability that was to be locked.
        capability: Intent,
        /// Origin that requested the lock.
        origin: String,
    },
}

/// Errors raised while building an [`ActionLibrary`](crate::action::ActionLibrary).
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Two definitions share a name.
    #[error("duplicate action definition: {0}")]
    Duplicate(ActionName),
    /// A definition requires no capabilities.
    #[error("action {0} requires at least one capability")]
    NoCapabilities(ActionName),
    /// `min_charge_to_fire` outside `[0, 1]`.
    #[error("action {name}: min_charge_to_fire {value} is outside [0, 1]")]
    InvalidChargeFraction {
        /// Offending action.
        name: ActionName,
        /// Offending value.
        value: f32,
    },
    /// More movement declarations than distinct directive scopes.
    #[error("action {name} declares {count} movements, more than the scope limit")]
    TooManyMovementDeclarations {
        /// Offending action.
        name: ActionName,
        /// Declared movement count.
        count: usize,
    },
    /// JSON could not be parsed.
    #[error("action library JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON could not be parsed.
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Tick rate must be positive.
    #[error("tick rate must be positive")]
    ZeroTickRate,
    /// Pass divisors must be positive.
    #[error("pass divisor {name} must be positive")]
    ZeroDivisor {
        /// Name of the offending field.
        name: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_names_intent() {
        let err = CommandError::NoActiveCommand(Intent::new("Dash"));
        assert_eq!(err.to_string(), "no active command for intent Dash");
    }

    #[test]
    fn lock_error_names_origin() {
        let err = LockError::RequestsDisabled {
            capability: Intent::new("Attack1"),
            origin: "stun".to_string(),
        };
        assert!(err.to_string().contains("stun"));
        assert!(err.to_string().contains("Attack1"));
    }

    #[test]
    fn json_errors_convert() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: DefinitionError = parse.unwrap_err().into();
        assert!(matches!(err, DefinitionError::Json(_)));
    }
}
