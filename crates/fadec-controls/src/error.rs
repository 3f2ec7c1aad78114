//! Error types for control logic.

use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors raised when host discrete values do not map onto a known setting.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Igniter selector position outside crank/normal/start.
    #[error("Unknown igniter position: {code}")]
    UnknownIgniter { code: f64 },

    /// Engine state code outside the five known states.
    #[error("Unknown engine state: {code}")]
    UnknownState { code: f64 },

    /// Thrust lever limit type outside the known detents.
    #[error("Unknown thrust limit type: {code}")]
    UnknownLimitType { code: f64 },
}
