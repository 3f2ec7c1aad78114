//! Error types for frame orchestration.

use thiserror::Error;

/// Errors raised by the session, the host bridge and the scenario runner.
///
/// A running frame never fails on numeric grounds; these cover malformed
/// configuration and host data that does not map onto a known setting.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Engine count {count} not supported (expected 2 or 4)")]
    EngineCount { count: usize },

    #[error("Frame carries {got} engines, session has {expected}")]
    EngineMismatch { expected: usize, got: usize },

    #[error("Missing host variable: {name}")]
    MissingVariable { name: String },

    #[error("Scenario error: {message}")]
    Scenario { message: String },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<fadec_core::FadecError> for SimError {
    fn from(e: fadec_core::FadecError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<fadec_engine::ModelError> for SimError {
    fn from(e: fadec_engine::ModelError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<fadec_controls::ControlError> for SimError {
    fn from(e: fadec_controls::ControlError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for SimError {
    fn from(e: serde_yaml::Error) -> Self {
        SimError::Scenario {
            message: e.to_string(),
        }
    }
}
