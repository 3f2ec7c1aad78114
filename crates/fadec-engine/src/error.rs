//! Error types for engine model operations.

use fadec_core::FadecError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Imbalance slot {slot} value {value} out of range (0..={max})")]
    ImbalanceOutOfRange {
        slot: &'static str,
        value: u32,
        max: u32,
    },

    #[error("Malformed imbalance code: {value}")]
    MalformedCode { value: f64 },

    #[error("Unknown thrust limit type code: {code}")]
    UnknownLimitType { code: i64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type ModelResult<T> = Result<T, ModelError>;

impl From<ModelError> for FadecError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::ImbalanceOutOfRange { slot, .. } => FadecError::InvalidArg { what: slot },
            ModelError::MalformedCode { .. } => FadecError::InvalidArg {
                what: "imbalance code",
            },
            ModelError::UnknownLimitType { .. } => FadecError::InvalidArg {
                what: "thrust limit type",
            },
            ModelError::InvalidArg { what } => FadecError::InvalidArg { what },
        }
    }
}
