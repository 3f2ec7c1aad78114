use thiserror::Error;

pub type FadecResult<T> = Result<T, FadecError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FadecError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
