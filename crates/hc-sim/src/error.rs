//! Error types for the reference host.

use thiserror::Error;

/// Errors encountered while assembling or running a network.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error(transparent)]
    Control(#[from] hc_controls::ControlError),

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<hc_core::HcError> for SimError {
    fn from(e: hc_core::HcError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}
