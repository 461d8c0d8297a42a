//! Error types for energy model evaluation.

use sc_core::CoreError;
use thiserror::Error;

/// Errors that can occur while a model updates the parameter store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Missing parameter or unit mismatch raised by the store.
    #[error(transparent)]
    Store(#[from] CoreError),

    #[error("Non-physical value in {model}: {what}")]
    NonPhysical {
        model: &'static str,
        what: &'static str,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type ModelResult<T> = Result<T, ModelError>;

impl ModelError {
    pub fn is_missing_parameter(&self) -> bool {
        matches!(self, ModelError::Store(e) if e.is_missing_parameter())
    }
}
