//! Error types for pipeline construction and stepping.

use sc_core::CoreError;
use sc_models::ModelError;
use thiserror::Error;

/// Errors raised while building or stepping a vehicle model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid configuration: {what}")]
    InvalidConfiguration { what: String },

    #[error("Model '{model}' requires '{key}', which is neither an initial parameter nor written by an earlier model")]
    UnsatisfiedRead { model: String, key: String },

    #[error("Model '{model}' failed: {source}")]
    Model {
        model: String,
        #[source]
        source: ModelError,
    },

    #[error(transparent)]
    Store(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        SimError::InvalidConfiguration { what: what.into() }
    }

    /// True when the root cause is a missing store key.
    pub fn is_missing_parameter(&self) -> bool {
        match self {
            SimError::Model { source, .. } => source.is_missing_parameter(),
            SimError::Store(e) => e.is_missing_parameter(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_keeps_cause() {
        let err = SimError::Model {
            model: "drag".into(),
            source: CoreError::missing("air_density").into(),
        };
        assert!(err.is_missing_parameter());
        assert!(err.to_string().contains("air_density"));
    }
}
