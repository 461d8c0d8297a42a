//! Error types for the sc-app service layer.

use std::path::PathBuf;

/// Application error wrapping the lower crates' errors for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scenario error: {0}")]
    Scenario(#[from] sc_project::ProjectError),

    #[error("Failed to write {path}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Simulation error: {0}")]
    Simulation(#[from] sc_sim::SimError),

    #[error("Parameter error: {0}")]
    Parameter(#[from] sc_core::CoreError),

    #[error("Model setup failed: {0}")]
    Model(#[from] sc_models::ModelError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("External data unavailable: {0}")]
    ExternalDataUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

/// Result type for sc-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        AppError::InvalidConfiguration(what.into())
    }
}
