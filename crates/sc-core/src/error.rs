use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Missing parameter: {name}")]
    MissingParameter { name: String },

    #[error("Unit mismatch for {context}: expected {expected}, found {found}")]
    UnitMismatch {
        context: String,
        expected: String,
        found: String,
    },

    #[error("Could not parse unit '{input}': {reason}")]
    UnitParse { input: String, reason: String },

    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl CoreError {
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    /// True for errors caused by a missing store key.
    pub fn is_missing_parameter(&self) -> bool {
        matches!(self, Self::MissingParameter { .. })
    }
}
