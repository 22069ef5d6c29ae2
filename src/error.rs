//! Error types for dependency discovery

use thiserror::Error;

/// Result type alias for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Main error type for the discovery crate
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Invalid configuration: {name} = {value}, {reason}")]
    InvalidConfig {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Target attribute invalid: {0}")]
    TargetAttributeInvalid(String),

    #[error("Optimistic estimator unsound at {subset}: score {score} exceeds bound {bound}")]
    EstimatorUnsound {
        subset: String,
        score: f64,
        bound: f64,
    },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DiscoveryError {
    /// Shorthand for an [`DiscoveryError::InvalidConfig`] error
    pub fn invalid_config(
        name: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        DiscoveryError::InvalidConfig {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<ndarray::ShapeError> for DiscoveryError {
    fn from(err: ndarray::ShapeError) -> Self {
        DiscoveryError::ShapeError {
            expected: "consistent rows x attributes layout".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for DiscoveryError {
    fn from(err: serde_json::Error) -> Self {
        // Unknown enumeration tokens and out-of-range values are configuration mistakes,
        // malformed documents are serialization failures.
        match err.classify() {
            serde_json::error::Category::Data => DiscoveryError::InvalidConfig {
                name: "config".to_string(),
                value: format!("line {} column {}", err.line(), err.column()),
                reason: err.to_string(),
            },
            _ => DiscoveryError::SerializationError(err.to_string()),
        }
    }
}
