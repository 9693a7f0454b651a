use crate::config::error::ConfigError;
use thiserror::Error;

/// Application-wide error type for everything outside the relay contract.
///
/// Delivery failures never surface here: the relay absorbs them into a
/// `RelayResult`, and the callable route reports protocol errors with its own
/// body. `AppError` covers startup, configuration, CLI arguments and the
/// process-wide messaging handle.
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// A process-wide component was initialized twice
    #[error("{component} is already initialized")]
    AlreadyInitialized { component: String },

    /// A process-wide component was used before initialization
    #[error("{component} is not initialized")]
    NotInitialized { component: String },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Shorthand for a configuration error carrying a plain message
    pub fn configuration(key: impl Into<String>, message: impl std::fmt::Display) -> Self {
        AppError::Configuration {
            key: key.into(),
            source: anyhow::anyhow!("{}", message),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::Invalid { key, reason } => AppError::Validation { field: key, reason },
            other => AppError::Configuration {
                key: "settings".to_string(),
                source: other.into(),
            },
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
