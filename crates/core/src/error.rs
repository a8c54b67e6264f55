//! Error types shared by LearnHub services

use thiserror::Error;

/// Errors raised by the shared core utilities
#[derive(Debug, Error)]
pub enum LearnHubError {
    #[error("Configuration error: {message}")]
    ConfigurationError {
        message: String,
        key: Option<String>,
    },

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Logging initialisation failed: {0}")]
    LoggingError(String),
}

impl LearnHubError {
    /// Environment variable responsible for a configuration error, if any
    pub fn config_key(&self) -> Option<&str> {
        match self {
            LearnHubError::ConfigurationError { key, .. } => key.as_deref(),
            _ => None,
        }
    }
}
