use learnhub_core::LearnHubError;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: &'static str, seconds: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Database(err.to_string())
    }
}

impl From<LearnHubError> for AuthError {
    fn from(err: LearnHubError) -> Self {
        match err {
            LearnHubError::DatabaseError(e) => AuthError::Database(e.to_string()),
            other => AuthError::Config(other.to_string()),
        }
    }
}
