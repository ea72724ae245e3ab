//! Error types for tracker operations

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors that can occur while tracking a job's lifecycle
///
/// Every error is scoped to a single job operation; the tracker performs no
/// retries of its own, so persistence failures surface to the caller as-is.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// No job exists under the given id
    #[error("job not found: {0}")]
    NotFound(Uuid),

    /// Completion was attempted on a job that already has an exit status
    #[error("job already completed: {0}")]
    AlreadyCompleted(Uuid),

    /// The persistence store failed a read or write
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl From<sqlx::Error> for TrackerError {
    fn from(err: sqlx::Error) -> Self {
        TrackerError::Persistence(err.to_string())
    }
}

impl TrackerError {
    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error is a double-completion rejection
    pub fn is_already_completed(&self) -> bool {
        matches!(self, Self::AlreadyCompleted(_))
    }
}
