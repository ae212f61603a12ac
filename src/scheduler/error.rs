//! Scheduler error types.

use thiserror::Error;

use crate::store::StorageError;

/// Errors that can occur in the alarm scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Recurrence expression could not be parsed.
    #[error("invalid recurrence rule: {0}")]
    InvalidRule(String),

    /// Recurrence rule has no occurrence left after the reference instant.
    #[error("recurrence rule '{0}' has no upcoming occurrence")]
    NoUpcomingOccurrence(String),

    /// Reading or writing the alarm record failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Free text did not match any action.
    #[error("unrecognized action in text: {0}")]
    UnrecognizedAction(String),

    /// The alarm service task is no longer running.
    #[error("alarm service is not running")]
    ServiceUnavailable,
}

/// Result type for scheduler operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;
