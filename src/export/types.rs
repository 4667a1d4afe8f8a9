//! Export error types.

use thiserror::Error;

use crate::workouts::types::WorkoutError;

/// Errors during workout export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Reading a FIT file back into a workout is not offered
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// No FIT encoding backend is bound to the exporter
    #[error("FIT encoding support is unavailable: {0}")]
    MissingDependency(String),

    /// Record values do not match the message definition
    #[error("Field mismatch in {message}: {reason}")]
    FieldMismatch {
        message: &'static str,
        reason: String,
    },

    /// The workout cannot be sequenced into FIT steps
    #[error(transparent)]
    Workout(#[from] WorkoutError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
