use crate::form::FormField;
use thiserror::Error;

/// The location provider could not produce coordinates. Retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("location unavailable: {reason}")]
pub struct LocationError {
    pub reason: String,
}

impl LocationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A form submission was rejected. The session state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must be a number")]
    NotANumber(FormField),

    #[error("{0} must be greater than zero")]
    NotPositive(FormField),

    #[error("unknown workout type: {0:?}")]
    UnknownType(String),
}

/// Reading or writing the persistent slot failed.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("encoding workouts: {0}")]
    Encode(#[from] serde_json::Error),

    /// Storage refused the operation (quota exceeded, disabled, ...).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl PersistenceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
