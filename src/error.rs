//! Error types for notesync.
//!
//! Everything the Notes Store adapter can fail with collapses into
//! `NotesError::RequestFailed`; the remaining variants cover local concerns
//! such as configuration and input validation.

use thiserror::Error;

/// Result type alias for notesync operations
pub type NotesResult<T> = Result<T, NotesError>;

/// Main error type for notesync operations
#[derive(Error, Debug)]
pub enum NotesError {
    /// A Notes Store request failed, at the network or application level.
    #[error("{message}")]
    RequestFailed { message: String },

    #[error("Validation error in {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NotesError {
    /// Create a new request failure
    pub fn request_failed(message: impl Into<String>) -> Self {
        NotesError::RequestFailed {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        NotesError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Message suitable for showing to the user as the last error.
    pub fn user_message(&self) -> String {
        match self {
            NotesError::RequestFailed { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for NotesError {
    fn from(err: reqwest::Error) -> Self {
        NotesError::request_failed(err.to_string())
    }
}
