//! Event domain error types

use axum_helpers::AppError;
use std::fmt::Display;
use thiserror::Error;

/// Result type for event operations
pub type Result<T> = std::result::Result<T, EventError>;

/// Client-facing message when storing an event fails
pub const SAVE_EVENT_FAILED: &str = "Error while saving an event";

/// Client-facing message when computing a report fails
pub const REPORT_FAILED: &str = "Error while getting events report";

/// Event domain errors
#[derive(Debug, Error)]
pub enum EventError {
    /// Caller input violates a precondition
    #[error("{0}")]
    Validation(String),

    /// The backing store failed. `message` is the store's own error text.
    #[error("{message}")]
    Persistence {
        message: String,
        client_message: &'static str,
    },
}

impl EventError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wraps a store failure, keeping its text as the internal message.
    pub fn persistence(source: impl Display, client_message: &'static str) -> Self {
        Self::Persistence {
            message: source.to_string(),
            client_message,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Validation(message) => AppError::Validation(message),
            EventError::Persistence {
                message,
                client_message,
            } => AppError::persistence(message, client_message),
        }
    }
}

impl axum::response::IntoResponse for EventError {
    fn into_response(self) -> axum::response::Response {
        AppError::from(self).into_response()
    }
}
