//! Transport boundary for application errors.
//!
//! Domain crates convert their errors into [`AppError`], which has exactly three
//! structural kinds: validation, persistence and unexpected (plus `NotFound` for
//! unknown routes). Converting an `AppError` into a response is the only place
//! that decides the status code and what the caller sees:
//!
//! | kind        | status | log level | production message   | development message |
//! |-------------|--------|-----------|----------------------|---------------------|
//! | Validation  | 400    | warn      | message              | message + `stack`   |
//! | Persistence | 500    | error     | client message       | internal + `stack`  |
//! | Unexpected  | 500    | error     | "Internal server error" | error + `stack`  |
//!
//! The response produced by `IntoResponse` is always the production-safe one. The
//! [`error_details`] middleware swaps in the detailed body when the service does not
//! run in production.

pub mod codes;
pub mod handlers;
pub mod messages;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::{Request, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use core_config::Environment;
use serde::Serialize;
use thiserror::Error;
use tracing_error::{SpanTrace, SpanTraceStatus};
use utoipa::ToSchema;

/// Standard error response body.
///
/// ```json
/// {
///   "code": 1001,
///   "error": "VALIDATION_ERROR",
///   "message": "day is not valid",
///   "stack": "..."
/// }
/// ```
#[derive(Debug, Serialize, serde::Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Diagnostic detail, only present outside production
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stack: Option<String>,
}

/// Application error type that can be converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Caller input violates a precondition. The message is always safe to expose.
    #[error("{0}")]
    Validation(String),

    /// The backing store failed. `message` is diagnostic detail for logs only.
    #[error("{message}")]
    Persistence {
        message: String,
        client_message: String,
    },

    #[error("{0}")]
    NotFound(String),

    /// Anything else. Never described to callers in production.
    #[error("{0}")]
    Unexpected(eyre::Report),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn persistence(message: impl Into<String>, client_message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
            client_message: client_message.into(),
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::Persistence { .. } => ErrorCode::PersistenceError,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Unexpected(_) => ErrorCode::InternalError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Persistence { .. } | Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::NotFound(message) => message.clone(),
            Self::Persistence { client_message, .. } => client_message.clone(),
            Self::Unexpected(_) => messages::INTERNAL_ERROR.to_string(),
        }
    }

    /// Source chain plus the span trace at the point the error reached the boundary.
    fn diagnostic(&self) -> String {
        let mut lines = vec![format!("{}: {}", self.error_code(), self)];
        if let Self::Unexpected(report) = self {
            lines.extend(report.chain().skip(1).map(|cause| format!("caused by: {cause}")));
        }

        let span_trace = SpanTrace::capture();
        if span_trace.status() == SpanTraceStatus::CAPTURED {
            lines.push(span_trace.to_string());
        }
        lines.join("\n")
    }

    /// Everything the boundary knows about this error.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            status: self.status(),
            code: self.error_code(),
            message: self.to_string(),
            client_message: self.client_message(),
            diagnostic: self.diagnostic(),
        }
    }
}

impl From<eyre::Report> for AppError {
    fn from(report: eyre::Report) -> Self {
        Self::Unexpected(report)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let report = self.report();
        let code = report.code.code();

        match &self {
            Self::Validation(_) => tracing::warn!(
                error_code = code,
                diagnostic = %report.diagnostic,
                "{}",
                report.message
            ),
            Self::NotFound(_) => tracing::info!(error_code = code, "{}", report.message),
            Self::Persistence { .. } | Self::Unexpected(_) => tracing::error!(
                error_code = code,
                diagnostic = %report.diagnostic,
                "{}",
                report.message
            ),
        }

        let mut response = report.render(Environment::Production);
        response.extensions_mut().insert(report);
        response
    }
}

/// Error details carried in response extensions from [`AppError::into_response`]
/// to [`error_details`].
#[derive(Clone, Debug)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub code: ErrorCode,
    /// Precise message, may contain internal detail
    pub message: String,
    /// Message that is safe to show in production
    pub client_message: String,
    pub diagnostic: String,
}

impl ErrorReport {
    /// Response body for the given operating mode.
    pub fn body(&self, environment: Environment) -> ErrorResponse {
        let (message, stack) = if environment.is_production() {
            (self.client_message.clone(), None)
        } else {
            (self.message.clone(), Some(self.diagnostic.clone()))
        };

        ErrorResponse {
            code: self.code.code(),
            error: self.code.as_str().to_string(),
            message,
            stack,
        }
    }

    pub fn render(&self, environment: Environment) -> Response {
        (self.status, Json(self.body(environment))).into_response()
    }
}

/// Re-renders error responses with full detail outside production.
///
/// ```rust,ignore
/// let app = router.layer(axum::middleware::from_fn_with_state(
///     Environment::from_env(),
///     error_details,
/// ));
/// ```
pub async fn error_details(
    State(environment): State<Environment>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    match response.extensions_mut().remove::<ErrorReport>() {
        Some(report) if !environment.is_production() => report.render(environment),
        _ => response,
    }
}
