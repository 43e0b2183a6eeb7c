use axum::{extract::Request, response::Response};

use super::AppError;

/// Fallback handler for unknown routes, rendered through [`AppError`].
pub async fn not_found(request: Request) -> Response {
    axum::response::IntoResponse::into_response(AppError::NotFound(format!(
        "No route for {} {}",
        request.method(),
        request.uri()
    )))
}
