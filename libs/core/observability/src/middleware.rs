//! Axum middleware for request correlation, exchange logging and HTTP metrics.

use crate::context;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderValue, Request, Response},
    middleware::Next,
};
use metrics::{counter, histogram};
use std::time::Instant;
use tracing::info;

/// Response header carrying the request's correlation identifier.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Runs the rest of the stack inside a fresh correlation scope and logs both ends of
/// the exchange.
///
/// Logs `Request {method} at {uri}` on arrival and `Response {status} for {method} at {uri}`
/// once the response is ready, both tagged with the correlation id. The id is echoed
/// back in the `x-correlation-id` header.
///
/// Install it as the outermost layer so that every other middleware, the handler and
/// error rendering all run inside the scope:
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/", get(handler))
///     .layer(axum::middleware::from_fn(exchange_logging));
/// ```
pub async fn exchange_logging(request: Request<Body>, next: Next) -> Response<Body> {
    context::run(async move {
        let method = request.method().clone();
        let uri = request.uri().clone();
        info!("Request {} at {}", method, uri);

        let mut response = next.run(request).await;

        info!(
            "Response {} for {} at {}",
            response.status().as_u16(),
            method,
            uri
        );

        if let Some(value) = context::current_correlation_id()
            .and_then(|id| HeaderValue::from_str(&id).ok())
        {
            response.headers_mut().insert(CORRELATION_ID_HEADER, value);
        }

        response
    })
    .await
}

/// Middleware function for recording HTTP request metrics.
///
/// Records:
/// - `http_requests_total` - Counter with method, path, status labels
/// - `http_request_duration_seconds` - Histogram with method, path labels
/// - `http_requests_errors_total` - Counter for 4xx and 5xx responses
pub async fn metrics_middleware(
    matched_path: Option<MatchedPath>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = matched_path
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method.clone(),
        "path" => path.clone()
    )
    .record(duration.as_secs_f64());

    if status.is_client_error() || status.is_server_error() {
        counter!(
            "http_requests_errors_total",
            "method" => method,
            "path" => path,
            "status" => status.as_u16().to_string()
        )
        .increment(1);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, routing::get};
    use tower::ServiceExt;

    async fn echo_correlation_id() -> String {
        context::current_correlation_id().unwrap_or_default()
    }

    fn app() -> Router {
        Router::new()
            .route("/whoami", get(echo_correlation_id))
            .layer(axum::middleware::from_fn(exchange_logging))
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_handler_runs_inside_scope_and_header_matches() {
        let response = app()
            .oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let header = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let body = body_text(response).await;

        assert!(!body.is_empty());
        assert_eq!(header, body);
    }

    #[tokio::test]
    async fn test_each_request_gets_a_new_id() {
        let first = body_text(
            app()
                .oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        let second = body_text(
            app()
                .oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_unmatched_routes_are_still_correlated() {
        let response = app()
            .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 404);
        assert!(response.headers().contains_key(CORRELATION_ID_HEADER));
    }
}
