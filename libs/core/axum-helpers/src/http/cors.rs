use axum::http::{HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

/// Environment variable holding comma-separated allowed origins.
pub const CORS_ALLOWED_ORIGIN: &str = "CORS_ALLOWED_ORIGIN";

/// Creates a CORS layer restricted to the given origins.
///
/// Exposes the `x-correlation-id` response header so browser clients can read it.
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT])
        .expose_headers([HeaderName::from_static(observability::CORRELATION_ID_HEADER)])
        .max_age(Duration::from_secs(3600))
}

/// Allows any origin, method and header.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Permissive unless `CORS_ALLOWED_ORIGIN` lists at least one valid origin.
///
/// Invalid entries are skipped with a warning rather than failing startup.
pub fn cors_layer_from_env() -> CorsLayer {
    let Ok(origins) = std::env::var(CORS_ALLOWED_ORIGIN) else {
        return create_permissive_cors_layer();
    };

    let allowed: Vec<HeaderValue> = parse_origins(&origins);
    if allowed.is_empty() {
        return create_permissive_cors_layer();
    }

    info!("CORS configured with allowed origins: {}", origins);
    create_cors_layer(allowed)
}

fn parse_origins(origins: &str) -> Vec<HeaderValue> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}: {}", s, e);
                None
            }
        })
        .collect()
}
