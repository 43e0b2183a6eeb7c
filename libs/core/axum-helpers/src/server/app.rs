use super::cleanup::CleanupCoordinator;
use super::shutdown::shutdown_signal;
use crate::errors::{error_details, handlers::not_found};
use crate::http::cors_layer_from_env;
use axum::{Router, middleware};
use core_config::{Environment, server::ServerConfig};
use observability::{exchange_logging, metrics_middleware};
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Combines API routes with documentation and the cross-cutting middleware stack.
///
/// Layers from the outside in:
/// - exchange logging, which opens the per-request correlation scope
/// - CORS (see [`cors_layer_from_env`](crate::http::cors_layer_from_env))
/// - compression and the tower-http trace layer
/// - HTTP metrics
/// - [`error_details`], which adds diagnostics to error bodies outside production
///
/// Swagger UI is served at `/swagger-ui` with the document at `/api-docs/openapi.json`.
/// Unmatched routes get a structured 404.
///
/// Routes in `apis` must already have their state applied.
pub fn create_router<T>(apis: Router, environment: Environment) -> Router
where
    T: OpenApi + 'static,
{
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(apis)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(environment, error_details))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(CompressionLayer::new())
        .layer(cors_layer_from_env())
        .layer(middleware::from_fn(exchange_logging))
}

/// Serves until SIGINT/SIGTERM, drains in-flight requests, then runs cleanup.
///
/// Cleanup also runs when the listener cannot be bound. It is bounded by
/// `shutdown_timeout`; its failures and timeouts are logged and never returned.
/// Only bind and serve errors are.
pub async fn create_production_app(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: CleanupCoordinator,
) -> io::Result<()> {
    let serve_result = serve(router, server_config).await.inspect_err(|e| {
        tracing::error!("Server encountered an error: {:?}", e);
    });

    info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
    match tokio::time::timeout(shutdown_timeout, cleanup.run()).await {
        Ok(0) => info!("Cleanup completed successfully"),
        Ok(failures) => warn!("Cleanup finished with {} failed tasks", failures),
        Err(_) => warn!(
            "Cleanup exceeded timeout of {:?}, forcing shutdown",
            shutdown_timeout
        ),
    }

    serve_result
}

async fn serve(router: Router, server_config: &ServerConfig) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
}
