//! Observability utilities for the ads tracking service.
//!
//! This crate provides:
//! - [`context`]: request-scoped correlation identifiers that follow async work
//! - Axum middleware for exchange logging and HTTP request metrics
//! - Prometheus metrics recording and export, including ad-specific metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{exchange_logging, init_metrics, metrics_handler};
//!
//! init_metrics()?;
//!
//! let app = Router::new()
//!     .route("/metrics", get(metrics_handler))
//!     .layer(axum::middleware::from_fn(exchange_logging));
//! ```

pub mod ads;
pub mod context;
pub mod middleware;

pub use ads::AdMetrics;
pub use context::{CorrelationScope, current_correlation_id};
pub use middleware::{CORRELATION_ID_HEADER, exchange_logging, metrics_middleware};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder once per process and return its handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();
        Ok(handle)
    })
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    describe_counter!(
        "ad_events_ingested_total",
        "Ad events persisted, by event type"
    );
    describe_counter!(
        "ad_events_rejected_total",
        "Ad events rejected before persistence, by reason"
    );
    describe_counter!("ad_reports_generated_total", "Daily ad reports generated");
    describe_histogram!(
        "ad_report_duration_seconds",
        "Time spent computing a daily ad report"
    );
}
