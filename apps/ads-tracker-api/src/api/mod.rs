//! API routes module
//!
//! Wires the events domain and the operational endpoints onto the shared state.

pub mod events;
pub mod health;

use axum::Router;
use axum::routing::get;
use axum_helpers::health_router;
use observability::metrics_handler;

use crate::state::AppState;

/// All routes served by the binary, before the shared middleware stack is applied.
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/events", events::router(state))
        .route("/metrics", get(metrics_handler))
        .merge(health::router(state.clone()))
        .merge(health_router(state.config.app))
}
