//! # Axum Helpers
//!
//! Shared HTTP plumbing for the ads tracking services.
//!
//! - **[`server`]**: router assembly, health checks, graceful shutdown, cleanup
//! - **[`http`]**: CORS configuration
//! - **[`errors`]**: the error boundary that turns [`AppError`] into responses
//! - **[`extractors`]**: JSON body and query extractors that reject with [`AppError`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum_helpers::server::{CleanupCoordinator, create_production_app, create_router};
//! use core_config::{Environment, server::ServerConfig};
//!
//! let router = create_router::<ApiDoc>(api_routes, Environment::from_env());
//! create_production_app(router, &ServerConfig::default(), timeout, CleanupCoordinator::new())
//!     .await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    CleanupCoordinator, HealthCheckFuture, HealthResponse, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use http::{cors_layer_from_env, create_cors_layer, create_permissive_cors_layer};

pub use errors::{AppError, ErrorCode, ErrorReport, ErrorResponse, error_details};

pub use extractors::{JsonBody, QueryParams};
