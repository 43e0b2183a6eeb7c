//! Application state management.
//!
//! This module defines the shared application state passed to request handlers
//! that need more than their domain service.

use mongodb::{Client, Database};

/// Shared application state.
///
/// Cloning is cheap: the MongoDB handles share one connection pool.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client, used for readiness checks
    pub mongo_client: Client,
    /// Database holding the events collection
    pub db: Database,
}
