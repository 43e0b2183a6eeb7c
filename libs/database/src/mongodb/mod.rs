//! MongoDB database connector and utilities
//!
//! Provides connection management and MongoDB-specific helpers.

mod config;
mod connector;
mod health;
#[cfg(feature = "local-mongo")]
mod local;

pub use config::MongoConfig;
pub use connector::{MongoError, close, connect_from_config, connect_from_config_with_retry};
pub use health::{HealthStatus, check_health, check_health_detailed};
#[cfg(feature = "local-mongo")]
pub use local::LocalMongo;

// Re-export MongoDB types for convenience
pub use mongodb::{Client, Collection, Database};
