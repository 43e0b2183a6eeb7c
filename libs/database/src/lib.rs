//! Database connectors shared by the services in this workspace.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB client configuration, connection with retry, health checks
//! - `config` - `core_config::FromEnv` support for [`mongodb::MongoConfig`]
//! - `local-mongo` - disposable MongoDB instance for local development
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//!
//! let config = MongoConfig::new("mongodb://localhost:27017");
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let events = client.database(config.database()).collection::<Document>("events");
//! ```

pub mod retry;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use retry::{RetryConfig, retry, retry_with_backoff};
