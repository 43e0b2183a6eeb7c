use mongodb::bson::doc;
use mongodb::{Client, options::ClientOptions};
use std::time::Duration;
use tracing::info;

use super::MongoConfig;
use crate::retry::{RetryConfig, retry, retry_with_backoff};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for MongoDB connection management
#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Local MongoDB instance error: {0}")]
    LocalInstance(String),

    #[error("No MongoDB connection URL configured")]
    MissingUrl,

    #[error("MongoDB client did not shut down within {0:?}")]
    ShutdownTimedOut(Duration),
}

/// Connect using a MongoConfig and verify the connection with a `ping`.
pub async fn connect_from_config(config: &MongoConfig) -> Result<Client, MongoError> {
    let url = config.url().ok_or(MongoError::MissingUrl)?;
    info!("Attempting to connect to MongoDB at {}", url);

    let mut options = ClientOptions::parse(url).await?;

    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));

    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    let client = Client::with_options(options)?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| MongoError::ConnectionFailed(e.to_string()))?;

    info!("Successfully connected to MongoDB");
    Ok(client)
}

/// Connect from config with exponential backoff.
///
/// A missing URL is not retried.
pub async fn connect_from_config_with_retry(
    config: &MongoConfig,
    retry_config: Option<RetryConfig>,
) -> Result<Client, MongoError> {
    if config.url().is_none() {
        return Err(MongoError::MissingUrl);
    }

    match retry_config {
        Some(policy) => retry_with_backoff(|| connect_from_config(config), policy).await,
        None => retry(|| connect_from_config(config)).await,
    }
}

/// Shut the client down, closing pooled connections and background monitors.
pub async fn close(client: Client) -> Result<(), MongoError> {
    tokio::time::timeout(SHUTDOWN_TIMEOUT, client.shutdown())
        .await
        .map_err(|_| MongoError::ShutdownTimedOut(SHUTDOWN_TIMEOUT))?;
    info!("MongoDB client shut down");
    Ok(())
}
