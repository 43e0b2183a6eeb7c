//! Backing store selection and lifecycle.

use axum_helpers::CleanupCoordinator;
use database::RetryConfig;
use database::mongodb::{Client, Database, MongoConfig, close, connect_from_config_with_retry};
#[cfg(feature = "local-mongo")]
use database::mongodb::LocalMongo;
use tracing::info;

use crate::config::{Config, Environment};

/// Where the events collection lives for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSource {
    /// The server named by `MONGODB_URL`
    Remote,
    /// A disposable local instance, development only
    Local,
}

/// Picks the store: a configured URL always wins, production never falls back.
pub fn select_source(config: &MongoConfig, environment: Environment) -> eyre::Result<StoreSource> {
    match (config.url(), environment) {
        (Some(_), _) => Ok(StoreSource::Remote),
        (None, Environment::Production) => {
            eyre::bail!("Production environment requires MongoDB connection URL")
        }
        (None, Environment::Development) => Ok(StoreSource::Local),
    }
}

/// Connected store plus whatever has to be released on shutdown.
pub struct Store {
    pub client: Client,
    pub database: Database,
    #[cfg(feature = "local-mongo")]
    local: Option<LocalMongo>,
}

impl Store {
    /// Hands the store's resources to a cleanup coordinator.
    ///
    /// The client is closed before the local instance is stopped.
    pub fn into_cleanup(self) -> CleanupCoordinator {
        let mut cleanup = CleanupCoordinator::new();
        cleanup.add_task("mongodb", close(self.client));

        #[cfg(feature = "local-mongo")]
        if let Some(local) = self.local {
            cleanup.add_task("local-mongodb", local.stop());
        }

        cleanup
    }
}

/// Connect to the store chosen by [`select_source`].
pub async fn connect(config: &Config) -> eyre::Result<Store> {
    match select_source(&config.mongodb, config.environment)? {
        StoreSource::Remote => {
            let client =
                connect_from_config_with_retry(&config.mongodb, Some(RetryConfig::default()))
                    .await?;
            info!(database = config.mongodb.database(), "Connected to MongoDB");
            Ok(Store {
                database: client.database(config.mongodb.database()),
                client,
                #[cfg(feature = "local-mongo")]
                local: None,
            })
        }
        StoreSource::Local => connect_local(&config.mongodb).await,
    }
}

#[cfg(feature = "local-mongo")]
async fn connect_local(mongodb: &MongoConfig) -> eyre::Result<Store> {
    let local = LocalMongo::start().await?;
    let config = mongodb.clone().with_url(local.url());

    match connect_from_config_with_retry(&config, Some(RetryConfig::default())).await {
        Ok(client) => Ok(Store {
            database: client.database(config.database()),
            client,
            local: Some(local),
        }),
        Err(e) => {
            if let Err(stop_err) = local.stop().await {
                tracing::warn!("Failed to stop local MongoDB server: {}", stop_err);
            }
            Err(e.into())
        }
    }
}

#[cfg(not(feature = "local-mongo"))]
async fn connect_local(_mongodb: &MongoConfig) -> eyre::Result<Store> {
    eyre::bail!("No MongoDB connection URL configured and the local-mongo feature is disabled")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_url_is_used_in_every_environment() {
        let config = MongoConfig::new("mongodb://db:27017");
        for environment in [Environment::Development, Environment::Production] {
            assert_eq!(
                select_source(&config, environment).unwrap(),
                StoreSource::Remote
            );
        }
    }

    #[test]
    fn test_production_requires_url() {
        let err = select_source(&MongoConfig::default(), Environment::Production).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Production environment requires MongoDB connection URL"
        );
    }

    #[test]
    fn test_development_without_url_uses_local_instance() {
        assert_eq!(
            select_source(&MongoConfig::default(), Environment::Development).unwrap(),
            StoreSource::Local
        );
    }

    #[tokio::test]
    async fn test_cleanup_closes_client() {
        let client = Client::with_uri_str("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=100")
            .await
            .unwrap();
        let store = Store {
            database: client.database("events"),
            client,
            #[cfg(feature = "local-mongo")]
            local: None,
        };

        let cleanup = store.into_cleanup();
        assert_eq!(cleanup.len(), 1);
        assert_eq!(cleanup.run().await, 0);
    }
}
