use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::mongo::Mongo;
use tracing::info;

use super::MongoError;

const MONGO_PORT: u16 = 27017;

/// Disposable MongoDB instance for local development.
///
/// Runs the official image in a container; data is lost once [`LocalMongo::stop`] is called.
pub struct LocalMongo {
    container: ContainerAsync<Mongo>,
    url: String,
}

impl LocalMongo {
    pub async fn start() -> Result<Self, MongoError> {
        let container = Mongo::default()
            .with_tag("7")
            .start()
            .await
            .map_err(|e| MongoError::LocalInstance(e.to_string()))?;

        let port = container
            .get_host_port_ipv4(MONGO_PORT)
            .await
            .map_err(|e| MongoError::LocalInstance(e.to_string()))?;

        let url = format!("mongodb://127.0.0.1:{port}");
        info!("Started local MongoDB server at {}", url);

        Ok(Self { container, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stop and remove the container.
    pub async fn stop(self) -> Result<(), MongoError> {
        self.container
            .rm()
            .await
            .map_err(|e| MongoError::LocalInstance(e.to_string()))?;
        info!("Local MongoDB server stopped");
        Ok(())
    }
}
