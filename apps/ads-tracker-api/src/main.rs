use axum_helpers::{create_production_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use observability::init_metrics;
use std::time::Duration;
use tracing::{error, info};

mod api;
mod config;
mod openapi;
mod state;
mod store;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.tracing);
    init_metrics()?;

    info!(
        environment = ?config.environment,
        "Starting {} v{}",
        config.app.name,
        config.app.version
    );

    let store = store::connect(&config).await?;
    let state = AppState {
        mongo_client: store.client.clone(),
        db: store.database.clone(),
        config,
    };
    let cleanup = store.into_cleanup();

    if let Err(e) = api::events::init_indexes(&state.db).await {
        error!("Startup failed, releasing store: {}", e);
        cleanup.run().await;
        return Err(e);
    }

    let router = create_router::<openapi::ApiDoc>(api::routes(&state), state.config.environment);

    create_production_app(
        router,
        &state.config.server,
        Duration::from_secs(30),
        cleanup,
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Ads Tracker API shutdown complete");
    Ok(())
}
