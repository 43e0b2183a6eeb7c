//! Events API routes backed by MongoDB.

use crate::state::AppState;
use axum::Router;
use domain_events::{EventService, MongoEventRepository, SystemClock, events_router};
use std::sync::Arc;
use tracing::info;

/// Create the events router over the `events` collection
pub fn router(state: &AppState) -> Router {
    let repository = MongoEventRepository::new(&state.db);
    let service = EventService::new(repository, SystemClock);

    events_router::<MongoEventRepository>().with_state(Arc::new(service))
}

/// Initialize event indexes in MongoDB
pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    MongoEventRepository::new(db)
        .create_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create event indexes: {}", e))?;
    info!("Event collection indexes created");
    Ok(())
}
