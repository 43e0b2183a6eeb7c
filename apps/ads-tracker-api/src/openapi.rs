//! OpenAPI documentation configuration

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ads Tracker API",
        version = "0.1.0",
        description = "Ingests ad load and click events and serves daily per-ad reports"
    ),
    servers(
        (url = "http://localhost:4000", description = "Local development server")
    )
)]
struct ServiceDoc;

/// Service document with the events API merged in
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        ServiceDoc::openapi().merge_from(domain_events::ApiDoc::openapi())
    }
}
