//! Ad Events Domain
//!
//! Ingests ad interaction events (`load` and `click`) and answers daily
//! per-advertisement reports.
//!
//! ```text
//! POST /events ──► EventFactory (validate, stamp) ──► EventRepository::save_event
//! GET /events/report?day= ──► ReportWindow [day, day+1) ──► EventRepository::get_report
//! ```
//!
//! Two repository implementations share the contract: [`MongoEventRepository`] pushes
//! grouping and sorting into an aggregation pipeline, [`InMemoryEventRepository`] folds
//! in process.

use utoipa::OpenApi;

mod clock;
mod error;
mod event;
mod handlers;
mod memory;
mod models;
mod mongodb;
mod repository;
mod service;

pub use self::mongodb::{EVENTS_COLLECTION, MongoEventRepository};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{EventError, REPORT_FAILED, Result, SAVE_EVENT_FAILED};
pub use event::EventFactory;
pub use handlers::{EventsState, ReportQuery, events_router, parse_day};
pub use memory::InMemoryEventRepository;
pub use models::{CreateEvent, Event, EventType, Report, ReportCriteria, ReportRow, ReportWindow};
pub use repository::EventRepository;
pub use service::EventService;

/// OpenAPI documentation for the events API
#[derive(OpenApi)]
#[openapi(
    paths(handlers::create_event, handlers::get_report),
    components(
        schemas(
            Event,
            EventType,
            CreateEvent,
            ReportRow,
            Report,
            axum_helpers::ErrorResponse,
        ),
        responses(
            axum_helpers::errors::responses::BadRequestValidationResponse,
            axum_helpers::errors::responses::InternalServerErrorResponse,
        )
    ),
    tags(
        (name = "events", description = "Ad event ingestion and daily reports")
    )
)]
pub struct ApiDoc;
