//! HTTP handlers for the events API

use crate::error::{EventError, Result};
use crate::models::{CreateEvent, Event, Report, ReportCriteria};
use crate::repository::EventRepository;
use crate::service::EventService;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_helpers::{ErrorResponse, JsonBody, QueryParams};
use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use tracing::instrument;
use utoipa::IntoParams;

/// Events router state
pub type EventsState<R> = Arc<EventService<R>>;

static DAY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());

/// Create the events router, to be nested under `/events`
pub fn events_router<R: EventRepository + 'static>() -> Router<EventsState<R>> {
    Router::new()
        .route("/", post(create_event::<R>))
        .route("/report", get(get_report::<R>))
}

/// Query string of the report endpoint
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// UTC calendar day, `YYYY-MM-DD`
    #[param(example = "2024-03-05")]
    pub day: Option<String>,
}

/// Record an ad event
#[utoipa::path(
    post,
    path = "/events",
    request_body = CreateEvent,
    responses(
        (status = 201, description = "Event recorded", body = Event),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Persistence error", body = ErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip(state, payload))]
pub async fn create_event<R: EventRepository>(
    State(state): State<EventsState<R>>,
    JsonBody(payload): JsonBody<CreateEvent>,
) -> Result<impl IntoResponse> {
    let event = state.record(payload).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Daily per-ad load and click counts
#[utoipa::path(
    get,
    path = "/events/report",
    params(ReportQuery),
    responses(
        (status = 200, description = "Report rows sorted by adName", body = Report),
        (status = 400, description = "Missing or invalid day", body = ErrorResponse),
        (status = 500, description = "Persistence error", body = ErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip(state))]
pub async fn get_report<R: EventRepository>(
    State(state): State<EventsState<R>>,
    QueryParams(query): QueryParams<ReportQuery>,
) -> Result<Json<Report>> {
    let day = parse_day(query.day.as_deref())?;
    let report = state.report(Some(ReportCriteria::for_day(day))).await?;
    Ok(Json(Report { report }))
}

/// Strict `YYYY-MM-DD` that must also be a real calendar date.
pub fn parse_day(raw: Option<&str>) -> Result<NaiveDate> {
    let raw = raw
        .filter(|d| !d.is_empty())
        .ok_or_else(|| EventError::validation("day query parameter is required"))?;

    if !DAY_PATTERN.is_match(raw) {
        return Err(EventError::validation(
            "day is expected to be in YYYY-MM-DD format",
        ));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| EventError::validation("day is not valid"))
}
