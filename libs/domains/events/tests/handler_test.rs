//! Handler tests for the events domain
//!
//! These drive the events router through `oneshot` with the in-memory repository and a
//! fixed clock, checking status codes, wire format and the error bodies produced at the
//! transport boundary.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::from_fn_with_state;
use axum_helpers::error_details;
use chrono::{TimeZone, Utc};
use core_config::Environment;
use domain_events::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use test_utils::TestDataBuilder;
use tower::ServiceExt; // For oneshot()

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn app_with(repo: InMemoryEventRepository, environment: Environment) -> Router {
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 5, 10, 15, 0).unwrap());
    let service = EventService::new(repo, clock);

    Router::new()
        .nest("/events", events_router::<InMemoryEventRepository>())
        .with_state(Arc::new(service))
        .layer(from_fn_with_state(environment, error_details))
}

fn app() -> Router {
    app_with(InMemoryEventRepository::new(), Environment::Production)
}

fn post_event(body: Value) -> Request<Body> {
    Request::post("/events")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_create_event_returns_201_with_stamped_event() {
    let builder = TestDataBuilder::from_test_name("handler_create_201");
    let ad = builder.ad_name("main");

    let response = app()
        .oneshot(post_event(json!({
            "type": "load",
            "adName": ad,
            "adPlacement": "sidebar"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        json_body(response).await,
        json!({
            "type": "load",
            "adName": ad,
            "adPlacement": "sidebar",
            "timestamp": "2024-03-05T10:15:00.000Z"
        })
    );
}

#[tokio::test]
async fn test_caller_supplied_timestamp_is_ignored() {
    let response = app()
        .oneshot(post_event(json!({
            "type": "click",
            "adName": "some-ad",
            "adPlacement": "top",
            "timestamp": "1999-01-01T00:00:00.000Z"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        json_body(response).await["timestamp"],
        "2024-03-05T10:15:00.000Z"
    );
}

#[tokio::test]
async fn test_create_event_reports_first_violation() {
    let cases = [
        (json!({}), "Event type has to be one of: load, click"),
        (
            json!({"type": "hover", "adName": "a", "adPlacement": "b"}),
            "Event type has to be one of: load, click",
        ),
        (json!({"type": "load"}), "Event has to have adName property"),
        (
            json!({"type": "click", "adName": ""}),
            "Event has to have adName property",
        ),
        (
            json!({"type": "click", "adName": "some-ad"}),
            "Event has to have adPlacement property",
        ),
        (json!({"type": 7}), "Event type has to be one of: load, click"),
        (
            json!({"type": "hover", "adName": 5, "adPlacement": "x"}),
            "Event type has to be one of: load, click",
        ),
        (
            json!({"type": "load", "adName": 5, "adPlacement": "x"}),
            "Event has to have adName property",
        ),
        (
            json!({"type": "click", "adName": "some-ad", "adPlacement": false}),
            "Event has to have adPlacement property",
        ),
    ];

    for (payload, expected) in cases {
        let response = app().oneshot(post_event(payload.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{payload}");

        let body = json_body(response).await;
        assert_eq!(body["message"], expected, "{payload}");
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body.get("stack").is_none());
    }
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let request = Request::post("/events")
        .header("content-type", "application/json")
        .body(Body::from("{\"type\": \"load\""))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_report_aggregates_posted_events() {
    let repo = InMemoryEventRepository::new();
    let app = app_with(repo.clone(), Environment::Production);

    for (kind, ad) in [
        ("click", "some-ad"),
        ("load", "another-ad"),
        ("click", "some-ad"),
        ("load", "another-ad"),
        ("load", "some-ad"),
    ] {
        let response = app
            .clone()
            .oneshot(post_event(json!({
                "type": kind,
                "adName": ad,
                "adPlacement": format!("{ad}-placement")
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    assert_eq!(repo.len().await, 5);

    let response = app
        .clone()
        .oneshot(get("/events/report?day=2024-03-05"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "report": [
                {"adName": "another-ad", "loads": 2, "clicks": 0},
                {"adName": "some-ad", "loads": 1, "clicks": 2}
            ]
        })
    );

    let response = app
        .oneshot(get("/events/report?day=2024-03-06"))
        .await
        .unwrap();
    assert_eq!(json_body(response).await, json!({ "report": [] }));
}

#[tokio::test]
async fn test_report_day_validation() {
    let cases = [
        ("/events/report", "day query parameter is required"),
        ("/events/report?day=", "day query parameter is required"),
        (
            "/events/report?day=2024-3-5",
            "day is expected to be in YYYY-MM-DD format",
        ),
        (
            "/events/report?day=yesterday",
            "day is expected to be in YYYY-MM-DD format",
        ),
        ("/events/report?day=2024-02-30", "day is not valid"),
    ];

    for (uri, expected) in cases {
        let response = app().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json_body(response).await["message"], expected, "{uri}");
    }
}

#[tokio::test]
async fn test_development_errors_include_stack() {
    let app = app_with(InMemoryEventRepository::new(), Environment::Development);

    let response = app.oneshot(get("/events/report?day=2024-02-30")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["message"], "day is not valid");
    assert!(body["stack"].is_string());
}
