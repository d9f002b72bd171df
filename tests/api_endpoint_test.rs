use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use oneanddone::api;
use oneanddone::config::{Config, StandingsMode};
use oneanddone::db::init_db;
use oneanddone::feed::{CandidateRecord, EventRecord, MockSeasonFeed};
use oneanddone::{Decimal, EventId, FixedClock, Repository, Season};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    _temp: TempDir,
}

async fn setup_test_app(mode: StandingsMode) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let config = Config {
        port: 0,
        database_path: db_path,
        standings_mode: mode,
        season_files: None,
    };

    let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let season = Season::new(repo.clone(), Arc::new(FixedClock::new(today)), mode);
    season.sync(&season_feed()).await.unwrap();

    let app = api::create_router(api::AppState::new(season, repo, config));
    TestApp {
        app,
        _temp: temp_dir,
    }
}

fn season_feed() -> MockSeasonFeed {
    let first = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
    let events = (1..=3)
        .map(|week: i64| {
            let start_date = first + chrono::Duration::days(7 * (week - 1));
            EventRecord {
                id: EventId::new(week * 10),
                name: format!("Event {}", week),
                start_date,
                end_date: start_date + chrono::Duration::days(3),
                purse: Decimal::from_units(10_000_000),
                multiplier: Decimal::one(),
                segment: "Q1".to_string(),
                event_type: "regular".to_string(),
                is_completed: false,
            }
        })
        .collect();

    MockSeasonFeed::new()
        .with_events(events)
        .with_candidate(CandidateRecord {
            name: "Scottie Scheffler".to_string(),
            rank: Some(1),
            tier: None,
        })
        .with_candidate(CandidateRecord {
            name: "Akshay Bhatia".to_string(),
            rank: Some(48),
            tier: None,
        })
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn candidate_id(app: &axum::Router, name: &str) -> i64 {
    let (_, body) = send(app, "GET", "/v1/candidates", None).await;
    body["candidates"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == name)
        .unwrap()["id"]
        .as_i64()
        .unwrap()
}

#[tokio::test]
async fn test_health_and_ready() {
    let t = setup_test_app(StandingsMode::Live).await;
    let (status, body) = send(&t.app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&t.app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["standingsMode"], "live");
}

#[tokio::test]
async fn test_schedule_and_current_event() {
    let t = setup_test_app(StandingsMode::Live).await;

    let (status, body) = send(&t.app, "GET", "/v1/events", None).await;
    assert_eq!(status, StatusCode::OK);
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["week"], 1);
    assert_eq!(events[0]["purse"], "10000000");
    assert_eq!(events[0]["startDate"], "2025-01-02");

    let (status, body) = send(&t.app, "GET", "/v1/events/current", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 10);
}

#[tokio::test]
async fn test_full_commit_and_score_flow() {
    let t = setup_test_app(StandingsMode::Incremental).await;
    let scottie = candidate_id(&t.app, "Scottie Scheffler").await;

    let (status, _) = send(
        &t.app,
        "POST",
        "/v1/reservations",
        Some(json!({"candidateId": scottie, "week": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&t.app, "GET", "/v1/reservations", None).await;
    let reservations = body["reservations"].as_array().unwrap();
    assert_eq!(reservations.len(), 1);
    assert_eq!(reservations[0]["eventId"], 20);
    assert_eq!(reservations[0]["tier"], "elite");

    let (status, commitment) = send(
        &t.app,
        "POST",
        "/v1/commitments",
        Some(json!({"eventId": 20, "candidateId": scottie})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(commitment["status"], "pending");
    assert_eq!(commitment["earnings"], "0");

    let (_, body) = send(&t.app, "GET", "/v1/reservations", None).await;
    assert!(body["reservations"].as_array().unwrap().is_empty());

    let uri = format!("/v1/commitments/{}/result", commitment["id"]);
    let (status, scored) = send(&t.app, "POST", &uri, Some(json!({"finishPosition": 1}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scored["earnings"], "1800000");
    assert_eq!(scored["applied"], true);

    let (status, body) = send(&t.app, "POST", &uri, Some(json!({"finishPosition": 2}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");

    let (_, body) = send(&t.app, "GET", "/v1/standings", None).await;
    assert_eq!(body["mode"], "incremental");
    assert_eq!(body["standings"][0]["total"], "1800000");
    assert_eq!(body["standings"][0]["eventsCompleted"], 1);

    let (_, body) = send(&t.app, "GET", "/v1/commitments", None).await;
    assert_eq!(body["seasonTotal"], "1800000");
    assert_eq!(body["commitments"][0]["week"], 2);

    let (status, body) = send(&t.app, "GET", "/v1/season", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["commitments"], 1);
    assert_eq!(body["eventsTotal"], 3);
}

#[tokio::test]
async fn test_error_shapes() {
    let t = setup_test_app(StandingsMode::Live).await;
    let scottie = candidate_id(&t.app, "Scottie Scheffler").await;

    let (status, body) = send(
        &t.app,
        "POST",
        "/v1/commitments",
        Some(json!({"eventId": 999, "candidateId": scottie})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
    assert!(body["error"].as_str().unwrap().contains("999"));

    let (status, body) = send(&t.app, "DELETE", "/v1/reservations", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (status, _) = send(
        &t.app,
        "POST",
        "/v1/commitments",
        Some(json!({"eventId": 10, "candidateId": scottie})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &t.app,
        "POST",
        "/v1/reservations",
        Some(json!({"candidateId": scottie, "week": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("week 1"));
}

#[tokio::test]
async fn test_reported_earnings_via_api() {
    let t = setup_test_app(StandingsMode::Live).await;
    let akshay = candidate_id(&t.app, "Akshay Bhatia").await;
    let (_, commitment) = send(
        &t.app,
        "POST",
        "/v1/commitments",
        Some(json!({"eventId": 30, "candidateId": akshay})),
    )
    .await;
    let uri = format!("/v1/commitments/{}/result", commitment["id"]);

    let (status, body) = send(
        &t.app,
        "POST",
        &uri,
        Some(json!({"finishPosition": 12, "reportedEarnings": "12.5"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (status, body) = send(
        &t.app,
        "POST",
        &uri,
        Some(json!({"finishPosition": 12, "reportedEarnings": "241500"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["earnings"], "241500");
}

#[tokio::test]
async fn test_complete_event_endpoint() {
    let t = setup_test_app(StandingsMode::Live).await;

    let (status, body) = send(
        &t.app,
        "POST",
        "/v1/events/10/complete",
        Some(json!({"winner": "Scottie Scheffler"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isCompleted"], true);
    assert_eq!(body["winner"], "Scottie Scheffler");

    let (status, _) = send(&t.app, "POST", "/v1/events/20/complete", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&t.app, "GET", "/v1/events/current", None).await;
    assert_eq!(body["id"], 30);

    let (status, _) = send(&t.app, "POST", "/v1/events/77/complete", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ev_and_recommendations() {
    let t = setup_test_app(StandingsMode::Live).await;

    let (status, body) = send(&t.app, "GET", "/v1/ev?tier=elite&purse=9000000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expectedValue"].as_str().unwrap().parse::<f64>().unwrap(), 443970.0);

    let (status, body) = send(&t.app, "GET", "/v1/ev?tier=legend&purse=9000000", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (status, body) = send(
        &t.app,
        "GET",
        "/v1/ev?tier=elite&purse=79228162514264337593543950335&multiplier=2",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (status, _) = send(&t.app, "GET", "/v1/ev?tier=elite&purse=9000000&multiplier=500", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&t.app, "GET", "/v1/recommendations?limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["week"], 1);
    let picks = body["recommendations"].as_array().unwrap();
    assert_eq!(picks.len(), 1);
    assert_eq!(picks[0]["name"], "Scottie Scheffler");
}
