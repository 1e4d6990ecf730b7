// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET  /health
// - GET  /api/prices          (idle before first fetch, records after)
// - POST /api/prices/refresh  (200 on success, 502 + last records on HTTP 500)
// - GET  /api/summary, /api/alerts, /api/catalog

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use gold_price_feed::alerts::default_rules;
use gold_price_feed::api::{self, AppState};
use gold_price_feed::feed::mock::ScriptedSource;
use gold_price_feed::feed::{FeedError, FeedPoller, RawFeedDocument};

const BODY_LIMIT: usize = 1024 * 1024;

fn fixture_doc() -> RawFeedDocument {
    RawFeedDocument::from_json(include_bytes!("fixtures/today.json")).expect("fixture parses")
}

/// Router over a scripted feed; no schedule running.
fn test_router(src: Arc<ScriptedSource>) -> Router {
    let poller = Arc::new(FeedPoller::new(src));
    api::router(AppState::new(poller, default_rules()))
}

async fn call(app: &Router, method: &str, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

#[tokio::test]
async fn health_returns_ok() {
    let app = test_router(Arc::new(ScriptedSource::new()));
    let req = Request::get("/health").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn prices_are_idle_before_first_fetch() {
    let app = test_router(Arc::new(ScriptedSource::new()));
    let (status, v) = call(&app, "GET", "/api/prices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"]["state"], "idle");
    assert_eq!(v["loading"], false);
    assert!(v["error"].is_null());
    assert!(v["last_update"].is_null());
    assert_eq!(v["records"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn refresh_then_prices_returns_records() {
    let src = Arc::new(ScriptedSource::new());
    src.push_ok(fixture_doc());
    let app = test_router(src);

    let (status, v) = call(&app, "POST", "/api/prices/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"]["state"], "ready");

    let (_, v) = call(&app, "GET", "/api/prices?lang=en").await;
    let recs = v["records"].as_array().expect("records array");
    assert_eq!(recs.len(), 13);

    let gram = &recs[0];
    assert_eq!(gram["instrument_key"], "gram-altin");
    assert_eq!(gram["display_name"], "Gram Gold");
    assert_eq!(gram["category"], "investment");
    assert_eq!(gram["current_price"], 2150.5);
    assert_eq!(gram["change_percent"], 0.6);
    assert_eq!(gram["trend"], "up");

    assert_eq!(v["source_updated_at"], "2025-01-10 11:35:02");
    assert!(v["last_update"].is_string());
    assert!(v["last_update_local"].is_string());
}

#[tokio::test]
async fn failed_refresh_is_502_and_keeps_records() {
    let src = Arc::new(ScriptedSource::new());
    src.push_ok(fixture_doc());
    src.push_err(FeedError::Status { status: 500 });
    let app = test_router(src);

    let (_, first) = call(&app, "POST", "/api/prices/refresh").await;
    let (status, v) = call(&app, "POST", "/api/prices/refresh").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(v["status"]["state"], "error");
    assert_eq!(v["error"], "feed returned HTTP 500");
    assert_eq!(v["records"], first["records"]);
}

#[tokio::test]
async fn summary_lists_gold_then_currencies() {
    let src = Arc::new(ScriptedSource::new());
    src.push_ok(fixture_doc());
    let app = test_router(src);
    call(&app, "POST", "/api/prices/refresh").await;

    let (status, v) = call(&app, "GET", "/api/summary").await;
    assert_eq!(status, StatusCode::OK);
    let cards = v["cards"].as_array().expect("cards");
    let keys: Vec<_> = cards.iter().map(|c| c["key"].as_str().unwrap()).collect();
    assert_eq!(keys, vec!["gram-altin", "ceyrek-altin", "USD", "EUR"]);
    assert_eq!(cards[0]["value"], "₺2.150,50");
    assert_eq!(cards[1]["trend"], "down");
}

#[tokio::test]
async fn alerts_use_current_prices() {
    let src = Arc::new(ScriptedSource::new());
    src.push_ok(fixture_doc());
    let app = test_router(src);

    // nothing fetched yet
    let (_, v) = call(&app, "GET", "/api/alerts").await;
    assert_eq!(v["alerts"].as_array().map(Vec::len), Some(0));

    call(&app, "POST", "/api/prices/refresh").await;
    let (_, v) = call(&app, "GET", "/api/alerts").await;
    let alerts = v["alerts"].as_array().expect("alerts");
    assert_eq!(alerts.len(), 3);
    // ceyrek 3450 is well below the 8500 "below" target
    assert_eq!(alerts[1]["instrument_key"], "ceyrek-altin");
    assert_eq!(alerts[1]["status"], "triggered");
    assert_eq!(alerts[1]["progress"], 100.0);
    assert_eq!(alerts[0]["status"], "active");
}

#[tokio::test]
async fn catalog_is_localized() {
    let app = test_router(Arc::new(ScriptedSource::new()));
    let (_, v) = call(&app, "GET", "/api/catalog?lang=en").await;
    let items = v.as_array().expect("catalog array");
    assert_eq!(items.len(), 14);
    assert_eq!(items[4]["name"], "Republic Gold");
    assert_eq!(items[4]["category_label"], "Collection");

    let (_, v) = call(&app, "GET", "/api/catalog").await;
    assert_eq!(v[4]["name"], "Cumhuriyet Altını");
}
