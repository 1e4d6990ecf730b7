// tests/metrics.rs
use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use gold_price_feed::feed::mock::ScriptedSource;
use gold_price_feed::feed::{FeedError, RawFeedDocument};
use gold_price_feed::FeedConfig;

fn fixture_doc() -> RawFeedDocument {
    RawFeedDocument::from_json(include_bytes!("fixtures/today.json")).expect("fixture parses")
}

// Full in-process app: poller running, /metrics merged in.
fn build_app(src: Arc<ScriptedSource>) -> Router {
    let cfg = FeedConfig {
        poll_interval_ms: 60_000,
        ..FeedConfig::default()
    };
    gold_price_feed::app_with_source(&cfg, src).expect("app_with_source should build Router")
}

async fn get_text(app: &Router, uri: &str) -> (StatusCode, String) {
    let resp = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn metrics_endpoint_contains_feed_series() {
    let src = Arc::new(ScriptedSource::new());
    src.push_ok(fixture_doc());
    src.push_err(FeedError::Status { status: 503 });
    let app = build_app(src.clone());

    // immediate tick from the running poller
    src.wait_completed(1).await;

    let refresh = app
        .clone()
        .oneshot(
            Request::post("/api/prices/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(refresh.status(), StatusCode::BAD_GATEWAY);

    let (status, text) = get_text(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);

    for needle in [
        "feed_ticks_total",
        "feed_fetch_total",
        "feed_fetch_errors_total",
        "feed_last_success_ts",
    ] {
        assert!(
            text.contains(needle),
            "expected metric '{needle}' in /metrics output:\n{text}"
        );
    }
    assert!(text.contains(r#"kind="status""#));
}

#[tokio::test]
async fn health_is_served_next_to_metrics() {
    let app = build_app(Arc::new(ScriptedSource::new()));
    let (status, body) = get_text(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}
