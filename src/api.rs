// src/api.rs
//! JSON surface consumed by the site's price widgets.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::alerts::{self, AlertRule, AlertView};
use crate::feed::{Category, FeedPoller, FeedSnapshot, Language, GOLD_CATALOG};
use crate::summary::{market_summary, SummaryCard};

#[derive(Clone)]
pub struct AppState {
    pub poller: Arc<FeedPoller>,
    pub alerts: Arc<Vec<AlertRule>>,
}

impl AppState {
    pub fn new(poller: Arc<FeedPoller>, alerts: Vec<AlertRule>) -> Self {
        Self {
            poller,
            alerts: Arc::new(alerts),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/prices", get(prices))
        .route("/api/prices/refresh", post(refresh))
        .route("/api/summary", get(summary))
        .route("/api/alerts", get(price_alerts))
        .route("/api/catalog", get(catalog))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct LangQuery {
    #[serde(default)]
    lang: Option<String>,
}

impl LangQuery {
    fn language(&self) -> Language {
        Language::from_code(self.lang.as_deref())
    }
}

async fn prices(State(state): State<AppState>, Query(q): Query<LangQuery>) -> Json<FeedSnapshot> {
    Json(state.poller.snapshot(GOLD_CATALOG, q.language()))
}

/// Manual refresh. 502 when the feed is unavailable; the body still carries
/// the last good records plus the error.
async fn refresh(
    State(state): State<AppState>,
    Query(q): Query<LangQuery>,
) -> (StatusCode, Json<FeedSnapshot>) {
    let code = match state.poller.fetch_once().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::BAD_GATEWAY,
    };
    (code, Json(state.poller.snapshot(GOLD_CATALOG, q.language())))
}

#[derive(Serialize)]
struct SummaryOut {
    last_update: Option<DateTime<Utc>>,
    cards: Vec<SummaryCard>,
}

async fn summary(State(state): State<AppState>, Query(q): Query<LangQuery>) -> Json<SummaryOut> {
    let cards = state
        .poller
        .document()
        .map(|doc| market_summary(&doc, q.language()))
        .unwrap_or_default();
    Json(SummaryOut {
        last_update: state.poller.last_success(),
        cards,
    })
}

#[derive(Serialize)]
struct AlertsOut {
    last_update: Option<DateTime<Utc>>,
    alerts: Vec<AlertView>,
}

async fn price_alerts(
    State(state): State<AppState>,
    Query(q): Query<LangQuery>,
) -> Json<AlertsOut> {
    let out = state
        .poller
        .document()
        .map(|doc| alerts::evaluate(&doc, &state.alerts, q.language()))
        .unwrap_or_default();
    Json(AlertsOut {
        last_update: state.poller.last_success(),
        alerts: out,
    })
}

#[derive(Serialize)]
struct CatalogEntry {
    key: &'static str,
    name: &'static str,
    category: Category,
    category_label: &'static str,
}

async fn catalog(Query(q): Query<LangQuery>) -> Json<Vec<CatalogEntry>> {
    let lang = q.language();
    Json(
        GOLD_CATALOG
            .iter()
            .map(|i| CatalogEntry {
                key: i.key,
                name: i.display_name(lang),
                category: i.category,
                category_label: i.category.label(lang),
            })
            .collect(),
    )
}
