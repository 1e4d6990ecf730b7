// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod alerts;
pub mod api;
pub mod config;
pub mod feed;
pub mod metrics;
pub mod summary;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tracing::info;

pub use crate::api::{router, AppState};
pub use crate::config::feed::FeedConfig;
pub use crate::feed::{FeedError, FeedPoller, FeedSnapshot, FeedSource, FeedStatus};

/// Build the full service: config from disk/env, live HTTP feed, `/metrics`.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = FeedConfig::load_default().context("loading feed config")?;
    let source = feed::HttpFeedSource::new(cfg.url.clone(), cfg.timeout())
        .context("building feed http client")?;
    info!(url = %source.url(), "feed source configured");
    app_with_source(&cfg, Arc::new(source))
}

/// Same as [`app`] but with an injected feed source. Starts the poller.
pub fn app_with_source(cfg: &FeedConfig, source: Arc<dyn FeedSource>) -> anyhow::Result<Router> {
    let metrics = crate::metrics::Metrics::init()?;

    let poller = Arc::new(FeedPoller::new(source));
    poller.start(cfg.poll_interval());

    let state = AppState::new(poller, cfg.alerts.clone());
    Ok(api::router(state).merge(metrics.router()))
}
