// src/feed/source.rs
use std::time::Duration;

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::StatusCode;
use thiserror::Error;

use crate::feed::types::RawFeedDocument;

/// Why a fetch produced no document. Every variant is retryable on the next tick.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("feed returned HTTP {status}")]
    Status { status: u16 },

    #[error("feed request failed: {0}")]
    Network(String),

    #[error("feed body is not a price document: {0}")]
    Malformed(String),
}

impl FeedError {
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::Status { .. } => "status",
            FeedError::Network(_) => "network",
            FeedError::Malformed(_) => "malformed",
        }
    }
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<RawFeedDocument, FeedError>;
    fn name(&self) -> &str;
}

/// Plain GET against the remote JSON endpoint.
pub struct HttpFeedSource {
    url: String,
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gold-price-feed/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<RawFeedDocument, FeedError> {
        let t0 = std::time::Instant::now();

        let resp = match self.client.get(&self.url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(target: "feed", error = ?e, url = %self.url, "feed http error");
                return Err(FeedError::Network(e.to_string()));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FeedError::Network(format!("reading body: {e}")))?;
        let doc =
            RawFeedDocument::from_json(&body).map_err(|e| FeedError::Malformed(e.to_string()))?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("feed_fetch_ms").record(ms);
        counter!("feed_entries_total").increment(doc.len() as u64);
        Ok(doc)
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn status_error(status: StatusCode) -> FeedError {
    FeedError::Status {
        status: status.as_u16(),
    }
}
