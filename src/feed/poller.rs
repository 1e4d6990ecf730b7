// src/feed/poller.rs
//! Live price poller.
//!
//! Owns the current [`RawFeedDocument`] and refreshes it on a fixed wall-clock
//! cadence. Ticks never wait for each other: a slow fetch can overlap the next
//! one, so every fetch carries a sequence number and only the newest response
//! is applied. `stop()` bumps an epoch; anything still in flight from before
//! the stop is dropped on arrival.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use metrics::{counter, gauge};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::feed::catalog::{Instrument, Language};
use crate::feed::project::{project, NormalizedPriceRecord};
use crate::feed::source::{FeedError, FeedSource};
use crate::feed::types::RawFeedDocument;

/// Istanbul has been fixed at UTC+3 since 2016.
const ISTANBUL_OFFSET_SECS: i32 = 3 * 3600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum FeedStatus {
    /// Nothing fetched yet.
    Idle,
    Loading,
    Ready,
    Error { message: String },
}

/// Result of a fetch that reached the feed successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The document was replaced.
    Applied,
    /// A newer response was already applied, or the poller was stopped meanwhile.
    Discarded,
}

/// Read-only view handed to consumers.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub status: FeedStatus,
    pub loading: bool,
    pub error: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
    /// `HH:MM` in Istanbul time, as the site shows it.
    pub last_update_local: Option<String>,
    /// The feed's own `Update_Date` stamp.
    pub source_updated_at: Option<String>,
    pub records: Vec<NormalizedPriceRecord>,
}

#[derive(Debug)]
struct State {
    status: FeedStatus,
    document: Option<Arc<RawFeedDocument>>,
    last_success: Option<DateTime<Utc>>,
    // seq of the document currently held
    doc_seq: u64,
    // seq of the completion that last set `status`
    status_seq: u64,
    epoch: u64,
}

struct Shared {
    source: Arc<dyn FeedSource>,
    state: RwLock<State>,
    next_seq: AtomicU64,
}

pub struct FeedPoller {
    shared: Arc<Shared>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl FeedPoller {
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        crate::feed::ensure_metrics_described();
        Self {
            shared: Arc::new(Shared {
                source,
                state: RwLock::new(State {
                    status: FeedStatus::Idle,
                    document: None,
                    last_success: None,
                    doc_seq: 0,
                    status_seq: 0,
                    epoch: 0,
                }),
                next_seq: AtomicU64::new(1),
            }),
            ticker: Mutex::new(None),
        }
    }

    /// Fetch now, then once per `interval` until [`stop`](Self::stop).
    ///
    /// Restarting replaces the previous schedule.
    pub fn start(&self, interval: Duration) {
        let interval = interval.max(Duration::from_millis(1));
        let mut ticker = self.ticker.lock();
        if let Some(old) = ticker.take() {
            old.abort();
        }

        let shared = self.shared.clone();
        let source_name = shared.source.name().to_string();
        let epoch = shared.state.read().epoch;
        *ticker = Some(tokio::spawn(async move {
            let mut iv = tokio::time::interval(interval);
            iv.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                // first tick completes immediately
                iv.tick().await;
                let Some(ticket) = shared.begin_scheduled(epoch) else {
                    // stopped between the tick and here
                    break;
                };
                counter!("feed_ticks_total").increment(1);
                let s = shared.clone();
                tokio::spawn(async move {
                    // errors are already logged and reflected in the status
                    let _ = s.complete(ticket).await;
                });
            }
        }));

        tracing::info!(
            target: "feed",
            source = %source_name,
            interval_ms = interval.as_millis() as u64,
            "feed poller started"
        );
    }

    /// Cancel the schedule. Safe to call any number of times.
    pub fn stop(&self) {
        let handle = self.ticker.lock().take();
        let was_running = handle.is_some();
        if let Some(h) = handle {
            h.abort();
        }

        let mut st = self.shared.state.write();
        st.epoch += 1;
        if st.status == FeedStatus::Loading {
            st.status = if st.document.is_some() {
                FeedStatus::Ready
            } else {
                FeedStatus::Idle
            };
        }
        drop(st);

        if was_running {
            tracing::info!(target: "feed", "feed poller stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// One out-of-band fetch. Does not move the periodic schedule.
    pub async fn fetch_once(&self) -> Result<FetchOutcome, FeedError> {
        self.shared.fetch_once().await
    }

    pub fn status(&self) -> FeedStatus {
        self.shared.state.read().status.clone()
    }

    /// Last successfully fetched document, if any.
    pub fn document(&self) -> Option<Arc<RawFeedDocument>> {
        self.shared.state.read().document.clone()
    }

    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        self.shared.state.read().last_success
    }

    /// Join the current document with `catalog`. Empty before the first success.
    pub fn project(&self, catalog: &[Instrument], lang: Language) -> Vec<NormalizedPriceRecord> {
        let (doc, at) = {
            let st = self.shared.state.read();
            (st.document.clone(), st.last_success)
        };
        match (doc, at) {
            (Some(doc), Some(at)) => project(&doc, catalog, lang, at),
            _ => Vec::new(),
        }
    }

    pub fn snapshot(&self, catalog: &[Instrument], lang: Language) -> FeedSnapshot {
        let (status, doc, at) = {
            let st = self.shared.state.read();
            (st.status.clone(), st.document.clone(), st.last_success)
        };

        let records = match (&doc, at) {
            (Some(doc), Some(at)) => project(doc, catalog, lang, at),
            _ => Vec::new(),
        };
        let error = match &status {
            FeedStatus::Error { message } => Some(message.clone()),
            _ => None,
        };

        FeedSnapshot {
            loading: status == FeedStatus::Loading,
            error,
            last_update: at,
            last_update_local: at.map(istanbul_hhmm),
            source_updated_at: doc.as_ref().and_then(|d| d.update_date().map(str::to_string)),
            records,
            status,
        }
    }
}

impl Drop for FeedPoller {
    fn drop(&mut self) {
        if let Some(h) = self.ticker.get_mut().take() {
            h.abort();
        }
    }
}

/// A claimed fetch: its sequence number and the epoch it belongs to.
#[derive(Debug, Clone, Copy)]
struct Ticket {
    seq: u64,
    epoch: u64,
}

impl Shared {
    async fn fetch_once(&self) -> Result<FetchOutcome, FeedError> {
        let ticket = {
            let mut st = self.state.write();
            self.claim(&mut st)
        };
        self.complete(ticket).await
    }

    /// Claim a fetch for a schedule started in `epoch`. `None` once the
    /// schedule has been stopped, so a tick racing `stop()` never fetches.
    fn begin_scheduled(&self, epoch: u64) -> Option<Ticket> {
        let mut st = self.state.write();
        (st.epoch == epoch).then(|| self.claim(&mut st))
    }

    fn claim(&self, st: &mut State) -> Ticket {
        st.status = FeedStatus::Loading;
        Ticket {
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
            epoch: st.epoch,
        }
    }

    async fn complete(&self, ticket: Ticket) -> Result<FetchOutcome, FeedError> {
        let Ticket { seq, epoch } = ticket;
        counter!("feed_fetch_total").increment(1);

        let result = self.source.fetch().await;

        let mut st = self.state.write();
        if st.epoch != epoch {
            drop(st);
            counter!("feed_stale_discarded_total").increment(1);
            tracing::debug!(target: "feed", seq, "response arrived after stop; dropped");
            return result.map(|_| FetchOutcome::Discarded);
        }

        match result {
            Ok(doc) => {
                let newer_doc = seq > st.doc_seq;
                if newer_doc {
                    let now = Utc::now();
                    st.document = Some(Arc::new(doc));
                    st.doc_seq = seq;
                    st.last_success = Some(now);
                    gauge!("feed_last_success_ts").set(now.timestamp() as f64);
                }
                if seq > st.status_seq {
                    st.status = FeedStatus::Ready;
                    st.status_seq = seq;
                }
                drop(st);

                if newer_doc {
                    tracing::debug!(target: "feed", seq, "feed document replaced");
                    Ok(FetchOutcome::Applied)
                } else {
                    counter!("feed_stale_discarded_total").increment(1);
                    tracing::debug!(target: "feed", seq, "older response dropped");
                    Ok(FetchOutcome::Discarded)
                }
            }
            Err(e) => {
                if seq > st.status_seq {
                    st.status = FeedStatus::Error {
                        message: e.to_string(),
                    };
                    st.status_seq = seq;
                }
                drop(st);

                counter!("feed_fetch_errors_total", "kind" => e.kind()).increment(1);
                tracing::warn!(target: "feed", error = %e, seq, "feed fetch failed");
                Err(e)
            }
        }
    }
}

fn istanbul_hhmm(at: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(ISTANBUL_OFFSET_SECS) {
        Some(tz) => at.with_timezone(&tz).format("%H:%M").to_string(),
        None => at.format("%H:%M").to_string(),
    }
}
