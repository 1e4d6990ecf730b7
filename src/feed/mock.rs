// src/feed/mock.rs
//! Scripted in-memory feed for tests and local runs without network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::feed::source::{FeedError, FeedSource};
use crate::feed::types::RawFeedDocument;

enum Step {
    Ready(Result<RawFeedDocument, FeedError>),
    Gated(oneshot::Receiver<()>, Result<RawFeedDocument, FeedError>),
}

/// Answers fetches from a queue of scripted responses, in call order.
///
/// When the queue runs dry the last successful document is served again, or a
/// network error if there never was one.
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    last_ok: Mutex<Option<RawFeedDocument>>,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            last_ok: Mutex::new(None),
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn push_ok(&self, doc: RawFeedDocument) {
        self.steps.lock().push_back(Step::Ready(Ok(doc)));
    }

    pub fn push_err(&self, err: FeedError) {
        self.steps.lock().push_back(Step::Ready(Err(err)));
    }

    /// Queue a response that is held back until the returned sender fires
    /// (or is dropped).
    pub fn push_gated(&self, result: Result<RawFeedDocument, FeedError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.steps.lock().push_back(Step::Gated(rx, result));
        tx
    }

    /// Number of fetches started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of fetches that returned.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    fn fallback(&self) -> Result<RawFeedDocument, FeedError> {
        self.last_ok
            .lock()
            .clone()
            .ok_or_else(|| FeedError::Network("no scripted response".into()))
    }

    pub async fn wait_calls(&self, n: usize) {
        wait_until(|| self.calls() >= n).await;
    }

    pub async fn wait_completed(&self, n: usize) {
        wait_until(|| self.completed() >= n).await;
    }
}

async fn wait_until(cond: impl Fn() -> bool) {
    for _ in 0..400 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("scripted source: condition not reached within 2s");
}

#[async_trait]
impl FeedSource for ScriptedSource {
    async fn fetch(&self) -> Result<RawFeedDocument, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().pop_front();

        let result = match step {
            Some(Step::Ready(r)) => r,
            Some(Step::Gated(rx, r)) => {
                let _ = rx.await;
                r
            }
            None => self.fallback(),
        };

        if let Ok(doc) = &result {
            *self.last_ok.lock() = Some(doc.clone());
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    #[should_panic(expected = "condition not reached")]
    async fn waiting_for_calls_that_never_come_panics() {
        ScriptedSource::new().wait_calls(1).await;
    }

    #[tokio::test]
    async fn exhausted_script_replays_last_document() {
        let src = ScriptedSource::new();
        src.push_ok(RawFeedDocument::default());
        assert!(src.fetch().await.is_ok());
        assert!(src.fetch().await.is_ok());
        src.wait_completed(2).await;
        assert_eq!(src.calls(), 2);
    }
}
