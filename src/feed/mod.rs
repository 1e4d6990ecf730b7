// src/feed/mod.rs
pub mod catalog;
pub mod locale;
pub mod mock;
pub mod poller;
pub mod project;
pub mod source;
pub mod trend;
pub mod types;

pub use catalog::{Category, Instrument, Language, CURRENCY_CATALOG, GOLD_CATALOG};
pub use locale::{format_try, format_turkish_number, parse_turkish_number};
pub use poller::{FeedPoller, FeedSnapshot, FeedStatus, FetchOutcome};
pub use project::{project, NormalizedPriceRecord};
pub use source::{FeedError, FeedSource, HttpFeedSource};
pub use trend::{classify_trend, Trend};
pub use types::{FeedEntry, Quote, RawFeedDocument};

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_ticks_total", "Scheduled poller ticks.");
        describe_counter!("feed_fetch_total", "Feed fetches started (scheduled + manual).");
        describe_counter!(
            "feed_fetch_errors_total",
            "Feed fetches that failed, by kind."
        );
        describe_counter!(
            "feed_stale_discarded_total",
            "Responses dropped because a newer one was applied or the poller stopped."
        );
        describe_counter!("feed_entries_total", "Top-level entries seen in feed documents.");
        describe_histogram!("feed_fetch_ms", "Feed fetch + parse time in milliseconds.");
        describe_gauge!(
            "feed_last_success_ts",
            "Unix ts of the last applied feed document."
        );
    });
}
