// src/feed/project.rs
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::feed::catalog::{Category, Instrument, Language};
use crate::feed::locale::parse_turkish_number;
use crate::feed::trend::{classify_trend, Trend};
use crate::feed::types::RawFeedDocument;

/// Display-ready row derived from the feed. Rebuilt on every read, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPriceRecord {
    pub instrument_key: String,
    pub display_name: String,
    pub category: Category,
    pub category_label: String,
    pub current_price: f64,
    /// Signed lira move implied by the daily percentage.
    pub change_absolute: f64,
    /// Magnitude of the daily percentage; direction lives in `trend`.
    pub change_percent: f64,
    pub trend: Trend,
    pub observed_at: DateTime<Utc>,
}

/// Join `doc` against `catalog` in catalog order.
///
/// Keys missing from the document, or present as metadata strings, are skipped.
pub fn project(
    doc: &RawFeedDocument,
    catalog: &[Instrument],
    lang: Language,
    observed_at: DateTime<Utc>,
) -> Vec<NormalizedPriceRecord> {
    catalog
        .iter()
        .filter_map(|inst| {
            let quote = doc.quote(inst.key)?;

            let current_price = parse_turkish_number(Some(quote.buy.as_deref().unwrap_or("0")));
            let change_text = quote.change.as_deref().unwrap_or("0%");
            let change_value = parse_turkish_number(Some(change_text));

            Some(NormalizedPriceRecord {
                instrument_key: inst.key.to_string(),
                display_name: inst.display_name(lang).to_string(),
                category: inst.category,
                category_label: inst.category.label(lang).to_string(),
                current_price,
                change_absolute: round2(current_price * change_value / 100.0),
                change_percent: change_value.abs(),
                trend: classify_trend(change_text),
                observed_at,
            })
        })
        .collect()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
