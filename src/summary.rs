// src/summary.rs
//! Market summary cards shown above the detailed table.

use serde::Serialize;

use crate::feed::catalog::{self, Language};
use crate::feed::locale::{format_try, parse_turkish_number};
use crate::feed::trend::{classify_trend, Trend};
use crate::feed::types::RawFeedDocument;

/// Feed keys summarized, in card order.
pub const SUMMARY_KEYS: &[&str] = &["gram-altin", "ceyrek-altin", "USD", "EUR"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCard {
    pub key: String,
    pub title: String,
    /// e.g. `₺2.150,50`
    pub value: String,
    /// e.g. `+0.60`
    pub change: String,
    /// e.g. `+0.60%`
    pub change_percent: String,
    pub trend: Trend,
}

pub fn market_summary(doc: &RawFeedDocument, lang: Language) -> Vec<SummaryCard> {
    SUMMARY_KEYS
        .iter()
        .filter_map(|&key| {
            let quote = doc.quote(key)?;
            let inst = catalog::find(key)?;

            let price = parse_turkish_number(Some(quote.buy.as_deref().unwrap_or("0")));
            let change_text = quote.change.as_deref().unwrap_or("0%");
            let change_value = parse_turkish_number(Some(change_text));
            let trend = classify_trend(change_text);
            let sign = if trend.is_up() && change_value >= 0.0 { "+" } else { "" };

            Some(SummaryCard {
                key: key.to_string(),
                title: inst.display_name(lang).to_string(),
                value: format_try(price),
                change: format!("{sign}{change_value:.2}"),
                change_percent: format!("{sign}{change_value:.2}%"),
                trend,
            })
        })
        .collect()
}
