// src/alerts.rs
//! Price alerts: how close each configured target is to being hit.

use serde::{Deserialize, Serialize};

use crate::feed::catalog::{self, Language};
use crate::feed::locale::parse_turkish_number;
use crate::feed::types::RawFeedDocument;

// progress is measured over a ₺100 band below/above the target
const PROGRESS_BAND: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Triggered,
    Expired,
}

/// One configured alert (`[[alerts]]` in the feed config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub instrument_key: String,
    pub target_price: f64,
    pub kind: AlertKind,
    #[serde(default)]
    pub days_left: u32,
}

impl AlertRule {
    pub fn new(key: &str, target_price: f64, kind: AlertKind, days_left: u32) -> Self {
        Self {
            instrument_key: key.to_string(),
            target_price,
            kind,
            days_left,
        }
    }
}

pub fn default_rules() -> Vec<AlertRule> {
    vec![
        AlertRule::new("gram-altin", 5000.0, AlertKind::Above, 3),
        AlertRule::new("ceyrek-altin", 8500.0, AlertKind::Below, 2),
        AlertRule::new("yarim-altin", 17000.0, AlertKind::Above, 1),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertView {
    pub instrument_key: String,
    pub product: String,
    pub target_price: f64,
    pub current_price: f64,
    pub kind: AlertKind,
    /// 0..=100
    pub progress: f64,
    pub status: AlertStatus,
    pub days_left: u32,
}

/// Evaluate `rules` against the current prices. Rules whose instrument is
/// missing or priced at zero are left out.
pub fn evaluate(doc: &RawFeedDocument, rules: &[AlertRule], lang: Language) -> Vec<AlertView> {
    rules
        .iter()
        .filter_map(|rule| {
            let quote = doc.quote(&rule.instrument_key)?;
            let current = parse_turkish_number(Some(quote.buy.as_deref().unwrap_or("0")));
            if current <= 0.0 {
                return None;
            }

            let raw = match rule.kind {
                AlertKind::Above => {
                    (current - (rule.target_price - PROGRESS_BAND)) / PROGRESS_BAND * 100.0
                }
                AlertKind::Below => (rule.target_price - current) / PROGRESS_BAND * 100.0,
            };
            let status = if raw >= 100.0 {
                AlertStatus::Triggered
            } else if rule.days_left == 0 {
                AlertStatus::Expired
            } else {
                AlertStatus::Active
            };

            let product = catalog::find(&rule.instrument_key)
                .map(|i| i.display_name(lang).to_string())
                .unwrap_or_else(|| rule.instrument_key.clone());

            Some(AlertView {
                instrument_key: rule.instrument_key.clone(),
                product,
                target_price: rule.target_price,
                current_price: current,
                kind: rule.kind,
                progress: raw.clamp(0.0, 100.0),
                status,
                days_left: rule.days_left,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: &str) -> RawFeedDocument {
        RawFeedDocument::from_json(json.as_bytes()).unwrap()
    }

    #[test]
    fn above_alert_progress_within_band() {
        let d = doc(r#"{"gram-altin": {"Alış": "4.950,00"}}"#);
        let rules = [AlertRule::new("gram-altin", 5000.0, AlertKind::Above, 3)];
        let out = evaluate(&d, &rules, Language::Tr);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].progress, 50.0);
        assert_eq!(out[0].status, AlertStatus::Active);
        assert_eq!(out[0].product, "Gram Altın");
    }

    #[test]
    fn crossing_the_target_triggers_and_clamps() {
        let d = doc(r#"{"gram-altin": {"Alış": "5.300,00"}, "ceyrek-altin": {"Alış": "9.000,00"}}"#);
        let rules = [
            AlertRule::new("gram-altin", 5000.0, AlertKind::Above, 3),
            AlertRule::new("ceyrek-altin", 8500.0, AlertKind::Below, 2),
        ];
        let out = evaluate(&d, &rules, Language::Tr);
        assert_eq!(out[0].progress, 100.0);
        assert_eq!(out[0].status, AlertStatus::Triggered);
        // price above a "below" target: no progress yet
        assert_eq!(out[1].progress, 0.0);
        assert_eq!(out[1].status, AlertStatus::Active);
    }

    #[test]
    fn zero_days_left_expires_untriggered_alerts() {
        let d = doc(r#"{"yarim-altin": {"Alış": "8.000,00"}}"#);
        let rules = [AlertRule::new("yarim-altin", 17000.0, AlertKind::Above, 0)];
        let out = evaluate(&d, &rules, Language::En);
        assert_eq!(out[0].status, AlertStatus::Expired);
        assert_eq!(out[0].product, "Half Gold");
    }

    #[test]
    fn missing_or_zero_priced_instruments_are_skipped() {
        let d = doc(r#"{"gram-altin": {"Alış": "0,00"}}"#);
        let out = evaluate(&d, &default_rules(), Language::Tr);
        assert!(out.is_empty());
    }
}
