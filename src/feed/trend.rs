// src/feed/trend.rs
use serde::{Deserialize, Serialize};

use crate::feed::locale::parse_turkish_number;

/// Direction of the daily move for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn is_up(self) -> bool {
        matches!(self, Trend::Up)
    }
}

/// `Up` when the change text carries an explicit `+` or parses above zero.
///
/// An unsigned zero (`"0,00"`) is `Down`; the product shows it that way today.
pub fn classify_trend(change: &str) -> Trend {
    let explicit_plus = change.trim_start().starts_with('+');
    if explicit_plus || parse_turkish_number(Some(change)) > 0.0 {
        Trend::Up
    } else {
        Trend::Down
    }
}
