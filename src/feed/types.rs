// src/feed/types.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Metadata key the feed uses for its own "last updated" stamp.
pub const UPDATE_DATE_KEY: &str = "Update_Date";

/// One instrument row as the feed ships it. All values are locale text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "Alış", alias = "buy", default, deserialize_with = "lenient_text")]
    pub buy: Option<String>,
    #[serde(rename = "Satış", alias = "sell", default, deserialize_with = "lenient_text")]
    pub sell: Option<String>,
    #[serde(rename = "Değişim", alias = "change", default, deserialize_with = "lenient_text")]
    pub change: Option<String>,
}

/// A top-level value of the feed document.
///
/// Only JSON objects become [`FeedEntry::Quote`]; strings are metadata and
/// every other shape is carried as [`FeedEntry::Other`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeedEntry {
    Meta(String),
    Quote(Quote),
    // numbers, arrays, null: kept so the document still parses, never projected
    Other(serde_json::Value),
}

impl<'de> Deserialize<'de> for FeedEntry {
    fn deserialize<D>(de: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // a derived struct visitor also takes sequences, so dispatch on the JSON shape
        Ok(match serde_json::Value::deserialize(de)? {
            serde_json::Value::String(s) => FeedEntry::Meta(s),
            obj @ serde_json::Value::Object(_) => match Quote::deserialize(&obj) {
                Ok(q) => FeedEntry::Quote(q),
                Err(_) => FeedEntry::Other(obj),
            },
            other => FeedEntry::Other(other),
        })
    }
}

/// The whole feed payload. Replaced wholesale on every successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawFeedDocument {
    entries: BTreeMap<String, FeedEntry>,
}

impl RawFeedDocument {
    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    pub fn get(&self, key: &str) -> Option<&FeedEntry> {
        self.entries.get(key)
    }

    /// Quote object for `key`; `None` when absent or not an object.
    pub fn quote(&self, key: &str) -> Option<&Quote> {
        match self.entries.get(key) {
            Some(FeedEntry::Quote(q)) => Some(q),
            _ => None,
        }
    }

    /// Feed-provided `Update_Date`, when present as a string.
    pub fn update_date(&self) -> Option<&str> {
        match self.entries.get(UPDATE_DATE_KEY) {
            Some(FeedEntry::Meta(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, FeedEntry)> for RawFeedDocument {
    fn from_iter<T: IntoIterator<Item = (String, FeedEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Accept `"2.150,50"` as well as a bare JSON number; anything else reads as missing.
fn lenient_text<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
        Other(serde_json::Value),
    }

    Ok(match Option::<TextOrNumber>::deserialize(de)? {
        Some(TextOrNumber::Text(s)) => Some(s),
        // machine numbers use '.' as decimal point; re-express in feed locale
        Some(TextOrNumber::Number(n)) => Some(n.to_string().replace('.', ",")),
        Some(TextOrNumber::Other(_)) | None => None,
    })
}
