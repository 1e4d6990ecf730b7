// src/feed/catalog.rs
//! Static instrument catalog. Compiled in, never read from the feed.

use serde::{Deserialize, Serialize};

/// Display language of the site. Turkish is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Tr,
    En,
}

impl Language {
    /// `"en"` (any case) selects English; everything else falls back to Turkish.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(|c| c.trim().to_ascii_lowercase()) {
            Some(c) if c == "en" => Language::En,
            _ => Language::Tr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Investment,
    Collection,
    Jewelry,
}

impl Category {
    pub fn label(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Category::Investment, Language::Tr) => "Yatırım",
            (Category::Collection, Language::Tr) => "Koleksiyon",
            (Category::Jewelry, Language::Tr) => "Takı",
            (Category::Investment, Language::En) => "Investment",
            (Category::Collection, Language::En) => "Collection",
            (Category::Jewelry, Language::En) => "Jewelry",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instrument {
    pub key: &'static str,
    pub name_tr: &'static str,
    pub name_en: &'static str,
    pub category: Category,
}

impl Instrument {
    pub const fn new(
        key: &'static str,
        name_tr: &'static str,
        name_en: &'static str,
        category: Category,
    ) -> Self {
        Self {
            key,
            name_tr,
            name_en,
            category,
        }
    }

    pub fn display_name(&self, lang: Language) -> &'static str {
        match lang {
            Language::Tr => self.name_tr,
            Language::En => self.name_en,
        }
    }
}

/// Gold products shown in the live price table, in display order.
pub const GOLD_CATALOG: &[Instrument] = &[
    Instrument::new("gram-altin", "Gram Altın", "Gram Gold", Category::Investment),
    Instrument::new("ceyrek-altin", "Çeyrek Altın", "Quarter Gold", Category::Investment),
    Instrument::new("yarim-altin", "Yarım Altın", "Half Gold", Category::Investment),
    Instrument::new("tam-altin", "Tam Altın", "Full Gold", Category::Investment),
    Instrument::new("cumhuriyet-altini", "Cumhuriyet Altını", "Republic Gold", Category::Collection),
    Instrument::new("ata-altin", "Ata Altın", "Ata Gold", Category::Collection),
    Instrument::new("14-ayar-altin", "14 Ayar Altın", "14 Carat Gold", Category::Jewelry),
    Instrument::new("18-ayar-altin", "18 Ayar Altın", "18 Carat Gold", Category::Jewelry),
    Instrument::new("22-ayar-bilezik", "22 Ayar Bilezik", "22 Carat Bracelet", Category::Jewelry),
    Instrument::new("besli-altin", "Beşli Altın", "Five Gold", Category::Investment),
    Instrument::new("ikibucuk-altin", "Ziynet 2.5 Altın", "Jewelry 2.5 Gold", Category::Jewelry),
    Instrument::new("gremse-altin", "Gremse Altın", "Gremse Gold", Category::Collection),
    Instrument::new("resat-altin", "Reşat Altın", "Resat Gold", Category::Collection),
    Instrument::new("hamit-altin", "Hamit Altın", "Hamit Gold", Category::Collection),
];

/// Currency rows used by the market summary. Not part of the gold table.
pub const CURRENCY_CATALOG: &[Instrument] = &[
    Instrument::new("USD", "Dolar Kuru", "US Dollar", Category::Investment),
    Instrument::new("EUR", "Euro Kuru", "Euro", Category::Investment),
    Instrument::new("ons", "Altın Ons", "Gold Ounce", Category::Investment),
];

/// Look up an instrument by feed key across both catalogs.
pub fn find(key: &str) -> Option<&'static Instrument> {
    GOLD_CATALOG
        .iter()
        .chain(CURRENCY_CATALOG.iter())
        .find(|i| i.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn gold_catalog_has_fourteen_unique_keys() {
        assert_eq!(GOLD_CATALOG.len(), 14);
        let keys: HashSet<_> = GOLD_CATALOG.iter().map(|i| i.key).collect();
        assert_eq!(keys.len(), GOLD_CATALOG.len());
    }

    #[test]
    fn language_codes_fall_back_to_turkish() {
        assert_eq!(Language::from_code(Some("EN")), Language::En);
        assert_eq!(Language::from_code(Some(" en ")), Language::En);
        assert_eq!(Language::from_code(Some("de")), Language::Tr);
        assert_eq!(Language::from_code(None), Language::Tr);
    }

    #[test]
    fn names_and_labels_follow_language() {
        let gram = find("gram-altin").unwrap();
        assert_eq!(gram.display_name(Language::Tr), "Gram Altın");
        assert_eq!(gram.display_name(Language::En), "Gram Gold");
        assert_eq!(gram.category.label(Language::En), "Investment");
        assert_eq!(find("USD").unwrap().display_name(Language::Tr), "Dolar Kuru");
        assert!(find("bitcoin").is_none());
    }
}
