//! Normalized book record and the posted-ISBN set.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel used when a field has no usable value.
pub const NOT_AVAILABLE: &str = "N/A";

const MARKETPLACE_BASE: &str = "https://www.amazon.co.jp";

/// A shinsho title as persisted in the catalog and published to the feed.
///
/// Every field is populated; missing source data degrades to an empty string
/// or a sentinel so consumers never branch on absent keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBook {
    /// ISBN-13 (falls back to the requested identifier, else `N/A`)
    #[serde(rename = "isbn", alias = "isbn13")]
    pub isbn13: String,

    /// ISBN-10 derived from a 978-prefixed ISBN-13, empty otherwise
    #[serde(default)]
    pub isbn10: String,

    pub title: String,
    pub author: String,

    #[serde(default)]
    pub author_bio: String,

    pub publisher: String,

    /// Raw series string as found in the collection block
    pub series: String,

    /// `YYYY年M月` or `発売日未定`
    pub published_date: String,

    #[serde(default)]
    pub page_count: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub table_of_contents: String,

    #[serde(default)]
    pub cover_image_url: String,

    /// When the pipeline processed this record
    pub discovered_at: DateTime<Utc>,
}

impl NormalizedBook {
    /// Product page on the marketplace, with an optional affiliate tag.
    ///
    /// Uses the ISBN-10 product URL when one was derived, otherwise falls back
    /// to a search keyed on the ISBN-13.
    pub fn marketplace_url(&self, affiliate_tag: Option<&str>) -> String {
        let tag = affiliate_tag.filter(|t| !t.is_empty());
        if self.isbn10.is_empty() {
            match tag {
                Some(tag) => format!("{MARKETPLACE_BASE}/s?k={}&tag={tag}", self.isbn13),
                None => format!("{MARKETPLACE_BASE}/s?k={}", self.isbn13),
            }
        } else {
            match tag {
                Some(tag) => format!("{MARKETPLACE_BASE}/dp/{}/?tag={tag}", self.isbn10),
                None => format!("{MARKETPLACE_BASE}/dp/{}/", self.isbn10),
            }
        }
    }
}

/// ISBN-13s already published to the social channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PostedSet {
    isbns: BTreeSet<String>,
}

impl PostedSet {
    pub fn contains(&self, isbn: &str) -> bool {
        self.isbns.contains(isbn)
    }

    /// Record an ISBN as posted. Returns false if it was already present.
    pub fn insert(&mut self, isbn: impl Into<String>) -> bool {
        self.isbns.insert(isbn.into())
    }

    pub fn len(&self) -> usize {
        self.isbns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.isbns.is_empty()
    }
}

impl FromIterator<String> for PostedSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            isbns: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn sample_book(isbn13: &str, isbn10: &str) -> NormalizedBook {
        NormalizedBook {
            isbn13: isbn13.to_string(),
            isbn10: isbn10.to_string(),
            title: "日本語の考古学".to_string(),
            author: "今野 真二".to_string(),
            author_bio: String::new(),
            publisher: "岩波書店".to_string(),
            series: "岩波新書 ； 新赤版 1476".to_string(),
            published_date: "2014年4月".to_string(),
            page_count: "240".to_string(),
            description: String::new(),
            table_of_contents: String::new(),
            cover_image_url: String::new(),
            discovered_at: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn marketplace_url_prefers_isbn10() {
        let book = sample_book("9784004314769", "4004314763");
        assert_eq!(
            book.marketplace_url(None),
            "https://www.amazon.co.jp/dp/4004314763/"
        );
        assert_eq!(
            book.marketplace_url(Some("shinshofinder-22")),
            "https://www.amazon.co.jp/dp/4004314763/?tag=shinshofinder-22"
        );
    }

    #[test]
    fn marketplace_url_falls_back_to_search() {
        let book = sample_book("9790000000001", "");
        assert_eq!(
            book.marketplace_url(None),
            "https://www.amazon.co.jp/s?k=9790000000001"
        );
        assert_eq!(
            book.marketplace_url(Some("tag-22")),
            "https://www.amazon.co.jp/s?k=9790000000001&tag=tag-22"
        );
    }

    #[test]
    fn serializes_with_catalog_field_names() {
        let book = sample_book("9784004314769", "4004314763");
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["isbn"], "9784004314769");
        assert_eq!(json["publishedDate"], "2014年4月");
        assert!(json.get("discoveredAt").is_some());

        let back: NormalizedBook = serde_json::from_value(json).unwrap();
        assert_eq!(back, book);
    }

    #[test]
    fn posted_set_loads_from_plain_array() {
        let posted: PostedSet = serde_json::from_str(r#"["9784004310938"]"#).unwrap();
        assert!(posted.contains("9784004310938"));
        assert_eq!(posted.len(), 1);
    }
}
