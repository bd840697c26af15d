use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A configured syndication feed. Immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub is_political: bool,
    /// Polling-frequency hint in minutes
    #[serde(default = "default_update_frequency")]
    pub update_frequency: u32,
}

fn default_update_frequency() -> u32 {
    30
}

/// One entry as the feed listed it, before any filtering
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub title: Option<String>,
    /// `"#"` when the entry carried no link
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// A stored headline. `link` is its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub headline: String,
    pub link: String,
    pub source: String,
    pub pub_time: DateTime<Utc>,
    pub fetch_time: DateTime<Utc>,
}

/// A headline rendered for readers of the listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlineView {
    pub headline: String,
    pub link: String,
    pub source: String,
    pub pub_time: String,
    pub fetch_time: String,
    pub is_new: bool,
    /// ISO-8601 publish time, kept for client-side sorting
    pub pub_time_raw: String,
}

/// Fixed-width ISO-8601 UTC rendering (`2025-01-05T15:04:05.000Z`).
/// Lexicographic order matches chronological order.
pub fn to_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse any RFC 3339 instant back into UTC
pub fn parse_iso(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2025, 1, 5, 15, 4, 5).unwrap();
        assert_eq!(to_iso(whole), "2025-01-05T15:04:05.000Z");
        assert_eq!(parse_iso(&to_iso(whole)), Some(whole));
    }

    #[test]
    fn test_parse_iso_normalizes_offset() {
        let parsed = parse_iso("2025-01-05T09:04:05-06:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 5, 15, 4, 5).unwrap());
        assert!(parse_iso("yesterday").is_none());
    }

    #[test]
    fn test_feed_source_defaults() {
        let source: FeedSource =
            serde_json::from_str(r#"{"name":"X","url":"http://x/rss"}"#).unwrap();
        assert!(!source.is_political);
        assert_eq!(source.update_frequency, 30);
    }
}
