use feed_rs::parser;

use super::models::RawEntry;
use crate::{Error, Result};

/// Link recorded for entries that carry none
pub const MISSING_LINK: &str = "#";

/// Parse RSS/Atom/JSON Feed content into raw entries, in listed order.
///
/// Publish time prefers the entry's published date and falls back to its
/// updated date. Dates the parser cannot read come through as `None`.
pub fn parse_feed(content: &[u8]) -> Result<Vec<RawEntry>> {
    let feed = parser::parse(content)
        .map_err(|e| Error::FeedParse(e.to_string()))?;

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let title = entry
                .title
                .map(|t| t.content.trim().to_string())
                .filter(|t| !t.is_empty());

            let link = entry
                .links
                .first()
                .map(|l| l.href.trim().to_string())
                .filter(|href| !href.is_empty())
                .unwrap_or_else(|| MISSING_LINK.to_string());

            let published_at = entry.published.or(entry.updated);

            RawEntry {
                title,
                link,
                published_at,
            }
        })
        .collect();

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>X Politics</title>
    <link>http://x/</link>
    <description>test</description>
    <item>
      <title>Trump signs bill</title>
      <link>http://x/1</link>
      <pubDate>Mon, 10 Mar 2025 12:00:00 GMT</pubDate>
    </item>
    <item>
      <title>No link here</title>
      <pubDate>Mon, 10 Mar 2025 13:00:00 GMT</pubDate>
    </item>
    <item>
      <title>No date here</title>
      <link>http://x/3</link>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Politics</title>
  <id>urn:x</id>
  <updated>2025-03-10T12:00:00Z</updated>
  <entry>
    <title>Senate vote</title>
    <id>urn:x:1</id>
    <link href="http://x/atom/1"/>
    <updated>2025-03-10T08:30:00-05:00</updated>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_items() {
        let entries = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].title.as_deref(), Some("Trump signs bill"));
        assert_eq!(entries[0].link, "http://x/1");
        assert_eq!(
            entries[0].published_at,
            Some(Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap())
        );

        assert_eq!(entries[1].link, MISSING_LINK);
        assert!(entries[2].published_at.is_none());
    }

    #[test]
    fn test_atom_falls_back_to_updated() {
        let entries = parse_feed(ATOM.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "http://x/atom/1");
        assert_eq!(
            entries[0].published_at,
            Some(Utc.with_ymd_and_hms(2025, 3, 10, 13, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_malformed_payload() {
        let err = parse_feed(b"<html><body>Just a moment...</body></html>").unwrap_err();
        assert!(matches!(err, Error::FeedParse(_)));
    }
}
