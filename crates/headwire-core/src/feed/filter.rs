use chrono::{DateTime, Utc};

use super::models::{Article, RawEntry};
use super::relevance::is_relevant;
use super::window::WindowBounds;

/// Why an entry never became a candidate article
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingTitle,
    MissingTimestamp,
    OutsideWindow,
    NotRelevant,
}

/// Turn one raw entry into a candidate article, or say why not.
/// Checks run in order: title, timestamp, acceptance window, relevance.
pub fn normalize_entry(
    entry: RawEntry,
    source: &str,
    window: &WindowBounds,
    fetch_time: DateTime<Utc>,
) -> Result<Article, Rejection> {
    let headline = match entry.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => return Err(Rejection::MissingTitle),
    };

    let pub_time = entry.published_at.ok_or(Rejection::MissingTimestamp)?;

    if !window.contains(pub_time) {
        return Err(Rejection::OutsideWindow);
    }

    if !is_relevant(&headline) {
        return Err(Rejection::NotRelevant);
    }

    Ok(Article {
        headline,
        link: entry.link,
        source: source.to_string(),
        pub_time,
        fetch_time,
    })
}

/// Normalize a feed's entries in listed order, logging each rejection
pub fn collect_candidates(
    entries: Vec<RawEntry>,
    source: &str,
    window: &WindowBounds,
    fetch_time: DateTime<Utc>,
) -> Vec<Article> {
    let mut candidates = Vec::new();

    for entry in entries {
        let title = entry.title.clone().unwrap_or_default();
        match normalize_entry(entry, source, window, fetch_time) {
            Ok(article) => {
                tracing::debug!("Accepted '{}' from {}", article.headline, source);
                candidates.push(article);
            }
            Err(reason) => {
                tracing::debug!("Skipped '{}' from {}: {:?}", title, source, reason);
            }
        }
    }

    candidates
}
