use chrono::{DateTime, Duration, FixedOffset, Utc};

use super::models::{to_iso, Article, HeadlineView};
use crate::config::DisplayConfig;

/// Render an instant the way the headline listing shows it,
/// e.g. `January 5, 2025, 3:04 PM CST`
pub fn format_display_time(instant: DateTime<Utc>, utc_offset_hours: i32, label: &str) -> String {
    const LAYOUT: &str = "%B %-d, %Y, %-I:%M %p";
    let rendered = match FixedOffset::east_opt(utc_offset_hours * 3600) {
        Some(offset) => instant.with_timezone(&offset).format(LAYOUT).to_string(),
        None => instant.format(LAYOUT).to_string(),
    };
    format!("{} {}", rendered, label)
}

/// Published within the last `within_mins` minutes
pub fn is_new(pub_time: DateTime<Utc>, now: DateTime<Utc>, within_mins: i64) -> bool {
    now - pub_time < Duration::minutes(within_mins)
}

impl HeadlineView {
    pub fn from_article(article: &Article, display: &DisplayConfig, now: DateTime<Utc>) -> Self {
        Self {
            headline: article.headline.clone(),
            link: article.link.clone(),
            source: article.source.clone(),
            pub_time: format_display_time(article.pub_time, display.utc_offset_hours, &display.zone_label),
            fetch_time: format_display_time(
                article.fetch_time,
                display.utc_offset_hours,
                &display.zone_label,
            ),
            is_new: is_new(article.pub_time, now, display.new_within_mins),
            pub_time_raw: to_iso(article.pub_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_central() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 5, 21, 4, 0).unwrap();
        assert_eq!(format_display_time(instant, -6, "CST"), "January 5, 2025, 3:04 PM CST");
    }

    #[test]
    fn test_format_crosses_midnight() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 6, 3, 30, 0).unwrap();
        assert_eq!(format_display_time(instant, -6, "CST"), "January 5, 2025, 9:30 PM CST");
    }

    #[test]
    fn test_is_new_threshold() {
        let now = Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap();
        assert!(is_new(now - Duration::minutes(29), now, 30));
        assert!(!is_new(now - Duration::minutes(30), now, 30));
        assert!(!is_new(now - Duration::hours(3), now, 30));
    }

    #[test]
    fn test_view_keeps_raw_iso() {
        let now = Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap();
        let article = Article {
            headline: "Senate vote".to_string(),
            link: "http://x/1".to_string(),
            source: "X".to_string(),
            pub_time: now - Duration::minutes(5),
            fetch_time: now,
        };
        let view = HeadlineView::from_article(&article, &DisplayConfig::default(), now);
        assert!(view.is_new);
        assert_eq!(view.pub_time_raw, "2025-01-05T11:55:00.000Z");
        assert_eq!(view.fetch_time, "January 5, 2025, 6:00 AM CST");
    }
}
