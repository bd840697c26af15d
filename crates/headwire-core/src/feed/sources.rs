use super::models::FeedSource;

/// Pick the feeds worth polling when the cycle budget is tight: political
/// feeds that update at least every `max_frequency_mins`, most frequent first,
/// at most `max_feeds` of them. Ties keep configuration order.
pub fn select_priority_feeds(
    feeds: &[FeedSource],
    max_frequency_mins: u32,
    max_feeds: usize,
) -> Vec<FeedSource> {
    let mut eligible: Vec<&FeedSource> = feeds
        .iter()
        .filter(|f| f.is_political && f.update_frequency <= max_frequency_mins)
        .collect();
    eligible.sort_by_key(|f| f.update_frequency);
    eligible.into_iter().take(max_feeds).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_feeds;

    #[test]
    fn test_default_priority_subset() {
        let selected = select_priority_feeds(&default_feeds(), 10, 6);
        let names: Vec<&str> = selected.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["CNN", "Fox News", "Politico", "The Hill", "NY Times", "Washington Post"]
        );
    }

    #[test]
    fn test_non_political_feeds_excluded() {
        let feeds = vec![
            FeedSource {
                name: "MSNBC".to_string(),
                url: "https://www.msnbc.com/feeds/latest".to_string(),
                is_political: false,
                update_frequency: 1,
            },
            FeedSource {
                name: "Politico".to_string(),
                url: "https://rss.politico.com/politics-news.xml".to_string(),
                is_political: true,
                update_frequency: 5,
            },
        ];
        let selected = select_priority_feeds(&feeds, 10, 6);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "Politico");
    }

    #[test]
    fn test_cap_applies() {
        assert_eq!(select_priority_feeds(&default_feeds(), 60, 3).len(), 3);
        assert!(select_priority_feeds(&default_feeds(), 1, 6).is_empty());
    }
}
