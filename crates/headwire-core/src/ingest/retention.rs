use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::storage::ArticleStore;
use crate::Result;

/// Oldest publish instant that survives a sweep at `now`
pub fn retention_threshold(now: DateTime<Utc>, retention_days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(retention_days))
}

/// Delete every article published strictly before `threshold`
pub async fn purge_older_than(store: &dyn ArticleStore, threshold: DateTime<Utc>) -> Result<u64> {
    let deleted = store.delete_older_than(threshold).await?;
    if deleted > 0 {
        info!("Purged {} headlines published before {}", deleted, threshold);
    }
    Ok(deleted)
}

pub async fn clear_all(store: &dyn ArticleStore) -> Result<u64> {
    let deleted = store.delete_all().await?;
    info!("Cleared {} headlines", deleted);
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Article;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn article(link: &str, pub_time: DateTime<Utc>) -> Article {
        Article {
            headline: "Senate vote".to_string(),
            link: link.to_string(),
            source: "X".to_string(),
            pub_time,
            fetch_time: pub_time,
        }
    }

    #[test]
    fn test_threshold_is_days_before_now() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(
            retention_threshold(now, 7),
            Utc.with_ymd_and_hms(2025, 3, 3, 12, 0, 0).unwrap()
        );
        assert_eq!(retention_threshold(now, 0), now);
    }

    #[tokio::test]
    async fn test_purge_leaves_nothing_older_than_threshold() {
        let store = MemoryStore::new();
        let threshold = Utc.with_ymd_and_hms(2025, 3, 3, 12, 0, 0).unwrap();
        store.insert(&article("old", threshold - Duration::milliseconds(1))).await.unwrap();
        store.insert(&article("edge", threshold)).await.unwrap();
        store.insert(&article("new", threshold + Duration::days(2))).await.unwrap();

        assert_eq!(purge_older_than(&store, threshold).await.unwrap(), 1);
        assert!(store.snapshot().await.iter().all(|a| a.pub_time >= threshold));
        assert_eq!(store.count().await.unwrap(), 2);

        assert_eq!(purge_older_than(&store, threshold).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear_all_on_empty_store() {
        let store = MemoryStore::new();
        assert_eq!(clear_all(&store).await.unwrap(), 0);
    }
}
