use futures::future::join_all;
use tracing::{debug, error};

use crate::feed::Article;
use crate::storage::{ArticleStore, InsertOutcome};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

impl UpsertOutcome {
    pub fn inserted(self) -> bool {
        matches!(self, UpsertOutcome::Inserted)
    }
}

/// Insert the article, or refresh the stored one that shares its link.
///
/// A duplicate-key insert means another writer stored the link between our
/// lookup and our insert; that path becomes an update.
pub async fn upsert_article(store: &dyn ArticleStore, article: &Article) -> Result<UpsertOutcome> {
    if store.find_by_link(&article.link).await?.is_some() {
        store.update_by_link(article).await?;
        return Ok(UpsertOutcome::Updated);
    }

    match store.insert(article).await? {
        InsertOutcome::Inserted => Ok(UpsertOutcome::Inserted),
        InsertOutcome::DuplicateKey => {
            debug!("Link {} inserted concurrently, updating instead", article.link);
            store.update_by_link(article).await?;
            Ok(UpsertOutcome::Updated)
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchResult {
    pub inserted: Vec<Article>,
    pub updated: usize,
    pub failed: usize,
}

/// Upsert one batch concurrently. Per-article failures are logged and
/// counted; an unreachable store fails the whole batch.
pub async fn upsert_batch(store: &dyn ArticleStore, batch: &[Article]) -> Result<BatchResult> {
    let outcomes = join_all(batch.iter().map(|article| upsert_article(store, article))).await;

    let mut result = BatchResult::default();
    let mut unavailable = None;

    for (article, outcome) in batch.iter().zip(outcomes) {
        match outcome {
            Ok(UpsertOutcome::Inserted) => result.inserted.push(article.clone()),
            Ok(UpsertOutcome::Updated) => result.updated += 1,
            Err(e) if e.is_store_unavailable() => {
                error!("Store unavailable while saving {}: {}", article.link, e);
                unavailable.get_or_insert(e);
            }
            Err(e) => {
                error!("Failed to save headline {}: {}", article.link, e);
                result.failed += 1;
            }
        }
    }

    match unavailable {
        Some(e) => Err(e),
        None => Ok(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::Error;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::time::Duration;

    fn article(link: &str, headline: &str) -> Article {
        Article {
            headline: headline.to_string(),
            link: link.to_string(),
            source: "X".to_string(),
            pub_time: Utc::now(),
            fetch_time: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_update() {
        let store = MemoryStore::new();
        let first = upsert_article(&store, &article("http://x/1", "Senate vote")).await.unwrap();
        let second = upsert_article(&store, &article("http://x/1", "Senate vote passes")).await.unwrap();

        assert_eq!(first, UpsertOutcome::Inserted);
        assert_eq!(second, UpsertOutcome::Updated);
        let stored = store.find_by_link("http://x/1").await.unwrap().unwrap();
        assert_eq!(stored.headline, "Senate vote passes");
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_upserts_of_same_link_store_one_row() {
        let store = MemoryStore::new().with_lookup_delay(Duration::from_millis(10));
        let a = article("http://x/1", "Senate vote");
        let b = article("http://x/1", "Senate vote (live)");

        let (left, right) = tokio::join!(upsert_article(&store, &a), upsert_article(&store, &b));
        let mut outcomes = vec![left.unwrap(), right.unwrap()];
        outcomes.sort_by_key(|o| o.inserted());

        assert_eq!(outcomes, vec![UpsertOutcome::Updated, UpsertOutcome::Inserted]);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    /// Fails lookups for one link, or every call once `down` is set
    struct FlakyStore {
        inner: MemoryStore,
        broken_link: &'static str,
        down: bool,
    }

    #[async_trait]
    impl ArticleStore for FlakyStore {
        async fn find_by_link(&self, link: &str) -> Result<Option<Article>> {
            if self.down {
                return Err(Error::StoreConnection("connection refused".into()));
            }
            if link == self.broken_link {
                return Err(Error::Other("bad row".into()));
            }
            self.inner.find_by_link(link).await
        }
        async fn insert(&self, article: &Article) -> Result<InsertOutcome> {
            self.inner.insert(article).await
        }
        async fn update_by_link(&self, article: &Article) -> Result<bool> {
            self.inner.update_by_link(article).await
        }
        async fn delete_older_than(&self, threshold: DateTime<Utc>) -> Result<u64> {
            self.inner.delete_older_than(threshold).await
        }
        async fn delete_all(&self) -> Result<u64> {
            self.inner.delete_all().await
        }
        async fn count(&self) -> Result<u64> {
            self.inner.count().await
        }
        async fn list_recent(&self, limit: u32) -> Result<Vec<Article>> {
            self.inner.list_recent(limit).await
        }
    }

    #[tokio::test]
    async fn test_batch_skips_failed_article() {
        let store = FlakyStore {
            inner: MemoryStore::new(),
            broken_link: "http://x/2",
            down: false,
        };
        let batch = vec![
            article("http://x/1", "Vote"),
            article("http://x/2", "Vote"),
            article("http://x/3", "Vote"),
        ];

        let result = upsert_batch(&store, &batch).await.unwrap();
        let links: Vec<_> = result.inserted.iter().map(|a| a.link.as_str()).collect();
        assert_eq!(links, vec!["http://x/1", "http://x/3"]);
        assert_eq!(result.failed, 1);
        assert_eq!(result.updated, 0);
    }

    #[tokio::test]
    async fn test_batch_fails_when_store_is_down() {
        let store = FlakyStore {
            inner: MemoryStore::new(),
            broken_link: "",
            down: true,
        };
        let err = upsert_batch(&store, &[article("http://x/1", "Vote")]).await.unwrap_err();
        assert!(err.is_store_unavailable());
    }
}
