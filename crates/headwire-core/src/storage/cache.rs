use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::store::ArticleStore;
use crate::feed::Article;
use crate::Result;

struct Entry {
    limit: u32,
    loaded_at: Instant,
    articles: Vec<Article>,
}

/// Short-lived cache in front of `list_recent`.
///
/// Listing is served from memory while the cached page is younger than the
/// TTL and was loaded with the same limit. Writers call `invalidate` after
/// changing the store.
pub struct RecentCache {
    ttl: Duration,
    entry: Mutex<Option<Entry>>,
}

impl RecentCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub async fn list_recent(&self, store: &dyn ArticleStore, limit: u32) -> Result<Vec<Article>> {
        let mut entry = self.entry.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.limit == limit && cached.loaded_at.elapsed() < self.ttl {
                tracing::trace!(limit, "Serving headlines from cache");
                return Ok(cached.articles.clone());
            }
        }

        let articles = store.list_recent(limit).await?;
        *entry = Some(Entry {
            limit,
            loaded_at: Instant::now(),
            articles: articles.clone(),
        });
        Ok(articles)
    }

    pub async fn invalidate(&self) {
        *self.entry.lock().await = None;
    }
}
