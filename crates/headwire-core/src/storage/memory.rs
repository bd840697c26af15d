use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::store::{ArticleStore, InsertOutcome};
use crate::feed::Article;
use crate::Result;

/// Process-local store keyed by link. Used for dry runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    articles: RwLock<HashMap<String, Article>>,
    lookup_delay: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause after every lookup, widening the gap between a lookup and the
    /// insert that follows it. Lets concurrent writers interleave.
    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }

    pub async fn snapshot(&self) -> Vec<Article> {
        let articles = self.articles.read().await;
        let mut all: Vec<Article> = articles.values().cloned().collect();
        all.sort_by(|a, b| a.link.cmp(&b.link));
        all
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn find_by_link(&self, link: &str) -> Result<Option<Article>> {
        let found = self.articles.read().await.get(link).cloned();
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(found)
    }

    async fn insert(&self, article: &Article) -> Result<InsertOutcome> {
        let mut articles = self.articles.write().await;
        if articles.contains_key(&article.link) {
            return Ok(InsertOutcome::DuplicateKey);
        }
        articles.insert(article.link.clone(), article.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn update_by_link(&self, article: &Article) -> Result<bool> {
        let mut articles = self.articles.write().await;
        match articles.get_mut(&article.link) {
            Some(existing) => {
                existing.headline = article.headline.clone();
                existing.pub_time = article.pub_time;
                existing.fetch_time = article.fetch_time;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_older_than(&self, threshold: DateTime<Utc>) -> Result<u64> {
        let mut articles = self.articles.write().await;
        let before = articles.len();
        articles.retain(|_, article| article.pub_time >= threshold);
        Ok((before - articles.len()) as u64)
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut articles = self.articles.write().await;
        let removed = articles.len() as u64;
        articles.clear();
        Ok(removed)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.articles.read().await.len() as u64)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Article>> {
        let articles = self.articles.read().await;
        let mut recent: Vec<Article> = articles.values().cloned().collect();
        recent.sort_by(|a, b| b.pub_time.cmp(&a.pub_time));
        recent.truncate(limit as usize);
        Ok(recent)
    }
}
