use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::feed::Article;
use crate::Result;

/// Result of a plain insert against the unique `link` constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Another writer already stored this link
    DuplicateKey,
}

/// Headline persistence keyed by `link`.
///
/// Implementations must be safe for concurrent use and must enforce at most
/// one stored article per link.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn find_by_link(&self, link: &str) -> Result<Option<Article>>;

    async fn insert(&self, article: &Article) -> Result<InsertOutcome>;

    /// Overwrite headline, pub_time and fetch_time of the article with this
    /// link. Returns false when no such article exists.
    async fn update_by_link(&self, article: &Article) -> Result<bool>;

    /// Delete every article published strictly before `threshold`
    async fn delete_older_than(&self, threshold: DateTime<Utc>) -> Result<u64>;

    async fn delete_all(&self) -> Result<u64>;

    async fn count(&self) -> Result<u64>;

    /// Most recently published first
    async fn list_recent(&self, limit: u32) -> Result<Vec<Article>>;
}
