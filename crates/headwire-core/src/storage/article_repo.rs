use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::retry::with_retry;
use super::store::{ArticleStore, InsertOutcome};
use super::Database;
use crate::feed::{parse_iso, to_iso, Article};
use crate::{Error, Result};

/// SQLite-backed headline store
#[derive(Clone)]
pub struct ArticleRepository {
    db: Database,
}

#[derive(FromRow)]
struct HeadlineRow {
    headline: String,
    link: String,
    source: String,
    pub_time: String,
    fetch_time: String,
}

impl TryFrom<HeadlineRow> for Article {
    type Error = Error;

    fn try_from(row: HeadlineRow) -> Result<Self> {
        let pub_time = parse_iso(&row.pub_time)
            .ok_or_else(|| Error::Other(format!("Stored pub_time is not ISO-8601: {}", row.pub_time)))?;
        let fetch_time = parse_iso(&row.fetch_time).ok_or_else(|| {
            Error::Other(format!("Stored fetch_time is not ISO-8601: {}", row.fetch_time))
        })?;

        Ok(Article {
            headline: row.headline,
            link: row.link,
            source: row.source,
            pub_time,
            fetch_time,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

impl ArticleRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ArticleStore for ArticleRepository {
    async fn find_by_link(&self, link: &str) -> Result<Option<Article>> {
        let pool = self.db.pool().await?;

        let row: Option<HeadlineRow> = with_retry(|| async move {
            sqlx::query_as(
                r#"
                SELECT headline, link, source, pub_time, fetch_time
                FROM headlines
                WHERE link = ?
                "#,
            )
            .bind(link)
            .fetch_optional(pool)
            .await
        })
        .await?;

        row.map(Article::try_from).transpose()
    }

    async fn insert(&self, article: &Article) -> Result<InsertOutcome> {
        let pool = self.db.pool().await?;
        let pub_time = to_iso(article.pub_time);
        let fetch_time = to_iso(article.fetch_time);
        let (pub_time, fetch_time) = (pub_time.as_str(), fetch_time.as_str());

        let result = with_retry(|| async move {
            sqlx::query(
                r#"
                INSERT INTO headlines (headline, link, source, pub_time, fetch_time)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&article.headline)
            .bind(&article.link)
            .bind(&article.source)
            .bind(pub_time)
            .bind(fetch_time)
            .execute(pool)
            .await
        })
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::DuplicateKey),
            Err(err) => Err(err.into()),
        }
    }

    async fn update_by_link(&self, article: &Article) -> Result<bool> {
        let pool = self.db.pool().await?;
        let pub_time = to_iso(article.pub_time);
        let fetch_time = to_iso(article.fetch_time);
        let (pub_time, fetch_time) = (pub_time.as_str(), fetch_time.as_str());

        let result = with_retry(|| async move {
            sqlx::query(
                r#"
                UPDATE headlines
                SET headline = ?, pub_time = ?, fetch_time = ?
                WHERE link = ?
                "#,
            )
            .bind(&article.headline)
            .bind(pub_time)
            .bind(fetch_time)
            .bind(&article.link)
            .execute(pool)
            .await
        })
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_older_than(&self, threshold: DateTime<Utc>) -> Result<u64> {
        let pool = self.db.pool().await?;
        let threshold = to_iso(threshold);
        let threshold = threshold.as_str();

        let result = with_retry(|| async move {
            sqlx::query("DELETE FROM headlines WHERE pub_time < ?")
                .bind(threshold)
                .execute(pool)
                .await
        })
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_all(&self) -> Result<u64> {
        let pool = self.db.pool().await?;

        let result = with_retry(|| async move {
            sqlx::query("DELETE FROM headlines").execute(pool).await
        })
        .await?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64> {
        let pool = self.db.pool().await?;

        let count: i64 = with_retry(|| async move {
            sqlx::query_scalar("SELECT COUNT(*) FROM headlines")
                .fetch_one(pool)
                .await
        })
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Article>> {
        let pool = self.db.pool().await?;

        let rows: Vec<HeadlineRow> = with_retry(|| async move {
            sqlx::query_as(
                r#"
                SELECT headline, link, source, pub_time, fetch_time
                FROM headlines
                ORDER BY pub_time DESC
                LIMIT ?
                "#,
            )
            .bind(limit)
            .fetch_all(pool)
            .await
        })
        .await?;

        rows.into_iter().map(Article::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn article(link: &str, headline: &str, pub_time: DateTime<Utc>) -> Article {
        Article {
            headline: headline.to_string(),
            link: link.to_string(),
            source: "X".to_string(),
            pub_time,
            fetch_time: pub_time,
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn repo() -> ArticleRepository {
        ArticleRepository::new(Database::new_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let repo = repo();
        let stored = article("http://x/1", "Senate vote", base());

        assert_eq!(repo.insert(&stored).await.unwrap(), InsertOutcome::Inserted);
        assert_eq!(repo.find_by_link("http://x/1").await.unwrap(), Some(stored));
        assert_eq!(repo.find_by_link("http://x/2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_link_reported_not_raised() {
        let repo = repo();
        let first = article("http://x/1", "Senate vote", base());
        let second = article("http://x/1", "Senate vote (updated)", base());

        assert_eq!(repo.insert(&first).await.unwrap(), InsertOutcome::Inserted);
        assert_eq!(repo.insert(&second).await.unwrap(), InsertOutcome::DuplicateKey);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_overwrites_mutable_fields() {
        let repo = repo();
        repo.insert(&article("http://x/1", "Senate vote", base())).await.unwrap();

        let mut changed = article("http://x/1", "Senate vote passes", base() + Duration::hours(1));
        changed.fetch_time = base() + Duration::hours(2);
        changed.source = "Other".to_string();
        assert!(repo.update_by_link(&changed).await.unwrap());

        let stored = repo.find_by_link("http://x/1").await.unwrap().unwrap();
        assert_eq!(stored.headline, "Senate vote passes");
        assert_eq!(stored.pub_time, base() + Duration::hours(1));
        assert_eq!(stored.fetch_time, base() + Duration::hours(2));
        // Source is not part of an update
        assert_eq!(stored.source, "X");

        assert!(!repo.update_by_link(&article("http://x/9", "Nope", base())).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_older_than_is_strict() {
        let repo = repo();
        let threshold = base();
        repo.insert(&article("http://x/old", "Old vote", threshold - Duration::seconds(1))).await.unwrap();
        repo.insert(&article("http://x/edge", "Edge vote", threshold)).await.unwrap();
        repo.insert(&article("http://x/new", "New vote", threshold + Duration::days(1))).await.unwrap();

        assert_eq!(repo.delete_older_than(threshold).await.unwrap(), 1);
        assert!(repo.find_by_link("http://x/old").await.unwrap().is_none());
        assert!(repo.find_by_link("http://x/edge").await.unwrap().is_some());
        assert_eq!(repo.count().await.unwrap(), 2);

        // Nothing left to match
        assert_eq!(repo.delete_older_than(threshold).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_recent_orders_by_pub_time_desc() {
        let repo = repo();
        for (i, hours) in [3, 1, 2].iter().enumerate() {
            let link = format!("http://x/{}", i);
            repo.insert(&article(&link, "Vote", base() + Duration::hours(*hours))).await.unwrap();
        }

        let recent = repo.list_recent(2).await.unwrap();
        let times: Vec<_> = recent.iter().map(|a| a.pub_time).collect();
        assert_eq!(times, vec![base() + Duration::hours(3), base() + Duration::hours(2)]);
    }

    #[tokio::test]
    async fn test_delete_all() {
        let repo = repo();
        repo.insert(&article("http://x/1", "Vote", base())).await.unwrap();
        repo.insert(&article("http://x/2", "Vote", base())).await.unwrap();

        assert_eq!(repo.delete_all().await.unwrap(), 2);
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(repo.list_recent(10).await.unwrap().is_empty());
    }
}
