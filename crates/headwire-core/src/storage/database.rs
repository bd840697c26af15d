use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::config::AppConfig;
use crate::Result;

/// Database connection pool wrapper.
///
/// The pool connects lazily and the schema is created on first use, once per
/// process. Clones share both the pool and the schema state.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
    schema: Arc<OnceCell<()>>,
}

impl Database {
    /// Prepare a lazily connected pool for the configured database file
    pub fn new(config: &AppConfig) -> Result<Self> {
        let db_path = config.database_path();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!("Using database: {}", db_path.display());

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy_with(options);

        Ok(Self::from_pool(pool))
    }

    /// Create an in-memory database for testing
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self> {
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // A single connection that never expires keeps the memory database alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_lazy_with(options);

        Ok(Self::from_pool(pool))
    }

    fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self {
            pool,
            schema: Arc::new(OnceCell::new()),
        }
    }

    /// Get the connection pool, creating the schema on first use
    pub async fn pool(&self) -> Result<&Pool<Sqlite>> {
        self.schema
            .get_or_try_init(|| self.run_migrations())
            .await?;
        Ok(&self.pool)
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn run_migrations(&self) -> Result<()> {
        tracing::info!("Preparing headline schema...");

        sqlx::query(MIGRATION_001_HEADLINES)
            .execute(&self.pool)
            .await?;

        sqlx::query(MIGRATION_INDEXES)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Headline schema ready");
        Ok(())
    }
}

const MIGRATION_001_HEADLINES: &str = r#"
CREATE TABLE IF NOT EXISTS headlines (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    headline TEXT NOT NULL,
    link TEXT NOT NULL,
    source TEXT NOT NULL,
    pub_time TEXT NOT NULL,
    fetch_time TEXT NOT NULL
)
"#;

const MIGRATION_INDEXES: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_headlines_link ON headlines(link);
CREATE INDEX IF NOT EXISTS idx_headlines_pub_time ON headlines(pub_time DESC);
CREATE INDEX IF NOT EXISTS idx_headlines_source ON headlines(source)
"#;
