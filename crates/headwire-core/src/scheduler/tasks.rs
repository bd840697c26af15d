use std::sync::Arc;

use chrono::Utc;

use crate::config::AppConfig;
use crate::feed::FeedFetcher;
use crate::ingest::{clear_all, purge_older_than, retention_threshold, CycleSummary, Ingestor};
use crate::storage::ArticleStore;
use crate::Result;

/// Wire an ingestor to the HTTP feed client described by `config`
pub fn build_ingestor(store: Arc<dyn ArticleStore>, config: Arc<AppConfig>) -> Result<Ingestor> {
    let fetcher = FeedFetcher::new(&config.sync)?;
    Ok(Ingestor::new(store, Arc::new(fetcher), config))
}

/// Run one ingestion cycle and log what it stored
pub async fn run_ingestion_cycle(ingestor: &Ingestor) -> Result<CycleSummary> {
    let summary = ingestor.run_cycle().await?;

    for article in &summary.inserted_articles {
        tracing::debug!("New headline from {}: {}", article.source, article.headline);
    }
    if summary.inserted_count > 0 {
        tracing::info!(
            "Ingested {} new headlines from {} sources",
            summary.inserted_count,
            summary.sources.len()
        );
    }

    Ok(summary)
}

/// Delete headlines older than the configured retention window
pub async fn purge_expired(store: &dyn ArticleStore, config: &AppConfig) -> Result<u64> {
    let threshold = retention_threshold(Utc::now(), config.general.retention_days);
    purge_older_than(store, threshold).await
}

/// Delete every stored headline
pub async fn clear_all_headlines(store: &dyn ArticleStore) -> Result<u64> {
    let deleted = clear_all(store).await?;
    if deleted == 0 {
        tracing::info!("No headlines to clear");
    }
    Ok(deleted)
}
