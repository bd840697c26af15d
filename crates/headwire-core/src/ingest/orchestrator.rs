use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::deadline::Deadline;
use super::retention::{purge_older_than, retention_threshold};
use super::upsert::upsert_batch;
use crate::config::AppConfig;
use crate::feed::{collect_candidates, select_priority_feeds, Article, FeedClient, FeedSource, WindowBounds};
use crate::storage::ArticleStore;
use crate::{Error, Result};

/// Notifications emitted while a cycle runs
#[derive(Debug, Clone)]
pub enum IngestEvent {
    /// A headline was stored for the first time
    HeadlineAdded(Article),
    /// A feed contributed nothing because its fetch failed
    FeedFailed { feed: String, reason: String },
}

/// What one ingestion cycle newly stored
#[derive(Debug, Clone, Default)]
pub struct CycleSummary {
    pub inserted_count: usize,
    /// Sources with at least one newly inserted headline
    pub sources: BTreeSet<String>,
    pub inserted_articles: Vec<Article>,
}

impl CycleSummary {
    fn record(&mut self, article: Article) {
        self.inserted_count += 1;
        self.sources.insert(article.source.clone());
        self.inserted_articles.push(article);
    }
}

/// Runs sweep, fetch, filter and upsert as one deadline-bound cycle
pub struct Ingestor {
    store: Arc<dyn ArticleStore>,
    client: Arc<dyn FeedClient>,
    config: Arc<AppConfig>,
    event_tx: Option<mpsc::UnboundedSender<IngestEvent>>,
}

impl Ingestor {
    pub fn new(store: Arc<dyn ArticleStore>, client: Arc<dyn FeedClient>, config: Arc<AppConfig>) -> Self {
        Self {
            store,
            client,
            config,
            event_tx: None,
        }
    }

    pub fn with_event_sender(mut self, tx: mpsc::UnboundedSender<IngestEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    fn send_event(&self, event: IngestEvent) {
        if let Some(ref tx) = self.event_tx {
            if tx.send(event).is_err() {
                debug!("Ingest event receiver dropped");
            }
        }
    }

    /// Feeds polled this cycle: all of them, or the priority subset when the
    /// budget is tight
    pub fn selected_feeds(&self) -> Vec<FeedSource> {
        let sync = &self.config.sync;
        if sync.tight_budget {
            select_priority_feeds(&self.config.feeds, sync.priority_max_frequency_mins, sync.priority_max_feeds)
        } else {
            self.config.feeds.clone()
        }
    }

    pub async fn run_cycle(&self) -> Result<CycleSummary> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle with `now` as the reference instant for the retention
    /// threshold, the acceptance window and each article's fetch time
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<CycleSummary> {
        let deadline = Deadline::start(self.config.sync.cycle_deadline());

        deadline.guard(self.sweep(now)).await??;

        let feeds = self.selected_feeds();
        let window = self.config.sync.acceptance_window.bounds(now);
        debug!(
            "Fetching {} feeds, accepting {} through {}",
            feeds.len(),
            window.start,
            window.end
        );

        // Each feed gets what is left of the cycle minus room for the upserts,
        // so one unresponsive feed cannot take its siblings down with it
        let fetch_budget = deadline.remaining().saturating_sub(self.config.sync.upsert_reserve());
        let candidates = deadline
            .guard(self.gather(&feeds, &window, now, fetch_budget))
            .await?;
        if candidates.is_empty() {
            info!("No candidate headlines from {} feeds", feeds.len());
            return Ok(CycleSummary::default());
        }

        let batch_size = self.config.sync.upsert_batch_size.max(1);
        let mut summary = CycleSummary::default();
        let mut updated = 0;
        let mut failed = 0;

        for batch in candidates.chunks(batch_size) {
            let result = deadline.guard(upsert_batch(self.store.as_ref(), batch)).await??;
            updated += result.updated;
            failed += result.failed;
            for article in result.inserted {
                self.send_event(IngestEvent::HeadlineAdded(article.clone()));
                summary.record(article);
            }
        }

        info!(
            "Cycle complete: {} candidates, {} new from {:?}, {} updated, {} failed",
            candidates.len(),
            summary.inserted_count,
            summary.sources,
            updated,
            failed
        );

        Ok(summary)
    }

    async fn sweep(&self, now: DateTime<Utc>) -> Result<()> {
        let threshold = retention_threshold(now, self.config.general.retention_days);
        match purge_older_than(self.store.as_ref(), threshold).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_store_unavailable() => Err(e),
            Err(e) => {
                warn!("Retention sweep failed, continuing: {}", e);
                Ok(())
            }
        }
    }

    /// Fetch every feed concurrently and merge their candidates in feed order
    async fn gather(
        &self,
        feeds: &[FeedSource],
        window: &WindowBounds,
        now: DateTime<Utc>,
        budget: Duration,
    ) -> Vec<Article> {
        let fetches = feeds
            .iter()
            .map(|feed| self.fetch_candidates(feed, window, now, budget));
        join_all(fetches).await.into_iter().flatten().collect()
    }

    async fn fetch_candidates(
        &self,
        feed: &FeedSource,
        window: &WindowBounds,
        now: DateTime<Utc>,
        budget: Duration,
    ) -> Vec<Article> {
        let fetched = match tokio::time::timeout(budget, self.client.fetch_entries(feed)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Fetch {
                feed: feed.name.clone(),
                reason: format!("no response within {}ms", budget.as_millis()),
            }),
        };

        match fetched {
            Ok(entries) => {
                let total = entries.len();
                let candidates = collect_candidates(entries, &feed.name, window, now);
                debug!("{}: {} of {} entries are candidates", feed.name, candidates.len(), total);
                candidates
            }
            Err(e) => {
                warn!("Skipping feed {}: {}", feed.name, e);
                self.send_event(IngestEvent::FeedFailed {
                    feed: feed.name.clone(),
                    reason: e.to_string(),
                });
                Vec::new()
            }
        }
    }
}
