use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::ingest::{CycleSummary, Ingestor};
use crate::storage::{ArticleStore, RecentCache};
use crate::Result;

use super::tasks::{purge_expired, run_ingestion_cycle};

/// Events emitted by the scheduler after each background task
#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    /// An ingestion cycle finished
    HeadlinesFetched { new_headlines: usize, sources: Vec<String> },
    /// The retention sweep finished
    HeadlinesPurged { deleted: u64 },
    /// A background task failed
    Error { task: String, message: String },
}

/// Runs ingestion and retention on fixed intervals
pub struct SchedulerService {
    ingestor: Arc<Ingestor>,
    store: Arc<dyn ArticleStore>,
    config: Arc<AppConfig>,
    cache: Option<Arc<RecentCache>>,
    event_tx: Option<mpsc::UnboundedSender<SchedulerEvent>>,
}

impl SchedulerService {
    pub fn new(ingestor: Arc<Ingestor>, store: Arc<dyn ArticleStore>, config: Arc<AppConfig>) -> Self {
        Self {
            ingestor,
            store,
            config,
            cache: None,
            event_tx: None,
        }
    }

    /// Invalidate this cache whenever a task changes the store
    pub fn with_cache(mut self, cache: Arc<RecentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_event_sender(mut self, tx: mpsc::UnboundedSender<SchedulerEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    fn send_event(&self, event: SchedulerEvent) {
        if let Some(ref tx) = self.event_tx {
            if tx.send(event).is_err() {
                warn!("Failed to send scheduler event: receiver dropped");
            }
        }
    }

    async fn invalidate_cache(&self) {
        if let Some(ref cache) = self.cache {
            cache.invalidate().await;
        }
    }

    /// Run background tasks until the shutdown signal
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let refresh_secs = self.config.sync.refresh_interval_secs;
        let cleanup_secs = self.config.sync.cleanup_interval_secs;

        if refresh_secs == 0 {
            info!("Background scheduler disabled (refresh_interval_secs = 0)");
            let _ = shutdown.changed().await;
            return;
        }

        info!("Scheduler started: refresh={}s, cleanup={}s", refresh_secs, cleanup_secs);

        let mut refresh_interval = tokio::time::interval(Duration::from_secs(refresh_secs));
        let mut cleanup_interval = tokio::time::interval(Duration::from_secs(cleanup_secs.max(1)));

        // First ticks fire immediately
        refresh_interval.tick().await;
        cleanup_interval.tick().await;

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Scheduler received shutdown signal");
                        break;
                    }
                }

                _ = refresh_interval.tick() => {
                    debug!("Running scheduled ingestion cycle");
                    if let Err(e) = self.fetch_now().await {
                        error!("Scheduled ingestion failed: {}", e);
                        self.send_event(SchedulerEvent::Error {
                            task: "fetch".to_string(),
                            message: e.to_string(),
                        });
                    }
                }

                _ = cleanup_interval.tick() => {
                    debug!("Running scheduled retention sweep");
                    match purge_expired(self.store.as_ref(), &self.config).await {
                        Ok(deleted) => {
                            if deleted > 0 {
                                self.invalidate_cache().await;
                            }
                            self.send_event(SchedulerEvent::HeadlinesPurged { deleted });
                        }
                        Err(e) => {
                            error!("Scheduled retention sweep failed: {}", e);
                            self.send_event(SchedulerEvent::Error {
                                task: "purge".to_string(),
                                message: e.to_string(),
                            });
                        }
                    }
                }
            }
        }

        info!("Scheduler stopped");
    }

    /// Run one ingestion cycle immediately
    pub async fn fetch_now(&self) -> Result<CycleSummary> {
        let summary = run_ingestion_cycle(&self.ingestor).await?;
        // Updates and the retention sweep change listings even without inserts
        self.invalidate_cache().await;
        self.send_event(SchedulerEvent::HeadlinesFetched {
            new_headlines: summary.inserted_count,
            sources: summary.sources.iter().cloned().collect(),
        });
        Ok(summary)
    }
}
