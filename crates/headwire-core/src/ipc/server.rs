//! Unix socket server run by the daemon.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{watch, Semaphore};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::protocol::*;
use crate::config::AppConfig;
use crate::feed::HeadlineView;
use crate::ingest::Ingestor;
use crate::scheduler::tasks;
use crate::storage::{ArticleStore, RecentCache};
use crate::Result;

/// Bounds concurrent request handling so the store pool is not exhausted
const MAX_CONCURRENT_REQUESTS: usize = 10;

/// Shared state behind every connection
pub(crate) struct DaemonState {
    pub(crate) store: Arc<dyn ArticleStore>,
    pub(crate) ingestor: Arc<Ingestor>,
    pub(crate) cache: Arc<RecentCache>,
    pub(crate) config: Arc<AppConfig>,
    pub(crate) start_time: Instant,
}

pub struct DaemonServer {
    state: Arc<DaemonState>,
    socket_path: PathBuf,
    request_semaphore: Arc<Semaphore>,
}

impl DaemonServer {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        ingestor: Arc<Ingestor>,
        cache: Arc<RecentCache>,
        config: Arc<AppConfig>,
    ) -> Self {
        let socket_path = config.socket_path();
        Self {
            state: Arc::new(DaemonState {
                store,
                ingestor,
                cache,
                config,
                start_time: Instant::now(),
            }),
            socket_path,
            request_semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_REQUESTS)),
        }
    }

    /// Listen on this path instead of the configured one
    pub fn with_socket_path(mut self, socket_path: PathBuf) -> Self {
        self.socket_path = socket_path;
        self
    }

    /// Serve connections until the shutdown signal
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }

        if let Some(parent) = self.socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("IPC server listening on: {}", self.socket_path.display());

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, _)) => {
                            let state = self.state.clone();
                            let semaphore = self.request_semaphore.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, state, semaphore).await {
                                    warn!("Error handling connection: {}", e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                        }
                    }
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        info!("IPC server shutting down");
                        break;
                    }
                }
            }
        }

        let _ = std::fs::remove_file(&self.socket_path);
        Ok(())
    }
}

async fn handle_connection(
    stream: UnixStream,
    state: Arc<DaemonState>,
    semaphore: Arc<Semaphore>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break;
        }

        let _permit = semaphore
            .acquire()
            .await
            .map_err(|e| crate::Error::Other(format!("Failed to acquire semaphore: {}", e)))?;

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => {
                debug!("Received request: {} (id: {})", request.method, request.id);
                handle_request(request, &state).await
            }
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                Response::error(Uuid::nil(), ERR_PARSE, format!("Parse error: {}", e))
            }
        };

        let response_json = serde_json::to_string(&response)?;
        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}

pub(crate) async fn handle_request(request: Request, state: &DaemonState) -> Response {
    let id = request.id;
    let store = state.store.as_ref();

    match request.method.as_str() {
        "" => Response::error(id, ERR_INVALID_REQUEST, "Missing method"),

        methods::PING => Response::success(id, serde_json::json!({"ok": true})),

        methods::STATUS => match store.count().await {
            Ok(headline_count) => {
                let status = StatusResponse {
                    running: true,
                    uptime_secs: state.start_time.elapsed().as_secs(),
                    scheduler_running: state.config.sync.refresh_interval_secs > 0,
                    headline_count,
                    feed_count: state.config.feeds.len(),
                };
                to_response(id, &status)
            }
            Err(e) => Response::from_error(id, &e),
        },

        methods::HEADLINES_LIST => {
            let params = if request.params.is_null() {
                Ok(HeadlineListParams::default())
            } else {
                serde_json::from_value::<HeadlineListParams>(request.params)
            };

            match params {
                Ok(params) => {
                    let limit = params.limit.unwrap_or(state.config.display.list_limit);
                    match state.cache.list_recent(store, limit).await {
                        Ok(articles) => {
                            let now = Utc::now();
                            let headlines = articles
                                .iter()
                                .map(|a| HeadlineView::from_article(a, &state.config.display, now))
                                .collect();
                            to_response(id, &HeadlineListResponse { headlines })
                        }
                        Err(e) => Response::from_error(id, &e),
                    }
                }
                Err(e) => Response::error(id, ERR_INVALID_PARAMS, e.to_string()),
            }
        }

        methods::HEADLINES_FETCH => match tasks::run_ingestion_cycle(&state.ingestor).await {
            Ok(summary) => {
                // Updates and the retention sweep change listings even without inserts
                state.cache.invalidate().await;
                to_response(id, &FetchResponse::from(&summary))
            }
            Err(e) => {
                error!("Ingestion cycle failed: {}", e);
                Response::from_error(id, &e)
            }
        },

        methods::HEADLINES_PURGE => match tasks::purge_expired(store, &state.config).await {
            Ok(deleted_count) => {
                state.cache.invalidate().await;
                to_response(id, &DeleteResponse { deleted_count })
            }
            Err(e) => Response::from_error(id, &e),
        },

        methods::HEADLINES_CLEAR => match tasks::clear_all_headlines(store).await {
            Ok(deleted_count) => {
                state.cache.invalidate().await;
                to_response(id, &DeleteResponse { deleted_count })
            }
            Err(e) => Response::from_error(id, &e),
        },

        _ => Response::error(id, ERR_METHOD_NOT_FOUND, "Method not found"),
    }
}

fn to_response<T: serde::Serialize>(id: Uuid, value: &T) -> Response {
    match serde_json::to_value(value) {
        Ok(result) => Response::success(id, result),
        Err(e) => Response::error(id, ERR_INTERNAL, e.to_string()),
    }
}
