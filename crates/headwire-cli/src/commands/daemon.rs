use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use headwire_core::{
    ipc::DaemonClient,
    scheduler::{build_ingestor, SchedulerEvent, SchedulerService},
    storage::{ArticleRepository, ArticleStore, Database, RecentCache},
    AppConfig, DaemonServer,
};

fn pid_file_path() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("headwire")
        .join("daemon.pid")
}

/// PID of the running daemon, removing a stale PID file
fn running_pid() -> Option<u32> {
    let pid_path = pid_file_path();
    if !pid_path.exists() {
        return None;
    }

    let mut file = fs::File::open(&pid_path).ok()?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).ok()?;
    let pid: u32 = contents.trim().parse().ok()?;

    #[cfg(unix)]
    {
        use std::process::Command;
        let output = Command::new("kill")
            .arg("-0")
            .arg(pid.to_string())
            .output()
            .ok()?;
        if output.status.success() {
            return Some(pid);
        }
    }

    let _ = fs::remove_file(&pid_path);
    None
}

fn write_pid_file() -> Result<()> {
    let pid_path = pid_file_path();
    if let Some(parent) = pid_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(&pid_path)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(())
}

fn remove_pid_file() {
    let _ = fs::remove_file(pid_file_path());
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
}

async fn log_events(mut events: mpsc::UnboundedReceiver<SchedulerEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            SchedulerEvent::HeadlinesFetched { new_headlines, sources } if new_headlines > 0 => {
                info!("{} new headlines from {}", new_headlines, sources.join(", "));
            }
            SchedulerEvent::HeadlinesFetched { .. } => {}
            SchedulerEvent::HeadlinesPurged { deleted } if deleted > 0 => {
                info!("Purged {} expired headlines", deleted);
            }
            SchedulerEvent::HeadlinesPurged { .. } => {}
            // The scheduler has already logged the failure itself
            SchedulerEvent::Error { task, .. } => debug!("Scheduled {} will retry next tick", task),
        }
    }
}

pub async fn start(db: Database, config: Arc<AppConfig>) -> Result<()> {
    if let Some(pid) = running_pid() {
        println!("Daemon is already running (PID: {})", pid);
        return Ok(());
    }

    println!("Starting headwire daemon...");
    write_pid_file()?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    let store: Arc<dyn ArticleStore> = Arc::new(ArticleRepository::new(db.clone()));
    let ingestor = Arc::new(build_ingestor(store.clone(), config.clone())?);
    let cache = Arc::new(RecentCache::new(Duration::from_secs(config.display.cache_ttl_secs)));

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    tokio::spawn(log_events(event_rx));

    let scheduler = SchedulerService::new(ingestor.clone(), store.clone(), config.clone())
        .with_cache(cache.clone())
        .with_event_sender(event_tx);
    let server = DaemonServer::new(store, ingestor, cache, config.clone());

    println!(
        "Daemon started (PID: {}). Press Ctrl+C or run 'headwire daemon stop' to stop.",
        std::process::id()
    );
    println!("  Feeds: {}", config.feeds.len());
    println!("  Refresh interval: {} seconds", config.sync.refresh_interval_secs);
    println!("  Cleanup interval: {} seconds", config.sync.cleanup_interval_secs);
    println!("  Socket: {}", config.socket_path().display());

    let (_, served) = tokio::join!(scheduler.run(shutdown_rx.clone()), server.run(shutdown_rx));
    if let Err(e) = served {
        error!("IPC server failed: {}", e);
    }

    db.close().await;
    remove_pid_file();
    println!("Daemon stopped.");

    Ok(())
}

pub async fn stop() -> Result<()> {
    match running_pid() {
        Some(pid) => {
            println!("Stopping daemon (PID: {})...", pid);

            #[cfg(unix)]
            {
                use std::process::Command;
                let output = Command::new("kill")
                    .arg("-TERM")
                    .arg(pid.to_string())
                    .output()?;

                if output.status.success() {
                    tokio::time::sleep(Duration::from_secs(2)).await;

                    if running_pid().is_none() {
                        println!("Daemon stopped successfully.");
                    } else {
                        let _ = Command::new("kill").arg("-9").arg(pid.to_string()).output();
                        remove_pid_file();
                        println!("Daemon forcefully terminated.");
                    }
                } else {
                    println!("Failed to stop daemon. You may need to kill it manually: kill {}", pid);
                }
            }

            #[cfg(not(unix))]
            {
                println!("Please stop the daemon manually (PID: {})", pid);
            }
        }
        None => {
            println!("Daemon is not running.");
        }
    }

    Ok(())
}

pub async fn status(config: &AppConfig) -> Result<()> {
    match running_pid() {
        Some(pid) => {
            println!("Daemon is running (PID: {})", pid);
            println!("PID file: {}", pid_file_path().display());

            let client = DaemonClient::new(config.socket_path());
            match client.status().await {
                Ok(status) => {
                    println!("  Uptime: {} seconds", status.uptime_secs);
                    println!("  Headlines stored: {}", status.headline_count);
                    println!("  Feeds: {}", status.feed_count);
                    println!(
                        "  Scheduler: {}",
                        if status.scheduler_running { "running" } else { "disabled" }
                    );
                }
                Err(e) => println!("  Socket not answering: {}", e),
            }
        }
        None => {
            println!("Daemon is not running.");
        }
    }

    Ok(())
}
