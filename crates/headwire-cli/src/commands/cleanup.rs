use anyhow::Result;

use headwire_core::{
    ipc::{is_daemon_running, DaemonClient},
    scheduler::{clear_all_headlines, purge_expired},
    storage::{ArticleRepository, Database},
    AppConfig,
};

pub async fn run(config: &AppConfig, all: bool) -> Result<()> {
    if all {
        println!("Deleting all headlines...");
    } else {
        println!(
            "Cleaning up headlines older than {} days...",
            config.general.retention_days
        );
    }

    let deleted = delete(config, all).await?;

    if deleted > 0 {
        println!("Deleted {} headlines.", deleted);
    } else {
        println!("No headlines to clean up.");
    }

    Ok(())
}

/// Go through the daemon when it is up so its cached listing is dropped too
async fn delete(config: &AppConfig, all: bool) -> Result<u64> {
    let socket_path = config.socket_path();
    if is_daemon_running(&socket_path).await {
        let client = DaemonClient::new(socket_path);
        let deleted = if all { client.clear().await? } else { client.purge().await? };
        return Ok(deleted);
    }

    let db = Database::new(config)?;
    let repo = ArticleRepository::new(db.clone());
    let deleted = if all {
        clear_all_headlines(&repo).await?
    } else {
        purge_expired(&repo, config).await?
    };
    db.close().await;
    Ok(deleted)
}
