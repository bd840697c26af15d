use anyhow::Result;
use chrono::Utc;

use headwire_core::{
    feed::HeadlineView,
    ipc::{is_daemon_running, DaemonClient},
    storage::{ArticleRepository, ArticleStore, Database},
    AppConfig,
};

pub async fn run(config: &AppConfig, limit: Option<u32>, json: bool) -> Result<()> {
    let headlines = load(config, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&headlines)?);
        return Ok(());
    }

    if headlines.is_empty() {
        println!("No headlines yet.");
        println!("\nTo fetch headlines, run:");
        println!("  headwire fetch");
        return Ok(());
    }

    println!("Headlines ({}):\n", headlines.len());

    for view in &headlines {
        let marker = if view.is_new { " [NEW]" } else { "" };
        println!("  {}{}", view.headline, marker);
        println!("    {} | {}", view.source, view.pub_time);
        println!("    {}", view.link);
        println!();
    }

    Ok(())
}

/// Ask the daemon when it is up so its cache is used, else read the database
async fn load(config: &AppConfig, limit: Option<u32>) -> Result<Vec<HeadlineView>> {
    let socket_path = config.socket_path();
    if is_daemon_running(&socket_path).await {
        let client = DaemonClient::new(socket_path);
        return Ok(client.list_headlines(limit).await?);
    }

    let repo = ArticleRepository::new(Database::new(config)?);
    let articles = repo
        .list_recent(limit.unwrap_or(config.display.list_limit))
        .await?;
    let now = Utc::now();

    Ok(articles
        .iter()
        .map(|article| HeadlineView::from_article(article, &config.display, now))
        .collect())
}
