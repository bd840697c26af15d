use std::sync::Arc;

use anyhow::Result;

use headwire_core::{
    scheduler::{build_ingestor, run_ingestion_cycle},
    storage::{ArticleRepository, ArticleStore, Database, MemoryStore},
    AppConfig,
};

pub async fn run(config: Arc<AppConfig>, dry_run: bool, tight: bool) -> Result<()> {
    let config = if tight {
        let mut tightened = (*config).clone();
        tightened.sync.tight_budget = true;
        Arc::new(tightened)
    } else {
        config
    };

    let store: Arc<dyn ArticleStore> = if dry_run {
        println!("Dry run: nothing will be written.");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(ArticleRepository::new(Database::new(&config)?))
    };

    let ingestor = build_ingestor(store, config.clone())?;
    println!("Fetching {} feeds...\n", ingestor.selected_feeds().len());

    let summary = run_ingestion_cycle(&ingestor).await?;

    for article in &summary.inserted_articles {
        println!("  [{}] {}", article.source, article.headline);
    }

    if summary.inserted_count > 0 {
        let sources: Vec<&str> = summary.sources.iter().map(String::as_str).collect();
        println!(
            "\nFetch complete. {} new headlines from: {}",
            summary.inserted_count,
            sources.join(", ")
        );
    } else {
        println!("Fetch complete. No new headlines.");
    }

    Ok(())
}
