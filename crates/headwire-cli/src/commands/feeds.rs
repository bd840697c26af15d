use anyhow::Result;

use headwire_core::{feed::select_priority_feeds, AppConfig};

pub fn run(config: &AppConfig) -> Result<()> {
    if config.feeds.is_empty() {
        println!("No feeds configured.");
        println!("\nAdd [[feeds]] entries to {}", AppConfig::config_path().display());
        return Ok(());
    }

    let priority = select_priority_feeds(
        &config.feeds,
        config.sync.priority_max_frequency_mins,
        config.sync.priority_max_feeds,
    );

    println!("Feeds ({}):\n", config.feeds.len());

    for feed in &config.feeds {
        let mut tags = Vec::new();
        if feed.is_political {
            tags.push("political");
        }
        if priority.iter().any(|p| p.name == feed.name) {
            tags.push("priority");
        }
        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.join(", "))
        };

        println!("  {} (every {} min){}", feed.name, feed.update_frequency, tags);
        println!("    URL: {}", feed.url);
    }

    Ok(())
}
