use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::feed::{AcceptanceWindow, FeedSource};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedSource>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            sync: SyncConfig::default(),
            display: DisplayConfig::default(),
            feeds: default_feeds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Headlines published before now minus this many days are purged
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            retention_days: default_retention_days(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Per-request timeout for a single feed fetch
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Attempts per feed before giving up (1 = no retry)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff before retry n is `retry_base_delay_ms * 2^n`
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,
    /// Wall-clock budget for one whole ingestion cycle
    #[serde(default = "default_cycle_deadline")]
    pub cycle_deadline_secs: u64,
    /// Part of the cycle budget held back from fetching for the upserts
    #[serde(default = "default_upsert_reserve")]
    pub upsert_reserve_ms: u64,
    /// Upserts issued concurrently per batch
    #[serde(default = "default_batch_size")]
    pub upsert_batch_size: usize,
    /// Which publish times count as current
    #[serde(default)]
    pub acceptance_window: AcceptanceWindow,
    /// Only poll the priority subset, single attempt per feed
    #[serde(default)]
    pub tight_budget: bool,
    /// Cap on the priority subset size
    #[serde(default = "default_priority_max_feeds")]
    pub priority_max_feeds: usize,
    /// Feeds polled at most this many minutes apart qualify as priority
    #[serde(default = "default_priority_max_frequency")]
    pub priority_max_frequency_mins: u32,
    /// Daemon ingestion interval in seconds (0 = disabled)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Daemon retention sweep interval in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
    /// HTTP proxy URL for feed fetching (e.g., "http://127.0.0.1:7890" or "socks5://127.0.0.1:1080")
    #[serde(default)]
    pub proxy_url: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay(),
            cycle_deadline_secs: default_cycle_deadline(),
            upsert_reserve_ms: default_upsert_reserve(),
            upsert_batch_size: default_batch_size(),
            acceptance_window: AcceptanceWindow::default(),
            tight_budget: false,
            priority_max_feeds: default_priority_max_feeds(),
            priority_max_frequency_mins: default_priority_max_frequency(),
            refresh_interval_secs: default_refresh_interval(),
            cleanup_interval_secs: default_cleanup_interval(),
            proxy_url: None,
        }
    }
}

impl SyncConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cycle_deadline(&self) -> Duration {
        Duration::from_secs(self.cycle_deadline_secs)
    }

    /// Held back from the fan-out, never more than half the cycle budget
    pub fn upsert_reserve(&self) -> Duration {
        Duration::from_millis(self.upsert_reserve_ms).min(self.cycle_deadline() / 2)
    }

    /// Attempts per feed, collapsed to one under a tight budget
    pub fn effective_attempts(&self) -> u32 {
        if self.tight_budget {
            1
        } else {
            self.max_attempts.max(1)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Fixed offset used when rendering timestamps for readers
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
    /// Suffix appended to rendered timestamps
    #[serde(default = "default_zone_label")]
    pub zone_label: String,
    /// Maximum headlines returned by a listing
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,
    /// Headlines published within this many minutes are flagged new
    #[serde(default = "default_new_within")]
    pub new_within_mins: i64,
    /// How long a listing is served from memory
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset(),
            zone_label: default_zone_label(),
            list_limit: default_list_limit(),
            new_within_mins: default_new_within(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("headwire")
}

fn default_retention_days() -> u32 {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay() -> u64 {
    1000
}

fn default_cycle_deadline() -> u64 {
    9 // leaves headroom under a 10 second function limit
}

fn default_upsert_reserve() -> u64 {
    2000
}

fn default_batch_size() -> usize {
    10
}

fn default_priority_max_feeds() -> usize {
    6
}

fn default_priority_max_frequency() -> u32 {
    10
}

fn default_refresh_interval() -> u64 {
    300 // 5 minutes
}

fn default_cleanup_interval() -> u64 {
    3600 // 1 hour
}

fn default_utc_offset() -> i32 {
    -6
}

fn default_zone_label() -> String {
    "CST".to_string()
}

fn default_list_limit() -> u32 {
    200
}

fn default_new_within() -> i64 {
    30
}

fn default_cache_ttl() -> u64 {
    15
}

fn feed(name: &str, url: &str, is_political: bool, update_frequency: u32) -> FeedSource {
    FeedSource {
        name: name.to_string(),
        url: url.to_string(),
        is_political,
        update_frequency,
    }
}

pub fn default_feeds() -> Vec<FeedSource> {
    vec![
        feed("CNN", "http://rss.cnn.com/rss/cnn_allpolitics.rss", true, 5),
        feed("Fox News", "http://feeds.foxnews.com/foxnews/politics", true, 5),
        feed("NY Times", "https://rss.nytimes.com/services/xml/rss/nyt/Politics.xml", true, 10),
        feed("Washington Post", "https://feeds.washingtonpost.com/rss/politics", true, 10),
        feed("NPR", "https://feeds.npr.org/1014/rss.xml", true, 15),
        feed("CBS News", "https://www.cbsnews.com/latest/rss/politics", true, 10),
        feed("NBC News", "https://feeds.nbcnews.com/nbcnews/public/politics", true, 10),
        feed("Bloomberg", "https://feeds.bloomberg.com/politics/news.rss", true, 15),
        feed(
            "AP News",
            "https://news.google.com/rss/search?q=when:24h+allinurl:bloomberg.com&hl=en-US&gl=US&ceid=US:en",
            true,
            15,
        ),
        feed("Politico", "https://rss.politico.com/politics-news.xml", true, 5),
        feed("ABC News", "https://abcnews.go.com/abcnews/politicsheadlines", true, 10),
        feed("MSNBC", "https://www.msnbc.com/feeds/latest", false, 10),
        feed("The Hill", "https://thehill.com/feed/rss", true, 5),
        feed("Axios", "https://api.axios.com/feed/", true, 15),
        feed("Time", "https://time.com/feed/", false, 30),
        feed("Newsweek", "https://www.newsweek.com/rss", false, 30),
        feed("National Review", "https://www.nationalreview.com/feed/", true, 30),
        feed("The Atlantic", "https://www.theatlantic.com/feed/channel/politics/", true, 60),
        feed("PBS NewsHour", "https://www.pbs.org/newshour/feeds/rss/politics", true, 30),
        feed("Vox", "https://www.vox.com/rss/politics", true, 30),
        feed("Slate", "https://slate.com/feeds/news-and-politics.rss", true, 30),
        feed("ProPublica", "https://www.propublica.org/feeds/propublica/main", true, 60),
        feed("Chicago Tribune", "https://www.chicagotribune.com/rss2.0.xml", false, 30),
        feed("Los Angeles Times", "https://www.latimes.com/california/rss2.0.xml", false, 30),
        feed("New York Post", "https://nypost.com/feed/", false, 15),
    ]
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> crate::Result<()> {
        if self.sync.upsert_batch_size == 0 {
            return Err(crate::Error::Config(
                "sync.upsert_batch_size must be at least 1".to_string(),
            ));
        }
        if self.sync.cycle_deadline_secs == 0 {
            return Err(crate::Error::Config(
                "sync.cycle_deadline_secs must be at least 1".to_string(),
            ));
        }
        if let Some(feed) = self.feeds.iter().find(|f| f.name.trim().is_empty()) {
            return Err(crate::Error::Config(format!(
                "feed with url {} has an empty name",
                feed.url
            )));
        }
        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/headwire/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("headwire")
            .join("config.toml")
    }

    /// Get the database file path
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join("headwire.db")
    }

    /// Get the Unix socket path for IPC
    pub fn socket_path(&self) -> PathBuf {
        self.data_dir().join("headwire.sock")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.general.retention_days, 7);
        assert_eq!(config.sync.cycle_deadline(), Duration::from_secs(9));
        assert_eq!(config.sync.upsert_batch_size, 10);
        assert_eq!(config.sync.upsert_reserve(), Duration::from_secs(2));
        assert_eq!(config.sync.acceptance_window, AcceptanceWindow::CalendarDay);
        assert_eq!(config.feeds.len(), 25);
    }

    #[test]
    fn test_partial_sync_section() {
        let config = AppConfig::from_toml(
            r#"
            [sync]
            tight_budget = true
            acceptance_window = "rolling_24h"
            "#,
        )
        .unwrap();
        assert!(config.sync.tight_budget);
        assert_eq!(config.sync.effective_attempts(), 1);
        assert_eq!(config.sync.acceptance_window, AcceptanceWindow::Rolling24h);
        assert_eq!(config.sync.request_timeout_secs, 5);
    }

    #[test]
    fn test_custom_feed_list_replaces_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [[feeds]]
            name = "Example"
            url = "https://example.com/rss"
            is_political = true
            update_frequency = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.feeds.len(), 1);
        assert_eq!(config.feeds[0].name, "Example");
    }

    #[test]
    fn test_upsert_reserve_capped_at_half_the_deadline() {
        let config = AppConfig::from_toml("[sync]\ncycle_deadline_secs = 2\nupsert_reserve_ms = 5000").unwrap();
        assert_eq!(config.sync.upsert_reserve(), Duration::from_secs(1));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = AppConfig::from_toml("[sync]\nupsert_batch_size = 0").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_database_path_under_data_dir() {
        let mut config = AppConfig::default();
        config.general.data_dir = PathBuf::from("/var/lib/headwire");
        assert_eq!(config.database_path(), PathBuf::from("/var/lib/headwire/headwire.db"));
    }
}
