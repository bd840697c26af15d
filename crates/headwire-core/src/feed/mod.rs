mod display;
mod fetcher;
mod filter;
mod models;
mod parser;
pub mod relevance;
mod sources;
mod window;

pub use display::{format_display_time, is_new};
pub use fetcher::{FeedClient, FeedFetcher, RetryPolicy};
pub use filter::{collect_candidates, normalize_entry, Rejection};
pub use models::{parse_iso, to_iso, Article, FeedSource, HeadlineView, RawEntry};
pub use parser::{parse_feed, MISSING_LINK};
pub use relevance::is_relevant;
pub use sources::select_priority_feeds;
pub use window::{AcceptanceWindow, WindowBounds};
