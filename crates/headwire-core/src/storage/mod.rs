mod article_repo;
mod cache;
mod database;
mod memory;
pub mod retry;
mod store;

pub use article_repo::ArticleRepository;
pub use cache::RecentCache;
pub use database::Database;
pub use memory::MemoryStore;
pub use store::{ArticleStore, InsertOutcome};
