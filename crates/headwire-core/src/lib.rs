pub mod config;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod ipc;
pub mod scheduler;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use ipc::{DaemonClient, DaemonServer};
