use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Store connection error: {0}")]
    StoreConnection(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("Failed to fetch feed '{feed}': {reason}")]
    Fetch { feed: String, reason: String },

    #[error("Ingestion cycle timed out after {}ms", .0.as_millis())]
    CycleTimeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i32, message: String },

    #[error("{0}")]
    Other(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_)
            | sqlx::Error::WorkerCrashed => Error::StoreConnection(err.to_string()),
            other => Error::Database(other),
        }
    }
}

impl Error {
    /// The ingestion deadline elapsed before the cycle finished
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::CycleTimeout(_) | Error::Rpc { code: crate::ipc::ERR_CYCLE_TIMEOUT, .. }
        )
    }

    /// The store could not be reached at all, as opposed to a query failing
    pub fn is_store_unavailable(&self) -> bool {
        matches!(
            self,
            Error::StoreConnection(_) | Error::Rpc { code: crate::ipc::ERR_STORE_UNAVAILABLE, .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
