//! Retry for transient SQLite contention.
//!
//! Concurrent upserts from one cycle share the pool with the daemon's
//! listing requests, so writers can briefly see SQLITE_BUSY while another
//! connection holds the WAL write lock.

use std::future::Future;
use std::time::Duration;

/// Maximum number of retry attempts for database operations
pub const MAX_RETRIES: u32 = 5;

/// Check if a SQLite error is transient and should be retried
///
/// - SQLITE_BUSY (5) and SQLITE_BUSY_SNAPSHOT (1032)
/// - SQLITE_LOCKED (6)
/// - SQLITE_IOERR (10) and its read/write/fsync/lock extended codes
pub fn is_transient_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.to_string());
            matches!(
                code.as_deref(),
                Some("5")
                    | Some("6")
                    | Some("10")
                    | Some("266")
                    | Some("522")
                    | Some("1032")
                    | Some("2314")
                    | Some("3338")
                    | Some("5386")
            )
        }
        _ => false,
    }
}

/// Base delay 50ms, doubling each attempt
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(50 * 2u64.pow(attempt.saturating_sub(1)))
}

/// Run a store operation, retrying transient errors with exponential backoff
pub async fn with_retry<F, Fut, T>(operation: F) -> std::result::Result<T, sqlx::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    let mut attempts = 0;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if is_transient_error(&e) && attempts < MAX_RETRIES => {
                attempts += 1;
                let delay = backoff_delay(attempts);
                tracing::debug!(
                    error = %e,
                    attempt = attempts,
                    max_retries = MAX_RETRIES,
                    delay_ms = delay.as_millis(),
                    "Database transient error, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
