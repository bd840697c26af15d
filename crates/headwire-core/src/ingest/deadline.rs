use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::{Error, Result};

/// Requests cancellation of every `CancelToken` cloned from its pair
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes a cancellation request
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> (CancelHandle, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelToken { rx })
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. Never resolves if the handle
    /// is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Wall-clock budget for one ingestion cycle.
///
/// A timer task cancels the token when the budget runs out. Every awaited
/// step of the cycle goes through `guard`, which abandons the step and
/// returns `Error::CycleTimeout` as soon as the token fires.
pub struct Deadline {
    limit: Duration,
    started: Instant,
    token: CancelToken,
    timer: JoinHandle<()>,
}

impl Deadline {
    pub fn start(limit: Duration) -> Self {
        let (handle, token) = CancelToken::new();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            handle.cancel();
        });

        Self {
            limit,
            started: Instant::now(),
            token,
            timer,
        }
    }

    /// Budget left before the token fires
    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.started.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run `step` unless the deadline fires first
    pub async fn guard<F, T>(&self, step: F) -> Result<T>
    where
        F: Future<Output = T>,
    {
        if self.is_expired() {
            return Err(Error::CycleTimeout(self.limit));
        }

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Error::CycleTimeout(self.limit)),
            output = step => Ok(output),
        }
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_step_finishing_in_time_passes_through() {
        let deadline = Deadline::start(Duration::from_secs(9));
        let value = deadline
            .guard(async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                42
            })
            .await
            .unwrap();
        assert_eq!(value, 42);
        assert!(!deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_step_times_out() {
        let deadline = Deadline::start(Duration::from_secs(9));
        let err = deadline
            .guard(tokio::time::sleep(Duration::from_secs(30)))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);

        // Later steps fail fast
        let err = deadline.guard(async {}).await.unwrap_err();
        assert!(matches!(err, Error::CycleTimeout(d) if d == Duration::from_secs(9)));
    }

    #[tokio::test]
    async fn test_dropped_handle_never_cancels() {
        let (handle, token) = CancelToken::new();
        drop(handle);
        assert!(!token.is_cancelled());

        let waited = tokio::time::timeout(Duration::from_millis(20), token.cancelled()).await;
        assert!(waited.is_err());
    }
}
