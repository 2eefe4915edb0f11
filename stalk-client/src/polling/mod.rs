//! Scheduled background refresh with explicit teardown.

mod stock_watcher;

pub use stock_watcher::StockWatcher;

use stalk_core::AppError;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Runs `tick` immediately and then once per interval until cancelled.
///
/// Dropping the task cancels it. Ticks that fall behind are skipped rather
/// than replayed in a burst.
pub struct PollingTask {
    name: &'static str,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PollingTask {
    /// Fails with `InvalidInput` for a zero interval.
    pub fn spawn<F, Fut>(
        name: &'static str,
        interval: Duration,
        mut tick: F,
    ) -> Result<Self, AppError>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if interval.is_zero() {
            return Err(AppError::InvalidInput(format!(
                "Polling interval for '{}' must be non-zero",
                name
            )));
        }

        let cancel = CancellationToken::new();
        let shutdown = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::debug!(task = name, interval_ms = interval.as_millis() as u64, "Polling started");
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        tokio::select! {
                            biased;
                            _ = shutdown.cancelled() => break,
                            _ = tick() => {}
                        }
                    }
                }
            }
            tracing::debug!(task = name, "Polling stopped");
        });

        Ok(Self {
            name,
            cancel,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel and wait for the loop to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(task = self.name, error = %e, "Polling task ended abnormally");
            }
        }
    }
}

impl Drop for PollingTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
