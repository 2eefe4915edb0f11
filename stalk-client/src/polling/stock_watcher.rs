use crate::models::StockQuote;
use crate::polling::PollingTask;
use crate::services::StockClient;
use stalk_core::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Keeps the latest quote for one stock code fresh.
///
/// A failed fetch is logged and the previous quote stays published.
pub struct StockWatcher {
    code: String,
    latest: watch::Receiver<Option<StockQuote>>,
    task: PollingTask,
}

impl StockWatcher {
    pub fn start(
        client: StockClient,
        code: impl Into<String>,
        interval: Duration,
    ) -> Result<Self, AppError> {
        let code = code.into();
        let (publisher, latest) = watch::channel(None);
        let publisher = Arc::new(publisher);
        let watched = code.clone();

        let task = PollingTask::spawn("stock_quote", interval, move || {
            let client = client.clone();
            let publisher = publisher.clone();
            let code = watched.clone();
            async move {
                match client.quote(&code).await {
                    Ok(quote) => {
                        publisher.send_replace(Some(quote));
                    }
                    Err(e) => {
                        tracing::warn!(code = %code, error = %e, "Stock quote refresh failed");
                    }
                }
            }
        })?;

        Ok(Self { code, latest, task })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn latest(&self) -> Option<StockQuote> {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<StockQuote>> {
        self.latest.clone()
    }

    pub async fn stop(self) {
        self.task.shutdown().await;
    }
}
