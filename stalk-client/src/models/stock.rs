use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest quote for a listed stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    pub code: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_rate: f64,
    pub volume: u64,
    pub as_of: DateTime<Utc>,
}

impl StockQuote {
    pub fn is_rising(&self) -> bool {
        self.change > 0.0
    }
}
