use crate::models::StockQuote;
use crate::services::api_client::ApiClient;
use stalk_core::AppError;

#[derive(Clone)]
pub struct StockClient {
    api: ApiClient,
}

impl StockClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn quote(&self, code: &str) -> Result<StockQuote, AppError> {
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::InvalidInput(format!("Invalid stock code '{}'", code)));
        }
        self.api.get(&format!("/api/stocks/{}", code)).await
    }
}
