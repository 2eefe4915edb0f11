//! Shared HTTP plumbing for the Stalk REST backend.

use crate::auth::AuthContext;
use crate::config::ApiSettings;
use reqwest::{Client, Response};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use stalk_core::observability::{TracedClientExt, TracedRequest};
use stalk_core::AppError;

/// Error body shapes the backend is known to return.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: AuthContext,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings, auth: AuthContext) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authorize(&self, request: TracedRequest) -> TracedRequest {
        match self.auth.access_token().await {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn dispatch(
        &self,
        method: &str,
        url: &str,
        request: TracedRequest,
    ) -> Result<Response, AppError> {
        let response = self.authorize(request).await.send().await.map_err(|e| {
            tracing::error!(%method, %url, error = %e, "Backend request failed");
            if e.is_timeout() {
                AppError::InternalError(anyhow::anyhow!("Request to {} timed out", url))
            } else {
                AppError::InternalError(anyhow::anyhow!("HTTP request failed: {}", e))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or(body);

        tracing::warn!(
            %method,
            %url,
            status = status.as_u16(),
            %message,
            "Backend rejected request"
        );
        Err(AppError::from_status(status.as_u16(), message))
    }

    async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, AppError> {
        response.json::<T>().await.map_err(|e| {
            tracing::error!(%url, error = %e, "Unexpected response body");
            AppError::InternalError(anyhow::anyhow!("Invalid response from {}: {}", url, e))
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = self.url(path);
        let response = self.dispatch("GET", &url, self.client.traced_get(&url)).await?;
        Self::decode(&url, response).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path);
        let request = self.client.traced_get(&url).query(query);
        let response = self.dispatch("GET", &url, request).await?;
        Self::decode(&url, response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let request = self.client.traced_post(&url).json(body);
        let response = self.dispatch("POST", &url, request).await?;
        Self::decode(&url, response).await
    }

    /// POST whose response body is irrelevant beyond its status.
    pub async fn post_no_content<B>(&self, path: &str, body: &B) -> Result<(), AppError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let request = self.client.traced_post(&url).json(body);
        self.dispatch("POST", &url, request).await?;
        Ok(())
    }
}
