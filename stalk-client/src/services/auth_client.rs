//! Login and logout against the backend, feeding the shared auth context.

use crate::models::AuthUser;
use crate::services::api_client::ApiClient;
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use stalk_core::AppError;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: Secret<String>,
}

#[derive(Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser, AppError> {
        let response: LoginResponse = self
            .api
            .post("/api/auth/login", &LoginRequest { email, password })
            .await?;

        self.api.auth().sign_in(response.access_token).await
    }

    /// Tell the backend we are leaving, then clear the local context.
    ///
    /// The context is cleared even when the backend call fails.
    pub async fn logout(&self) {
        if self.api.auth().is_authenticated().await {
            if let Err(e) = self
                .api
                .post_no_content("/api/auth/logout", &serde_json::json!({}))
                .await
            {
                tracing::warn!(error = %e, "Logout request failed; clearing local session anyway");
            }
        }
        self.api.auth().sign_out().await;
    }
}
