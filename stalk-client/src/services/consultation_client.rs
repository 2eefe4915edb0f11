//! REST wrappers for `/api/consultations`.

use crate::models::{
    CancellationRequest, Consultation, ConsultationStatus, ReviewRequest, SessionInfo,
    SessionToken,
};
use crate::services::api_client::ApiClient;
use secrecy::ExposeSecret;
use serde::Serialize;
use stalk_core::AppError;

#[derive(Serialize)]
struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<ConsultationStatus>,
}

#[derive(Clone)]
pub struct ConsultationClient {
    api: ApiClient,
}

impl ConsultationClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Request a fresh session token.
    ///
    /// Every failure on this path, including a body with missing or empty
    /// fields, is reported as `SessionError`.
    pub async fn create_session(&self, consultation_id: u64) -> Result<SessionToken, AppError> {
        let path = format!("/api/consultations/{}/session", consultation_id);
        let token: SessionToken = self
            .api
            .post(&path, &serde_json::json!({}))
            .await
            .map_err(|e| {
                tracing::error!(consultation_id, error = %e, "Session token request failed");
                AppError::session(e)
            })?;

        if token.session_id.trim().is_empty() || token.token.expose_secret().trim().is_empty() {
            tracing::error!(consultation_id, "Session token response has empty fields");
            return Err(AppError::session("session token response is incomplete"));
        }

        tracing::info!(
            consultation_id,
            session_id = %token.session_id,
            "Session token issued"
        );
        Ok(token)
    }

    pub async fn get_session(&self, consultation_id: u64) -> Result<SessionInfo, AppError> {
        let path = format!("/api/consultations/{}/session", consultation_id);
        self.api.get(&path).await.map_err(AppError::session)
    }

    pub async fn get(&self, consultation_id: u64) -> Result<Consultation, AppError> {
        self.api
            .get(&format!("/api/consultations/{}", consultation_id))
            .await
    }

    pub async fn list(
        &self,
        status: Option<ConsultationStatus>,
    ) -> Result<Vec<Consultation>, AppError> {
        self.api
            .get_with_query("/api/consultations", &ListQuery { status })
            .await
    }

    pub async fn cancel(
        &self,
        consultation_id: u64,
        request: &CancellationRequest,
    ) -> Result<(), AppError> {
        let path = format!("/api/consultations/{}/cancel", consultation_id);
        self.api.post_no_content(&path, request).await
    }

    pub async fn submit_review(
        &self,
        consultation_id: u64,
        request: &ReviewRequest,
    ) -> Result<(), AppError> {
        let path = format!("/api/consultations/{}/reviews", consultation_id);
        self.api.post_no_content(&path, request).await
    }
}
