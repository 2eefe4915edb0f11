//! Backend-confirmed consultation transitions.
//!
//! The local `Consultation` is only mutated after the backend has accepted
//! the change. Each transition is checked locally first so that obviously
//! invalid requests never leave the client.

use crate::models::{
    CancellationReason, CancellationRequest, Consultation, ConsultationStatus, ReviewRequest,
};
use crate::services::consultation_client::ConsultationClient;
use stalk_core::AppError;
use validator::Validate;

#[derive(Clone)]
pub struct ConsultationService {
    client: ConsultationClient,
}

impl ConsultationService {
    pub fn new(client: ConsultationClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ConsultationClient {
        &self.client
    }

    pub async fn upcoming(&self) -> Result<Vec<Consultation>, AppError> {
        self.client.list(Some(ConsultationStatus::Scheduled)).await
    }

    pub async fn history(&self) -> Result<Vec<Consultation>, AppError> {
        let mut all = self.client.list(None).await?;
        all.retain(|c| c.status.is_terminal());
        Ok(all)
    }

    pub async fn cancel(
        &self,
        consultation: &mut Consultation,
        reason: CancellationReason,
        memo: Option<&str>,
    ) -> Result<(), AppError> {
        let request = CancellationRequest::new(reason, memo);
        consultation.check_cancellation(&request)?;

        self.client.cancel(consultation.id, &request).await?;
        consultation.apply_cancellation(&request)?;

        tracing::info!(
            consultation_id = consultation.id,
            reason = reason.as_str(),
            "Consultation cancelled"
        );
        Ok(())
    }

    /// Re-read the consultation and apply completion if the backend reports it.
    ///
    /// Returns whether the consultation is now completed.
    pub async fn confirm_completion(
        &self,
        consultation: &mut Consultation,
    ) -> Result<bool, AppError> {
        if consultation.status == ConsultationStatus::Completed {
            return Ok(true);
        }

        let remote = self.client.get(consultation.id).await?;
        match remote.status {
            ConsultationStatus::Completed => {
                consultation.apply_completion()?;
                tracing::info!(consultation_id = consultation.id, "Consultation completed");
                Ok(true)
            }
            ConsultationStatus::Cancelled => {
                // Cancelled elsewhere, e.g. by the advisor.
                *consultation = remote;
                Ok(false)
            }
            ConsultationStatus::Scheduled => Ok(false),
        }
    }

    pub async fn review(
        &self,
        consultation: &Consultation,
        rating: u8,
        content: &str,
    ) -> Result<(), AppError> {
        if consultation.status != ConsultationStatus::Completed {
            return Err(AppError::InvalidTransition {
                from: consultation.status.as_str(),
                to: "reviewed",
            });
        }

        let request = ReviewRequest {
            rating,
            content: content.trim().to_string(),
        };
        request.validate()?;

        self.client.submit_review(consultation.id, &request).await
    }
}
