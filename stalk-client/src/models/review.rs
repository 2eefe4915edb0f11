use serde::Serialize;
use validator::Validate;

/// Body of `POST /api/consultations/{id}/reviews`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
}
