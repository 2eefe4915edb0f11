use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::Deserialize;

/// Single-use credential for joining a consultation's live session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    pub session_id: String,
    pub token: Secret<String>,
    pub created_at: DateTime<Utc>,
}

/// Response of `GET /api/consultations/{id}/session`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
}
