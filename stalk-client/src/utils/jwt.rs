use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use serde::Deserialize;
use stalk_core::AppError;

#[derive(Debug, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub exp: i64,
}

impl JwtClaims {
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }
}

/// Decode JWT claims without validating the signature.
///
/// The backend issues the token and verifies it on every request; the client
/// only needs the subject and profile fields to populate the auth context.
pub fn decode_jwt_claims(token: &str) -> Result<JwtClaims, AppError> {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 {
        return Err(AppError::Unauthorized("Invalid JWT format".to_string()));
    }

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| AppError::Unauthorized(format!("Failed to decode JWT payload: {}", e)))?;

    serde_json::from_slice(&payload)
        .map_err(|e| AppError::Unauthorized(format!("Failed to parse JWT claims: {}", e)))
}
