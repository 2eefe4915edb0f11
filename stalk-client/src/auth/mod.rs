//! Explicit authentication context.
//!
//! One `AuthContext` is created at startup and shared (by clone) with every
//! component that talks to the backend. `sign_in` initialises it and
//! `sign_out` tears it down; there is no other global login state.

use crate::models::AuthUser;
use crate::utils::jwt::decode_jwt_claims;
use secrecy::{ExposeSecret, Secret};
use stalk_core::AppError;
use std::sync::Arc;
use tokio::sync::RwLock;

struct SignedIn {
    user: AuthUser,
    access_token: Secret<String>,
}

#[derive(Clone, Default)]
pub struct AuthContext {
    inner: Arc<RwLock<Option<SignedIn>>>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the context from a backend-issued access token.
    ///
    /// Expired tokens are refused so that the first backend call does not
    /// fail with a confusing 401.
    pub async fn sign_in(&self, access_token: Secret<String>) -> Result<AuthUser, AppError> {
        let claims = decode_jwt_claims(access_token.expose_secret())?;
        if claims.is_expired() {
            return Err(AppError::Unauthorized("Access token has expired".to_string()));
        }

        let user = AuthUser {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
        };

        *self.inner.write().await = Some(SignedIn {
            user: user.clone(),
            access_token,
        });

        tracing::info!(user_id = %user.user_id, "Signed in");
        Ok(user)
    }

    pub async fn sign_out(&self) {
        if let Some(previous) = self.inner.write().await.take() {
            tracing::info!(user_id = %previous.user.user_id, "Signed out");
        }
    }

    pub async fn current_user(&self) -> Option<AuthUser> {
        self.inner.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_some()
    }

    pub(crate) async fn access_token(&self) -> Option<Secret<String>> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose, Engine as _};

    fn token_with_exp(exp: i64) -> Secret<String> {
        let payload = serde_json::json!({
            "sub": "user_7",
            "email": "trader@stalk.dev",
            "name": "Trader",
            "exp": exp,
        });
        let encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());
        Secret::new(format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", encoded))
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let auth = AuthContext::new();
        assert!(!auth.is_authenticated().await);

        let exp = chrono::Utc::now().timestamp() + 3600;
        let user = auth.sign_in(token_with_exp(exp)).await.unwrap();
        assert_eq!(user.user_id, "user_7");
        assert_eq!(auth.current_user().await, Some(user));
        assert!(auth.access_token().await.is_some());

        auth.sign_out().await;
        assert!(!auth.is_authenticated().await);
        assert!(auth.access_token().await.is_none());
    }

    #[tokio::test]
    async fn test_expired_token_is_refused() {
        let auth = AuthContext::new();
        let exp = chrono::Utc::now().timestamp() - 10;

        let err = auth.sign_in(token_with_exp(exp)).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert!(!auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let auth = AuthContext::new();
        let shared = auth.clone();
        let exp = chrono::Utc::now().timestamp() + 3600;
        auth.sign_in(token_with_exp(exp)).await.unwrap();
        assert!(shared.is_authenticated().await);
    }
}
