use crate::auth::AuthContext;
use crate::config::Settings;
use crate::polling::StockWatcher;
use crate::services::{ApiClient, AuthClient, ConsultationClient, ConsultationService, StockClient};
use crate::session::transport::Connector;
use crate::session::websocket::WebSocketConnector;
use crate::session::SessionClient;
use stalk_core::AppError;
use std::sync::Arc;

/// Application context: owns configuration, the auth context and the
/// backend client, and hands out per-feature components.
pub struct Application {
    settings: Settings,
    auth: AuthContext,
    api: ApiClient,
    connector: Arc<dyn Connector>,
}

impl Application {
    /// Build with the WebSocket signaling connector.
    ///
    /// Signs in right away when `application.access_token` is configured.
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let connector: Arc<dyn Connector> = Arc::new(WebSocketConnector::new(&settings.session));
        Self::build_with_connector(settings, connector).await
    }

    pub async fn build_with_connector(
        settings: Settings,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, AppError> {
        settings.validate()?;

        let auth = AuthContext::new();
        let api = ApiClient::new(&settings.api, auth.clone())?;

        if let Some(token) = settings.application.access_token.clone() {
            auth.sign_in(token).await?;
        }

        tracing::info!(
            app = %settings.application.name,
            api = %api.base_url(),
            "Application initialized"
        );

        Ok(Self {
            settings,
            auth,
            api,
            connector,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn auth_client(&self) -> AuthClient {
        AuthClient::new(self.api.clone())
    }

    pub fn consultations(&self) -> ConsultationService {
        ConsultationService::new(ConsultationClient::new(self.api.clone()))
    }

    /// A fresh session client for one consultation, named after the
    /// signed-in user.
    pub async fn session(&self) -> Result<SessionClient, AppError> {
        let user = self
            .auth
            .current_user()
            .await
            .ok_or_else(|| AppError::Unauthorized("Sign in to join a session".to_string()))?;

        Ok(SessionClient::new(
            ConsultationClient::new(self.api.clone()),
            self.connector.clone(),
            &self.settings.session,
            user.display_name(),
        ))
    }

    pub fn stock_client(&self) -> StockClient {
        StockClient::new(self.api.clone())
    }

    pub fn watch_stock(&self, code: impl Into<String>) -> Result<StockWatcher, AppError> {
        StockWatcher::start(
            self.stock_client(),
            code,
            self.settings.stocks.poll_interval(),
        )
    }

    /// Tear down: log out and clear the auth context.
    pub async fn shutdown(self) {
        self.auth_client().logout().await;
        tracing::info!("Application shut down");
    }
}
