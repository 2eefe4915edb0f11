#![allow(dead_code)]

use base64::{engine::general_purpose, Engine as _};
use chrono::{NaiveDate, NaiveTime, Utc};
use secrecy::Secret;
use serde_json::json;
use stalk_client::config::{
    ApiSettings, ApplicationSettings, SessionSettings, Settings, StockSettings, TelemetrySettings,
};
use stalk_client::models::{Consultation, ConsultationStatus};
use stalk_client::session::transport::{MemoryConnector, RemotePeer};
use stalk_client::{Application, ConnectionState, SessionClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_USER_ID: &str = "user_1001";
pub const TEST_USER_NAME: &str = "Park Investor";

pub struct TestApp {
    pub server: MockServer,
    pub app: Application,
    pub peers: mpsc::UnboundedReceiver<RemotePeer>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let server = MockServer::start().await;
        let (connector, peers) = MemoryConnector::new(16);

        let mut settings = test_settings(&server.uri());
        settings.application.access_token = Some(access_token(3600));

        let app = Application::build_with_connector(settings, Arc::new(connector))
            .await
            .expect("Failed to build test application");

        Self { server, app, peers }
    }

    /// Serve a valid session token for `consultation_id`.
    pub async fn mount_session_token(&self, consultation_id: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/api/consultations/{}/session", consultation_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sessionId": format!("ses_{}", consultation_id),
                "token": "wss-token-abc",
                "createdAt": "2026-10-18T09:00:00Z"
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn session(&self) -> SessionClient {
        self.app.session().await.expect("Failed to create session client")
    }

    /// Connect a session for a scheduled consultation and return the far end.
    pub async fn connected_session(&mut self, consultation_id: u64) -> (SessionClient, RemotePeer) {
        self.mount_session_token(consultation_id).await;
        let session = self.session().await;
        session
            .connect(&scheduled_consultation(consultation_id))
            .await
            .expect("Failed to connect session");

        let peer = tokio::time::timeout(Duration::from_secs(2), self.peers.recv())
            .await
            .expect("Timed out waiting for remote peer")
            .expect("Connector closed");

        (session, peer)
    }
}

pub fn test_settings(base_url: &str) -> Settings {
    Settings {
        application: ApplicationSettings {
            name: "stalk-client-test".to_string(),
            access_token: None,
        },
        api: ApiSettings {
            base_url: base_url.to_string(),
            request_timeout_ms: 2_000,
        },
        session: SessionSettings {
            signaling_url: "ws://127.0.0.1:9/signal".to_string(),
            connect_timeout_ms: 2_000,
            send_timeout_ms: 1_000,
            channel_buffer: 16,
        },
        stocks: StockSettings {
            poll_interval_secs: 1,
        },
        telemetry: TelemetrySettings {
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
    }
}

/// Unsigned JWT carrying the test user's claims, expiring `ttl_secs` from now.
pub fn access_token(ttl_secs: i64) -> Secret<String> {
    let claims = json!({
        "sub": TEST_USER_ID,
        "email": "park@stalk.dev",
        "name": TEST_USER_NAME,
        "exp": Utc::now().timestamp() + ttl_secs,
    });
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(claims.to_string());
    Secret::new(format!("eyJhbGciOiJIUzI1NiJ9.{}.signature", payload))
}

pub fn scheduled_consultation(id: u64) -> Consultation {
    Consultation::new(
        id,
        NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
        NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
        "Kim Advisor",
    )
}

pub fn consultation_with_status(id: u64, status: ConsultationStatus) -> Consultation {
    let mut consultation = scheduled_consultation(id);
    consultation.status = status;
    consultation
}

pub fn consultation_json(id: u64, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "scheduledDate": "2026-11-02",
        "scheduledTime": "14:30:00",
        "counterpartyName": "Kim Advisor",
        "status": status
    })
}

pub async fn wait_for_state(session: &SessionClient, expected: ConnectionState) {
    let mut state = session.subscribe_state();
    tokio::time::timeout(Duration::from_secs(2), state.wait_for(|s| *s == expected))
        .await
        .expect("Timed out waiting for session state")
        .expect("Session state channel closed");
}
