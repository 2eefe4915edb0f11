//! WebSocket link to the signaling service.

use crate::config::SessionSettings;
use crate::models::SessionToken;
use crate::session::protocol::SignalFrame;
use crate::session::transport::{Connector, Link};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use reqwest::Url;
use secrecy::ExposeSecret;
use stalk_core::AppError;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

pub struct WebSocketConnector {
    signaling_url: String,
    connect_timeout: Duration,
    buffer: usize,
}

impl WebSocketConnector {
    pub fn new(settings: &SessionSettings) -> Self {
        Self {
            signaling_url: settings.signaling_url.clone(),
            connect_timeout: settings.connect_timeout(),
            buffer: settings.channel_buffer,
        }
    }

    fn session_url(&self, token: &SessionToken) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.signaling_url)
            .map_err(|e| AppError::session(format!("invalid signaling url: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("sessionId", &token.session_id)
            .append_pair("token", token.token.expose_secret());
        Ok(url)
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, token: &SessionToken) -> Result<Link, AppError> {
        let url = self.session_url(token)?;

        let (ws_stream, _) = tokio::time::timeout(self.connect_timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| AppError::session("timed out connecting to signaling service"))?
            .map_err(|e| AppError::session(format!("signaling connection failed: {}", e)))?;

        let (mut sink, mut stream) = ws_stream.split();
        let (outbound, mut outbound_rx) = mpsc::channel::<SignalFrame>(self.buffer);
        let (inbound_tx, inbound) = mpsc::channel::<SignalFrame>(self.buffer);
        let session_id = token.session_id.clone();

        tracing::info!(session_id = %session_id, "Signaling link open");

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    frame = outbound_rx.recv() => match frame {
                        Some(frame) => {
                            let text = match serde_json::to_string(&frame) {
                                Ok(text) => text,
                                Err(e) => {
                                    tracing::error!(error = %e, "Failed to encode frame");
                                    continue;
                                }
                            };
                            if let Err(e) = sink.send(Message::Text(text)).await {
                                tracing::warn!(session_id = %session_id, error = %e, "Send failed");
                                break;
                            }
                        }
                        None => {
                            let _ = sink.close().await;
                            break;
                        }
                    },
                    message = stream.next() => match message {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<SignalFrame>(&text) {
                                Ok(frame) => {
                                    if inbound_tx.send(frame).await.is_err() {
                                        break;
                                    }
                                }
                                Err(e) => {
                                    tracing::warn!(session_id = %session_id, error = %e, "Ignoring malformed frame");
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!(session_id = %session_id, error = %e, "Signaling link error");
                            break;
                        }
                    },
                }
            }

            tracing::info!(session_id = %session_id, "Signaling link closed");
        });

        Ok(Link { outbound, inbound })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use secrecy::Secret;

    #[test]
    fn test_session_url_carries_credentials() {
        let connector = WebSocketConnector {
            signaling_url: "ws://localhost:4443/signal".into(),
            connect_timeout: Duration::from_secs(1),
            buffer: 8,
        };
        let token = SessionToken {
            session_id: "ses_42".into(),
            token: Secret::new("tok en".into()),
            created_at: Utc::now(),
        };

        let url = connector.session_url(&token).unwrap();
        assert_eq!(
            url.as_str(),
            "ws://localhost:4443/signal?sessionId=ses_42&token=tok+en"
        );
    }
}
