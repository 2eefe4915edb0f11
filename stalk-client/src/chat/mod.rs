//! Text chat within a live consultation session.

mod history;

pub use history::ChatHistory;

use crate::models::ChatMessage;
use crate::session::protocol::SignalFrame;
use crate::session::{ConnectionState, SessionClient, SessionShared};
use stalk_core::AppError;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Handle for sending and reading chat messages on a session.
///
/// Cheap to clone; all clones share the session's history.
#[derive(Clone)]
pub struct ChatChannel {
    shared: Arc<SessionShared>,
}

impl ChatChannel {
    pub fn attach(session: &SessionClient) -> Self {
        Self {
            shared: session.shared(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.shared.state() == ConnectionState::Connected
    }

    /// Transmit `text` and append it to the history.
    ///
    /// Fails with `ChannelNotReady` unless the session is connected,
    /// whatever the text.
    pub async fn send(&self, text: &str) -> Result<ChatMessage, AppError> {
        if !self.is_ready() {
            return Err(AppError::ChannelNotReady);
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::InvalidInput("Message is empty".to_string()));
        }

        let outbound = self
            .shared
            .outbound()
            .await
            .ok_or(AppError::ChannelNotReady)?;

        let message = ChatMessage::user(self.shared.local_name.clone(), text);
        let frame = SignalFrame::Chat {
            message: message.clone(),
        };

        match tokio::time::timeout(self.shared.send_timeout, outbound.send(frame)).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => return Err(AppError::ChannelNotReady),
            Err(_) => {
                tracing::warn!(message_id = %message.id, "Chat delivery timed out");
                return Err(AppError::session("chat delivery timed out"));
            }
        }

        self.shared.history.push(message.clone()).await;
        tracing::debug!(message_id = %message.id, "Chat message sent");
        Ok(message)
    }

    pub async fn history(&self) -> Vec<ChatMessage> {
        self.shared.history.snapshot().await
    }

    /// Messages appended from now on, local and remote, in history order.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatMessage> {
        self.shared.history.subscribe()
    }
}
