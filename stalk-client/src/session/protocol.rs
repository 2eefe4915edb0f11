//! Frames exchanged with the signaling service.
//!
//! Each WebSocket text message carries one JSON object tagged by `type`.

use crate::models::ChatMessage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalFrame {
    Chat { message: ChatMessage },
    ParticipantJoined { name: String },
    ParticipantLeft { name: String },
    /// The service closed the session, e.g. when the advisor ends it.
    SessionEnded { reason: String },
    /// Sent by the client before it drops the link.
    Leave,
}
