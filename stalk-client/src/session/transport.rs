//! The seam between the session client and the real-time service.
//!
//! A connector turns a session token into a `Link`: a pair of frame queues.
//! Dropping the outbound sender closes the link; the inbound receiver
//! yielding `None` means the far end went away.

use crate::models::SessionToken;
use crate::session::protocol::SignalFrame;
use async_trait::async_trait;
use secrecy::Secret;
use stalk_core::AppError;
use tokio::sync::mpsc;

pub struct Link {
    pub outbound: mpsc::Sender<SignalFrame>,
    pub inbound: mpsc::Receiver<SignalFrame>,
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, token: &SessionToken) -> Result<Link, AppError>;
}

/// The far end of an in-process link.
pub struct RemotePeer {
    pub session_id: String,
    pub token: Secret<String>,
    to_client: mpsc::Sender<SignalFrame>,
    from_client: mpsc::Receiver<SignalFrame>,
}

impl RemotePeer {
    /// Deliver a frame to the client. Returns false once the client is gone.
    pub async fn send(&self, frame: SignalFrame) -> bool {
        self.to_client.send(frame).await.is_ok()
    }

    pub async fn recv(&mut self) -> Option<SignalFrame> {
        self.from_client.recv().await
    }

    /// Drop the link from the remote side.
    pub fn close(self) {
        drop(self);
    }
}

/// Connector that keeps both ends in process.
///
/// Every successful `connect` hands a `RemotePeer` to the receiver returned
/// by `new`. Useful for loopback sessions and tests.
pub struct MemoryConnector {
    peers: mpsc::UnboundedSender<RemotePeer>,
    buffer: usize,
}

impl MemoryConnector {
    pub fn new(buffer: usize) -> (Self, mpsc::UnboundedReceiver<RemotePeer>) {
        let (peers, accepted) = mpsc::unbounded_channel();
        (Self { peers, buffer }, accepted)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, token: &SessionToken) -> Result<Link, AppError> {
        let (outbound, from_client) = mpsc::channel(self.buffer);
        let (to_client, inbound) = mpsc::channel(self.buffer);

        let peer = RemotePeer {
            session_id: token.session_id.clone(),
            token: token.token.clone(),
            to_client,
            from_client,
        };

        self.peers
            .send(peer)
            .map_err(|_| AppError::session("signaling service is not accepting sessions"))?;

        Ok(Link { outbound, inbound })
    }
}
