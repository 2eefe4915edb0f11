//! Live consultation session.
//!
//! A `SessionClient` belongs to one consultation and moves through
//! `idle → connecting → connected → disconnected`. `disconnected` is
//! terminal: a new session needs a new client. Whether the user leaves or
//! the remote side closes, the client ends up in the same state with the
//! link dropped and the token discarded.

pub mod protocol;
pub mod transport;
pub mod websocket;

use crate::chat::{ChatChannel, ChatHistory};
use crate::config::SessionSettings;
use crate::models::{ChatMessage, Consultation, SessionInfo, SessionToken};
use crate::services::ConsultationClient;
use protocol::SignalFrame;
use stalk_core::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio_util::sync::CancellationToken;
use transport::{Connector, Link};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

struct ActiveLink {
    consultation_id: u64,
    token: SessionToken,
    outbound: mpsc::Sender<SignalFrame>,
}

#[derive(Default)]
struct LinkSlot {
    active: Option<ActiveLink>,
    /// A connect is between reserving the slot and installing the link.
    connecting: bool,
    ended_reason: Option<String>,
}

/// State shared between the client, its chat channels and the inbound pump.
pub(crate) struct SessionShared {
    pub(crate) local_name: String,
    pub(crate) send_timeout: Duration,
    pub(crate) history: ChatHistory,
    state: watch::Sender<ConnectionState>,
    link: Mutex<LinkSlot>,
    /// Stops the inbound pump. Lives outside `link` so it can always be
    /// cancelled without taking the lock.
    pump: CancellationToken,
}

impl SessionShared {
    pub(crate) fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn set_state(&self, next: ConnectionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            tracing::debug!(from = %previous, to = %next, "Session state changed");
        }
    }

    pub(crate) async fn outbound(&self) -> Option<mpsc::Sender<SignalFrame>> {
        self.link
            .lock()
            .await
            .active
            .as_ref()
            .map(|a| a.outbound.clone())
    }

    /// Drop the outbound sender, closing the link from our side.
    async fn release_link(&self) {
        if let Some(active) = self.link.lock().await.active.take() {
            tracing::debug!(session_id = %active.token.session_id, "Released session link");
        }
    }

    /// Remote side closed the link or ended the session.
    async fn close_from_remote(&self, reason: Option<String>) {
        let mut slot = self.link.lock().await;
        if let Some(active) = slot.active.take() {
            tracing::info!(
                consultation_id = active.consultation_id,
                session_id = %active.token.session_id,
                reason = reason.as_deref().unwrap_or("link closed"),
                "Session closed by remote"
            );
        }
        if reason.is_some() {
            slot.ended_reason = reason;
        }
        self.set_state(ConnectionState::Disconnected);
    }
}

pub struct SessionClient {
    consultations: ConsultationClient,
    connector: Arc<dyn Connector>,
    shared: Arc<SessionShared>,
}

impl SessionClient {
    pub fn new(
        consultations: ConsultationClient,
        connector: Arc<dyn Connector>,
        settings: &SessionSettings,
        local_name: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Idle);
        Self {
            consultations,
            connector,
            shared: Arc::new(SessionShared {
                local_name: local_name.into(),
                send_timeout: settings.send_timeout(),
                history: ChatHistory::new(),
                state,
                link: Mutex::new(LinkSlot::default()),
                pump: CancellationToken::new(),
            }),
        }
    }

    pub(crate) fn shared(&self) -> Arc<SessionShared> {
        self.shared.clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    pub fn chat(&self) -> ChatChannel {
        ChatChannel::attach(self)
    }

    pub async fn session_id(&self) -> Option<String> {
        self.shared
            .link
            .lock()
            .await
            .active
            .as_ref()
            .map(|a| a.token.session_id.clone())
    }

    /// Resolves once the session is `disconnected`, immediately if it
    /// already is.
    pub async fn closed(&self) {
        let mut state = self.subscribe_state();
        let _ = state
            .wait_for(|s| *s == ConnectionState::Disconnected)
            .await;
    }

    /// Reason given by the service when it ended the session, if it did.
    pub async fn ended_reason(&self) -> Option<String> {
        self.shared.link.lock().await.ended_reason.clone()
    }

    pub async fn session_info(&self, consultation_id: u64) -> Result<SessionInfo, AppError> {
        self.consultations.get_session(consultation_id).await
    }

    /// Fetch a session token for `consultation` and open the live link.
    ///
    /// On any failure the client is back in `idle` and nothing is held.
    /// The link lock is not held across the network calls; a `disconnect`
    /// issued meanwhile wins and the new link is dropped.
    pub async fn connect(&self, consultation: &Consultation) -> Result<(), AppError> {
        consultation.ensure_session_allowed()?;

        {
            let mut slot = self.shared.link.lock().await;
            match self.state() {
                ConnectionState::Disconnected => {
                    return Err(AppError::session("session has already ended"));
                }
                ConnectionState::Connecting | ConnectionState::Connected => {
                    return Err(AppError::session("session is already active"));
                }
                ConnectionState::Idle if slot.connecting => {
                    return Err(AppError::session("session is already active"));
                }
                ConnectionState::Idle => slot.connecting = true,
            }
        }

        let opened = self.open_link(consultation.id).await;

        let mut slot = self.shared.link.lock().await;
        slot.connecting = false;
        let left = self.state() == ConnectionState::Disconnected;

        match opened {
            Ok(_) if left => {
                tracing::info!(
                    consultation_id = consultation.id,
                    "Session left while connecting; dropping link"
                );
                Err(AppError::session("session was closed while connecting"))
            }
            Ok((token, link)) => {
                self.activate(&mut slot, consultation.id, token, link);
                Ok(())
            }
            Err(e) => {
                if !left {
                    self.shared.set_state(ConnectionState::Idle);
                }
                Err(e)
            }
        }
    }

    async fn open_link(&self, consultation_id: u64) -> Result<(SessionToken, Link), AppError> {
        let token = self.consultations.create_session(consultation_id).await?;

        {
            let _slot = self.shared.link.lock().await;
            if self.state() == ConnectionState::Disconnected {
                return Err(AppError::session("session was closed while connecting"));
            }
            self.shared.set_state(ConnectionState::Connecting);
        }

        match self.connector.connect(&token).await {
            Ok(link) => Ok((token, link)),
            Err(e) => {
                tracing::error!(consultation_id, error = %e, "Failed to open session link");
                Err(match e {
                    AppError::SessionError(_) => e,
                    other => AppError::session(other),
                })
            }
        }
    }

    fn activate(
        &self,
        slot: &mut LinkSlot,
        consultation_id: u64,
        token: SessionToken,
        link: Link,
    ) {
        let Link { outbound, inbound } = link;
        tracing::info!(
            consultation_id,
            session_id = %token.session_id,
            "Session connected"
        );
        slot.active = Some(ActiveLink {
            consultation_id,
            token,
            outbound,
        });
        self.shared.set_state(ConnectionState::Connected);

        tokio::spawn(pump_inbound(
            self.shared.clone(),
            inbound,
            self.shared.pump.clone(),
        ));
    }

    /// Leave the session. Safe to call in any state.
    pub async fn disconnect(&self) {
        let mut slot = self.shared.link.lock().await;
        if let Some(active) = slot.active.take() {
            if active.outbound.try_send(SignalFrame::Leave).is_err() {
                tracing::debug!("Leave notice not delivered");
            }
            tracing::info!(
                consultation_id = active.consultation_id,
                session_id = %active.token.session_id,
                "Left session"
            );
        }
        self.shared.pump.cancel();
        self.shared.set_state(ConnectionState::Disconnected);
    }
}

impl Drop for SessionClient {
    fn drop(&mut self) {
        // If the lock is busy the pump releases the link on its way out.
        self.shared.pump.cancel();
        if let Ok(mut slot) = self.shared.link.try_lock() {
            slot.active.take();
        }
        self.shared.set_state(ConnectionState::Disconnected);
    }
}

async fn pump_inbound(
    shared: Arc<SessionShared>,
    mut inbound: mpsc::Receiver<SignalFrame>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                shared.release_link().await;
                break;
            }
            frame = inbound.recv() => match frame {
                Some(SignalFrame::Chat { message }) => shared.history.push(message).await,
                Some(SignalFrame::ParticipantJoined { name }) => {
                    let notice = ChatMessage::system(format!("{} joined the session", name));
                    shared.history.push(notice).await;
                }
                Some(SignalFrame::ParticipantLeft { name }) => {
                    let notice = ChatMessage::system(format!("{} left the session", name));
                    shared.history.push(notice).await;
                }
                Some(SignalFrame::SessionEnded { reason }) => {
                    shared.close_from_remote(Some(reason)).await;
                    break;
                }
                Some(SignalFrame::Leave) => {
                    tracing::debug!("Ignoring leave frame from remote");
                }
                None => {
                    shared.close_from_remote(None).await;
                    break;
                }
            },
        }
    }
}
