pub mod chat;
pub mod consultation;
pub mod review;
pub mod session;
pub mod stock;
pub mod user;

pub use chat::{ChatMessage, MessageKind};
pub use consultation::{
    CancellationReason, CancellationRequest, Consultation, ConsultationStatus, MAX_MEMO_CHARS,
};
pub use review::ReviewRequest;
pub use session::{SessionInfo, SessionToken};
pub use stock::StockQuote;
pub use user::AuthUser;
