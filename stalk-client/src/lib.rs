pub mod auth;
pub mod chat;
pub mod config;
pub mod models;
pub mod polling;
pub mod services;
pub mod session;
pub mod startup;
pub mod utils;

pub use auth::AuthContext;
pub use chat::ChatChannel;
pub use session::{ConnectionState, SessionClient};
pub use startup::Application;
