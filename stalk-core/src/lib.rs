//! stalk-core: shared infrastructure for the Stalk consultation client.
pub mod config;
pub mod error;
pub mod observability;

pub use error::{boundary, AppError, UserFacingError};
