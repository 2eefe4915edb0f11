use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Chat channel is not connected")]
    ChannelNotReady,

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl AppError {
    /// Wrap any failure on the session-establishment path.
    pub fn session(err: impl std::fmt::Display) -> Self {
        AppError::SessionError(err.to_string())
    }

    /// Map a non-2xx backend status to the matching variant.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => AppError::Unauthorized(message),
            404 => AppError::NotFound(message),
            _ => AppError::Backend { status, message },
        }
    }

    pub fn user_facing(&self) -> UserFacingError {
        let (title, message) = match self {
            AppError::SessionError(_) => (
                "Connection failed",
                "We couldn't start the consultation session. Please try again.".to_string(),
            ),
            AppError::ChannelNotReady => (
                "Not connected",
                "Chat is available once the session is connected.".to_string(),
            ),
            AppError::InvalidTransition { from, .. } => (
                "Action not available",
                format!("This consultation is already {}.", from),
            ),
            AppError::ValidationError(err) => ("Check your input", err.to_string()),
            AppError::InvalidInput(msg) => ("Check your input", msg.clone()),
            AppError::Unauthorized(_) => (
                "Sign in required",
                "Your session has expired. Please sign in again.".to_string(),
            ),
            AppError::NotFound(_) => (
                "Not found",
                "The requested item no longer exists.".to_string(),
            ),
            AppError::Backend { status, .. } if *status >= 500 => (
                "Service unavailable",
                "The service is temporarily unavailable. Please try again later.".to_string(),
            ),
            AppError::Backend { message, .. } => ("Request rejected", message.clone()),
            AppError::ConfigError(_) | AppError::InternalError(_) => (
                "Something went wrong",
                "An unexpected error occurred.".to_string(),
            ),
        };

        UserFacingError {
            title: title.to_string(),
            message,
        }
    }
}

/// Error as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserFacingError {
    pub title: String,
    pub message: String,
}

impl std::fmt::Display for UserFacingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Recovery boundary around a fallible render path.
///
/// Logs the failure and substitutes whatever `fallback` builds from the
/// user-facing form of the error.
pub fn boundary<T, F>(result: Result<T, AppError>, fallback: F) -> T
where
    F: FnOnce(UserFacingError) -> T,
{
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(error = %err, "Recovered from failure at error boundary");
            fallback(err.user_facing())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_known_codes() {
        assert!(matches!(
            AppError::from_status(401, "expired".into()),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            AppError::from_status(404, "gone".into()),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from_status(409, "conflict".into()),
            AppError::Backend { status: 409, .. }
        ));
    }

    #[test]
    fn test_invalid_transition_message_names_current_state() {
        let err = AppError::InvalidTransition {
            from: "cancelled",
            to: "cancelled",
        };
        assert_eq!(
            err.user_facing().message,
            "This consultation is already cancelled."
        );
    }

    #[test]
    fn test_boundary_substitutes_fallback() {
        let rendered = boundary(Err(AppError::ChannelNotReady), |e| e.title);
        assert_eq!(rendered, "Not connected");

        let rendered = boundary(Ok::<_, AppError>("chart".to_string()), |e| e.title);
        assert_eq!(rendered, "chart");
    }

    #[test]
    fn test_server_errors_hide_backend_message() {
        let err = AppError::Backend {
            status: 503,
            message: "upstream pool exhausted".into(),
        };
        assert_eq!(err.user_facing().title, "Service unavailable");
    }
}
