use serde::{Deserialize, Serialize};

/// The signed-in user, as read from the access token's claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
}

impl AuthUser {
    /// Name shown to the other participant in a session.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => self.email.split('@').next().unwrap_or("User").to_string(),
        }
    }
}
