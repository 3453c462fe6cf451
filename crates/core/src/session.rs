use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::errors::DomainError;

/// Signed-in administrator as returned by the gateway's password grant.
#[derive(Clone)]
pub struct AdminSession {
    pub user_id: String,
    pub email: String,
    pub access_token: SecretString,
    pub expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSession")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("access_token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AdminSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    pub fn bearer_token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

/// Who is behind a request. Passed explicitly to every admin operation.
#[derive(Clone, Debug, Default)]
pub enum SessionContext {
    #[default]
    Anonymous,
    Admin(AdminSession),
}

impl SessionContext {
    pub fn require_admin(&self, now: DateTime<Utc>) -> Result<&AdminSession, DomainError> {
        match self {
            Self::Admin(session) if !session.is_expired(now) => Ok(session),
            _ => Err(DomainError::Unauthorized),
        }
    }

    pub fn sign_out(&mut self) -> Option<AdminSession> {
        match std::mem::take(self) {
            Self::Admin(session) => Some(session),
            Self::Anonymous => None,
        }
    }
}
