use jesprec_core::errors::{ApplicationError, DomainError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend answered with a non-success status; `message` is its own text.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("gateway transport error: {0}")]
    Transport(String),
    #[error("gateway decode error: {0}")]
    Decode(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

impl From<GatewayError> for ApplicationError {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::Domain(domain) => Self::Domain(domain),
            GatewayError::NotFound(message) => Self::NotFound(message),
            GatewayError::Api { status: 401, .. } => Self::Domain(DomainError::Unauthorized),
            other => Self::Gateway(other.to_string()),
        }
    }
}
