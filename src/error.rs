//! Identity service error types

use thiserror::Error;

/// Fallback text when the identity service gives no description
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Errors returned by an identity backend
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{message}")]
    Rejected { message: String },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Identity service unavailable: {0}")]
    Unavailable(String),
}

impl AuthError {
    pub fn rejected(message: impl Into<String>) -> Self {
        AuthError::Rejected {
            message: message.into(),
        }
    }

    /// Text shown to the user in `AuthStatus::Error`
    pub fn user_message(&self) -> String {
        let message = match self {
            AuthError::Rejected { message } => message.trim().to_string(),
            other => other.to_string(),
        };
        if message.is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message
        }
    }

    /// Whether the service itself refused the request, as opposed to a transport
    /// or server failure
    pub fn is_rejection(&self) -> bool {
        match self {
            AuthError::Rejected { .. } => true,
            AuthError::Http { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }
}
