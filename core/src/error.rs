//! Error types for the pawlog client.
//!
//! # Design
//! One enum covers both providers. The first four variants carry a fixed
//! status code so the mock and the HTTP transport classify failures the same
//! way. `Transport` is the catch-all for any other non-2xx status. Everything
//! is `Clone` because a single in-flight request may resolve many callers.

use thiserror::Error;

use crate::types::ErrorBody;

/// Errors returned by every facade operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Missing or inconsistent input (400).
    #[error("{message}")]
    Validation { message: String },

    /// Bad credentials (401).
    #[error("{message}")]
    Auth { message: String },

    /// Unknown identifier (404).
    #[error("{message}")]
    NotFound { message: String },

    /// Duplicate resource such as an already registered email (409).
    #[error("{message}")]
    Conflict { message: String },

    /// Any other non-2xx response, described only by its status line.
    #[error("HTTP {status}: {status_text}")]
    Transport { status: u16, status_text: String },

    /// The request never produced a response (connection refused, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// The persisted session could not be read or written.
    #[error("session store: {0}")]
    Session(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Classify a non-success status line.
    pub fn from_status(status: u16, status_text: &str) -> Self {
        let message = status_text.to_string();
        match status {
            400 => Self::Validation { message },
            401 => Self::Auth { message },
            404 => Self::NotFound { message },
            409 => Self::Conflict { message },
            _ => Self::Transport {
                status,
                status_text: message,
            },
        }
    }

    /// Numeric status, when the error came from (or emulates) an HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Validation { .. } => Some(400),
            Self::Auth { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::Transport { status, .. } => Some(*status),
            Self::Network(_)
            | Self::Deserialization(_)
            | Self::Serialization(_)
            | Self::Config(_)
            | Self::Session(_) => None,
        }
    }

    /// Human-readable message without the status prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Validation { message }
            | Self::Auth { message }
            | Self::NotFound { message }
            | Self::Conflict { message } => message.clone(),
            Self::Transport { status_text, .. } => status_text.clone(),
            other => other.to_string(),
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            message: self.message(),
            status: self.status(),
        }
    }
}

impl From<ApiError> for ErrorBody {
    fn from(err: ApiError) -> Self {
        err.to_body()
    }
}
