//! Unified error types for the lag monitor.
//!
//! Only configuration and credential errors are fatal. Transport and decode
//! errors are scoped to a single cluster or table and get folded into the
//! report, so one unreachable controller never hides the others.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the lag monitor.
#[derive(Debug, Error)]
pub enum Error {
    /// Config file missing, unparsable, or failing validation.
    #[error("config error: {0}")]
    Config(String),

    /// Controller credentials missing from the environment.
    #[error("auth config error: {0}")]
    AuthConfig(String),

    /// Request could not be sent, timed out, or got a non-success status.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        status: Option<u16>,
    },

    /// Response body is not the JSON shape we expect.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("notification error: {0}")]
    Notification(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn auth_config(msg: impl Into<String>) -> Self {
        Self::AuthConfig(msg.into())
    }

    /// Create a transport error without an HTTP status (connect, timeout).
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
            status: None,
        }
    }

    /// Create a transport error for a non-success HTTP status.
    pub fn http_status(status: u16, msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
            status: Some(status),
        }
    }

    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }

    /// Whether this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::AuthConfig(_))
    }

    /// Short machine-friendly kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::AuthConfig(_) => "auth_config",
            Self::Transport { .. } => "transport",
            Self::Decode(_) => "decode",
            Self::Notification(_) => "notification",
        }
    }

    /// HTTP status attached to a transport error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}
