//! Push composition and dispatch error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for composition and configuration operations.
pub type Result<T> = std::result::Result<T, PushError>;

/// Errors raised while composing a payload or loading configuration.
///
/// These are programmer errors: they are raised synchronously at the call
/// site and retrying the same call will always fail the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    /// Audience is empty or combines `all` with other targets.
    #[error("Invalid audience: {0}")]
    InvalidAudience(String),

    /// Payload is missing content or violates a platform/content invariant.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for PushError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Structured error returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// HTTP status of the response.
    pub status: u16,
    /// Gateway error code.
    pub code: i64,
    /// Human-readable error message.
    pub message: String,
    /// Message id, if the gateway echoed one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<String>,
}

impl Rejection {
    /// Create a rejection without a message id.
    pub fn new(status: u16, code: i64, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            msg_id: None,
        }
    }

    /// Attach the echoed message id.
    pub fn with_msg_id(mut self, msg_id: impl Into<String>) -> Self {
        self.msg_id = Some(msg_id.into());
        self
    }
}

/// Failure reported by a [`GatewaySender`](crate::GatewaySender).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayFault {
    /// The gateway could not be reached (connect, reset, timeout).
    #[error("Connection error: {0}")]
    Connection(String),

    /// The gateway answered with a structured error.
    #[error("Gateway rejected request ({}): {} {}", .0.status, .0.code, .0.message)]
    Rejected(Rejection),
}

#[cfg(feature = "client")]
impl From<reqwest::Error> for GatewayFault {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Rejected(Rejection::new(status.as_u16(), 0, err.to_string()))
        } else {
            Self::Connection(err.to_string())
        }
    }
}

/// Classified outcome of a failed [`Dispatcher::send`](crate::Dispatcher::send).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Nothing indicates the gateway processed the request.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The gateway refused the request.
    #[error("Rejected by gateway (HTTP {status}, code {code}): {message}")]
    Rejected {
        /// HTTP status.
        status: u16,
        /// Gateway error code.
        code: i64,
        /// Human-readable error message.
        message: String,
        /// Echoed message id, if any.
        msg_id: Option<String>,
    },
}

impl DispatchError {
    /// Check if resubmitting the same payload later may succeed.
    ///
    /// Only transport failures qualify. A rejection fails identically until
    /// the payload or the credentials are corrected.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// HTTP status of a rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }

    /// Gateway error code of a rejection.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Rejected { code, .. } => Some(*code),
            Self::Transport(_) => None,
        }
    }

    /// Message id echoed with a rejection.
    pub fn msg_id(&self) -> Option<&str> {
        match self {
            Self::Rejected { msg_id, .. } => msg_id.as_deref(),
            Self::Transport(_) => None,
        }
    }
}

impl From<GatewayFault> for DispatchError {
    fn from(fault: GatewayFault) -> Self {
        match fault {
            GatewayFault::Connection(cause) => Self::Transport(cause),
            GatewayFault::Rejected(r) => Self::Rejected {
                status: r.status,
                code: r.code,
                message: r.message,
                msg_id: r.msg_id,
            },
        }
    }
}
