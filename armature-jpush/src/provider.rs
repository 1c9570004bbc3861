//! Gateway sender capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{GatewayFault, PushPayload};

/// Gateway acknowledgement of an accepted push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResult {
    /// Message id assigned by the gateway. Empty when the gateway accepted
    /// the push but its response body could not be read.
    pub msg_id: String,
    /// Send number echoed by the gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sendno: Option<String>,
}

impl PushResult {
    /// Create a result with only a message id.
    pub fn new(msg_id: impl Into<String>) -> Self {
        Self {
            msg_id: msg_id.into(),
            sendno: None,
        }
    }
}

/// Submits payloads to the push gateway.
///
/// This is the only network-facing dependency of the dispatcher. Connection
/// pooling, authentication and cancellation are the implementation's
/// concern.
#[async_trait]
pub trait GatewaySender: Send + Sync {
    /// Submit a fully defaulted payload.
    async fn submit(&self, payload: &PushPayload) -> Result<PushResult, GatewayFault>;
}

#[async_trait]
impl<T: GatewaySender + ?Sized> GatewaySender for Arc<T> {
    async fn submit(&self, payload: &PushPayload) -> Result<PushResult, GatewayFault> {
        (**self).submit(payload).await
    }
}
