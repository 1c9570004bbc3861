//! HTTP client for the JPush v3 push API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    GatewayFault, GatewaySender, JPushConfig, PushError, PushPayload, PushResult, Rejection,
    Result,
};

/// Gateway sender talking HTTP + JSON to the push API.
///
/// Requests are authenticated with HTTP basic auth built from the app key and
/// master secret. The underlying connection pool is shared between clones.
#[derive(Debug, Clone)]
pub struct JPushClient {
    config: JPushConfig,
    client: Client,
}

impl JPushClient {
    /// Create a new client.
    pub fn new(config: JPushConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("armature-jpush/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PushError::Config(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Get the configuration.
    pub fn config(&self) -> &JPushConfig {
        &self.config
    }
}

#[async_trait]
impl GatewaySender for JPushClient {
    async fn submit(&self, payload: &PushPayload) -> std::result::Result<PushResult, GatewayFault> {
        debug!(endpoint = %self.config.endpoint, "Sending push to gateway");

        let response = self
            .client
            .post(&self.config.endpoint)
            .basic_auth(&self.config.app_key, Some(&self.config.master_secret))
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| e.to_string());

        read_response(status, body)
    }
}

/// Classify a response whose status line has already arrived.
///
/// Once a status is known the gateway has seen the request, so nothing here
/// becomes a [`GatewayFault::Connection`]. A 2xx whose body cannot be read or
/// parsed is still an accepted push, reported with an empty `msg_id`.
fn read_response(
    status: u16,
    body: std::result::Result<String, String>,
) -> std::result::Result<PushResult, GatewayFault> {
    let success = (200..300).contains(&status);

    let body = match body {
        Ok(body) => body,
        Err(e) if success => {
            warn!(status, error = %e, "Gateway accepted push but the response body was lost");
            return Ok(PushResult::new(String::new()));
        }
        Err(e) => {
            return Err(GatewayFault::Rejected(Rejection::new(
                status,
                0,
                format!("unreadable response body: {}", e),
            )));
        }
    };

    if !success {
        return Err(GatewayFault::Rejected(parse_rejection(status, &body)));
    }

    match serde_json::from_str::<SuccessBody>(&body) {
        Ok(ok) => {
            debug!(msg_id = %id_to_string(&ok.msg_id), "Gateway accepted push");
            Ok(PushResult {
                msg_id: id_to_string(&ok.msg_id),
                sendno: ok.sendno.as_ref().map(id_to_string),
            })
        }
        Err(e) => {
            warn!(status, error = %e, "Gateway accepted push with an unreadable response");
            Ok(PushResult::new(String::new()))
        }
    }
}

fn parse_rejection(status: u16, body: &str) -> Rejection {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => Rejection {
            status,
            code: parsed.error.code,
            message: parsed.error.message,
            msg_id: parsed.msg_id.as_ref().map(id_to_string),
        },
        Err(_) => Rejection::new(status, 0, body.trim()),
    }
}

/// Ids arrive either as JSON strings or numbers.
fn id_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// Gateway response types

#[derive(Deserialize)]
struct SuccessBody {
    msg_id: Value,
    #[serde(default)]
    sendno: Option<Value>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
    #[serde(default)]
    msg_id: Option<Value>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: i64,
    #[serde(default)]
    message: String,
}
