//! Gateway configuration.

use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::{DeliveryDefaults, PushError, Result};

/// Default push endpoint of the gateway.
pub const DEFAULT_ENDPOINT: &str = "https://api.jpush.cn/v3/push";

/// Gateway configuration.
///
/// Constructed explicitly and handed to the [`Dispatcher`](crate::Dispatcher)
/// and [`JPushClient`](crate::JPushClient); never stored globally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JPushConfig {
    /// Application key.
    pub app_key: String,
    /// Master secret paired with the application key.
    pub master_secret: String,
    /// Push endpoint URL.
    pub endpoint: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Default APNs channel.
    pub apns_production: bool,
    /// Default offline retention in seconds.
    pub time_to_live: u64,
}

impl JPushConfig {
    /// Create a configuration with default endpoint and delivery defaults.
    pub fn new(app_key: impl Into<String>, master_secret: impl Into<String>) -> Self {
        let defaults = DeliveryDefaults::default();
        Self {
            app_key: app_key.into(),
            master_secret: master_secret.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
            apns_production: defaults.apns_production,
            time_to_live: defaults.time_to_live,
        }
    }

    /// Load from `JPUSH_*` environment variables.
    ///
    /// `JPUSH_APP_KEY` and `JPUSH_MASTER_SECRET` are required;
    /// `JPUSH_ENDPOINT`, `JPUSH_APNS_PRODUCTION`, `JPUSH_TIME_TO_LIVE` and
    /// `JPUSH_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| PushError::Config(format!("{} is not set", key)))
        };

        let mut config = Self::new(required("JPUSH_APP_KEY")?, required("JPUSH_MASTER_SECRET")?);

        if let Some(endpoint) = lookup("JPUSH_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(value) = lookup("JPUSH_APNS_PRODUCTION") {
            config.apns_production = parse_bool(&value).ok_or_else(|| {
                PushError::Config(format!("JPUSH_APNS_PRODUCTION: invalid bool '{}'", value))
            })?;
        }
        if let Some(value) = lookup("JPUSH_TIME_TO_LIVE") {
            config.time_to_live = value
                .parse::<u64>()
                .map_err(|e| PushError::Config(format!("JPUSH_TIME_TO_LIVE: {}", e)))?;
        }
        if let Some(value) = lookup("JPUSH_TIMEOUT_SECS") {
            let secs: u64 = value
                .parse()
                .map_err(|e| PushError::Config(format!("JPUSH_TIMEOUT_SECS: {}", e)))?;
            config.timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct RawConfig {
            app_key: String,
            master_secret: String,
            #[serde(default)]
            endpoint: Option<String>,
            #[serde(default)]
            timeout_secs: Option<u64>,
            #[serde(default)]
            apns_production: Option<bool>,
            #[serde(default)]
            time_to_live: Option<u64>,
        }

        let raw: RawConfig =
            serde_json::from_str(json).map_err(|e| PushError::Config(e.to_string()))?;

        let mut config = Self::new(raw.app_key, raw.master_secret);
        if let Some(endpoint) = raw.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(secs) = raw.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(production) = raw.apns_production {
            config.apns_production = production;
        }
        if let Some(ttl) = raw.time_to_live {
            config.time_to_live = ttl;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Default to the APNs production channel.
    pub fn production(mut self) -> Self {
        self.apns_production = true;
        self
    }

    /// Default to the APNs sandbox channel.
    pub fn development(mut self) -> Self {
        self.apns_production = false;
        self
    }

    /// Set the default offline retention in seconds.
    pub fn time_to_live(mut self, seconds: u64) -> Self {
        self.time_to_live = seconds;
        self
    }

    /// Delivery defaults applied at send time.
    pub fn defaults(&self) -> DeliveryDefaults {
        DeliveryDefaults {
            apns_production: self.apns_production,
            time_to_live: self.time_to_live,
        }
    }

    /// Check the configuration for obvious mistakes.
    pub fn validate(&self) -> Result<()> {
        if self.app_key.trim().is_empty() {
            return Err(PushError::Config("app_key is empty".to_string()));
        }
        if self.master_secret.trim().is_empty() {
            return Err(PushError::Config("master_secret is empty".to_string()));
        }
        Url::parse(&self.endpoint)
            .map_err(|e| PushError::Config(format!("invalid endpoint '{}': {}", self.endpoint, e)))?;
        self.defaults().validate()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
