//! Cross-cutting delivery options.

use serde::{Deserialize, Serialize};

use crate::{PushError, Result};

/// Longest offline retention the gateway accepts, in seconds (10 days).
pub const MAX_TIME_TO_LIVE: u64 = 864_000;

/// Longest window a large push may be spread over, in minutes.
pub const MAX_BIG_PUSH_DURATION: u32 = 1_400;

/// Delivery options of one push.
///
/// Unset (`None`) options are filled from [`DeliveryDefaults`] right before
/// the payload is submitted. Options set here are never overwritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOptions {
    /// Caller-chosen number echoed back by the gateway.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sendno: Option<u32>,
    /// Offline retention in seconds. `0` means do not store offline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_live: Option<u64>,
    /// Message id of an earlier push this one replaces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_msg_id: Option<u64>,
    /// Use the APNs production channel instead of the sandbox.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apns_production: Option<bool>,
    /// Minutes to spread delivery over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub big_push_duration: Option<u32>,
}

impl DeliveryOptions {
    /// Create options with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the send number.
    pub fn sendno(mut self, sendno: u32) -> Self {
        self.sendno = Some(sendno);
        self
    }

    /// Set the offline retention in seconds.
    pub fn time_to_live(mut self, seconds: u64) -> Self {
        self.time_to_live = Some(seconds);
        self
    }

    /// Replace an earlier push.
    pub fn override_msg_id(mut self, msg_id: u64) -> Self {
        self.override_msg_id = Some(msg_id);
        self
    }

    /// Choose the APNs channel.
    pub fn apns_production(mut self, production: bool) -> Self {
        self.apns_production = Some(production);
        self
    }

    /// Spread delivery over `minutes`.
    pub fn big_push_duration(mut self, minutes: u32) -> Self {
        self.big_push_duration = Some(minutes);
        self
    }

    /// Fill unset environment-dependent options from `defaults`.
    #[must_use]
    pub fn with_defaults(self, defaults: &DeliveryDefaults) -> Self {
        Self {
            apns_production: self.apns_production.or(Some(defaults.apns_production)),
            time_to_live: self.time_to_live.or(Some(defaults.time_to_live)),
            ..self
        }
    }
}

/// Process-wide delivery defaults applied at send time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDefaults {
    /// APNs channel used when a payload does not choose one.
    pub apns_production: bool,
    /// Offline retention used when a payload does not choose one.
    pub time_to_live: u64,
}

impl Default for DeliveryDefaults {
    fn default() -> Self {
        Self {
            apns_production: false,
            time_to_live: 86_400,
        }
    }
}

impl DeliveryDefaults {
    /// Check the defaults against gateway limits.
    pub fn validate(&self) -> Result<()> {
        if self.time_to_live > MAX_TIME_TO_LIVE {
            return Err(PushError::Config(format!(
                "time_to_live {} exceeds {} seconds",
                self.time_to_live, MAX_TIME_TO_LIVE
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_unset() {
        let defaults = DeliveryDefaults {
            apns_production: true,
            time_to_live: 600,
        };
        let options = DeliveryOptions::new().with_defaults(&defaults);
        assert_eq!(options.apns_production, Some(true));
        assert_eq!(options.time_to_live, Some(600));
    }

    #[test]
    fn test_defaults_keep_explicit() {
        let defaults = DeliveryDefaults::default();
        let options = DeliveryOptions::new()
            .apns_production(true)
            .time_to_live(0)
            .sendno(7)
            .with_defaults(&defaults);
        assert_eq!(options.apns_production, Some(true));
        assert_eq!(options.time_to_live, Some(0));
        assert_eq!(options.sendno, Some(7));
    }

    #[test]
    fn test_defaults_validate_ttl() {
        assert!(DeliveryDefaults::default().validate().is_ok());

        let defaults = DeliveryDefaults {
            apns_production: false,
            time_to_live: MAX_TIME_TO_LIVE + 1,
        };
        assert!(matches!(defaults.validate(), Err(PushError::Config(_))));
    }

    #[test]
    fn test_unset_options_are_omitted() {
        let options = DeliveryOptions::new().time_to_live(60);
        assert_eq!(
            serde_json::to_value(options).unwrap(),
            serde_json::json!({"time_to_live": 60})
        );
    }
}
