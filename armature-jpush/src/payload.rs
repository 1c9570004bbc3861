//! Gateway-ready push payloads.
//!
//! A [`PushPayload`] is assembled once through [`PushPayloadBuilder`] and is
//! immutable afterwards. Environment defaults (APNs channel, offline
//! retention) are not applied here; the dispatcher fills them into a copy
//! right before submission, so the same payload can be logged or reused
//! before those values are known.
//!
//! ```
//! use armature_jpush::{Audience, Notification, PlatformSet, PushPayload};
//!
//! let payload = PushPayload::builder()
//!     .platform(PlatformSet::android())
//!     .audience(Audience::tag(["tag1"]))
//!     .notification(Notification::alert("hello"))
//!     .build()
//!     .unwrap();
//! assert!(payload.notification().is_some());
//! ```

use serde::{Serialize, Serializer};

use crate::options::{MAX_BIG_PUSH_DURATION, MAX_TIME_TO_LIVE};
use crate::{
    Audience, Badge, DeliveryDefaults, DeliveryOptions, Extras, InAppMessage, IosNotification,
    Notification, Platform, PlatformSet, PushError, Result, SmsMessage,
};

/// An assembled push request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushPayload {
    platform: PlatformSet,
    audience: Audience,
    notification: Option<Notification>,
    message: Option<InAppMessage>,
    sms: Option<SmsMessage>,
    options: DeliveryOptions,
}

impl PushPayload {
    /// Create a builder.
    pub fn builder() -> PushPayloadBuilder {
        PushPayloadBuilder::new()
    }

    /// Alert to every device on every platform.
    pub fn alert_all(alert: impl Into<String>) -> Result<Self> {
        Self::builder()
            .platform(PlatformSet::all())
            .audience(Audience::all())
            .notification(Notification::alert(alert))
            .build()
    }

    /// Alert to every device on every platform, with an SMS fallback.
    pub fn alert_all_with_sms(alert: impl Into<String>, sms: SmsMessage) -> Result<Self> {
        Self::builder()
            .platform(PlatformSet::all())
            .audience(Audience::all())
            .notification(Notification::alert(alert))
            .sms(sms)
            .build()
    }

    /// In-app message to every device on every platform.
    pub fn message_all(content: impl Into<String>) -> Result<Self> {
        Self::builder()
            .platform(PlatformSet::all())
            .audience(Audience::all())
            .message(InAppMessage::content(content))
            .build()
    }

    /// Android notification to every device on every platform.
    pub fn android_all(
        alert: impl Into<String>,
        title: impl Into<String>,
        extras: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self> {
        Self::builder()
            .platform(PlatformSet::all())
            .audience(Audience::all())
            .notification(Notification::android(alert, title, extras))
            .build()
    }

    /// Android notification to every Android device.
    pub fn android_only(
        alert: impl Into<String>,
        title: impl Into<String>,
        extras: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self> {
        Self::builder()
            .platform(PlatformSet::android())
            .audience(Audience::all())
            .notification(Notification::android(alert, title, extras))
            .build()
    }

    /// iOS notification to every iOS device.
    pub fn ios_only(
        alert: impl Into<String>,
        badge: u32,
        sound: impl Into<String>,
        extras: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self> {
        let ios = IosNotification::new()
            .alert(alert)
            .badge(badge)
            .sound(sound)
            .extras(extras);

        Self::builder()
            .platform(PlatformSet::ios())
            .audience(Audience::all())
            .notification(Notification::builder().ios(ios).build())
            .build()
    }

    /// Targeted platforms.
    pub fn platform(&self) -> &PlatformSet {
        &self.platform
    }

    /// Recipients.
    pub fn audience(&self) -> &Audience {
        &self.audience
    }

    /// Tray notification, if any.
    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// In-app message, if any.
    pub fn message(&self) -> Option<&InAppMessage> {
        self.message.as_ref()
    }

    /// SMS fallback, if any.
    pub fn sms(&self) -> Option<&SmsMessage> {
        self.sms.as_ref()
    }

    /// Delivery options as set by the caller.
    pub fn options(&self) -> &DeliveryOptions {
        &self.options
    }

    /// Copy of this payload with unset options filled from `defaults`.
    #[must_use]
    pub fn with_defaults(&self, defaults: &DeliveryDefaults) -> Self {
        Self {
            options: self.options.with_defaults(defaults),
            ..self.clone()
        }
    }

    /// Render the gateway JSON body.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for PushPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        WirePayload::from(self).serialize(serializer)
    }
}

/// Builder for push payloads.
#[derive(Debug, Clone, Default)]
pub struct PushPayloadBuilder {
    platform: Option<PlatformSet>,
    audience: Option<Audience>,
    notification: Option<Notification>,
    message: Option<InAppMessage>,
    sms: Option<SmsMessage>,
    options: DeliveryOptions,
}

impl PushPayloadBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the targeted platforms.
    pub fn platform(mut self, platform: PlatformSet) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Set the recipients.
    pub fn audience(mut self, audience: Audience) -> Self {
        self.audience = Some(audience);
        self
    }

    /// Set the tray notification.
    pub fn notification(mut self, notification: Notification) -> Self {
        self.notification = Some(notification);
        self
    }

    /// Set the in-app message.
    pub fn message(mut self, message: InAppMessage) -> Self {
        self.message = Some(message);
        self
    }

    /// Set the SMS fallback.
    pub fn sms(mut self, sms: SmsMessage) -> Self {
        self.sms = Some(sms);
        self
    }

    /// Set the delivery options.
    pub fn options(mut self, options: DeliveryOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate and assemble the payload.
    pub fn build(self) -> Result<PushPayload> {
        let platform = self
            .platform
            .ok_or_else(|| PushError::InvalidPayload("platform is not set".to_string()))?;
        if platform.is_empty() {
            return Err(PushError::InvalidPayload(
                "platform selection is empty".to_string(),
            ));
        }

        let audience = self
            .audience
            .ok_or_else(|| PushError::InvalidAudience("audience is not set".to_string()))?;
        audience.validate()?;

        if self.notification.is_none() && self.message.is_none() && self.sms.is_none() {
            return Err(PushError::InvalidPayload(
                "one of notification, message or sms must be set".to_string(),
            ));
        }

        if let Some(notification) = &self.notification
            && !platform
                .platforms()
                .into_iter()
                .any(|p| notification.alert_for(p).is_some())
        {
            return Err(PushError::InvalidPayload(
                "notification has no alert for the targeted platforms".to_string(),
            ));
        }

        if self.message.as_ref().is_some_and(|m| m.content.is_empty()) {
            return Err(PushError::InvalidPayload(
                "message content is empty".to_string(),
            ));
        }

        if self.sms.as_ref().is_some_and(|s| s.text.is_empty()) {
            return Err(PushError::InvalidPayload("sms text is empty".to_string()));
        }

        if let Some(ttl) = self.options.time_to_live
            && ttl > MAX_TIME_TO_LIVE
        {
            return Err(PushError::InvalidPayload(format!(
                "time_to_live {} exceeds {} seconds",
                ttl, MAX_TIME_TO_LIVE
            )));
        }

        if let Some(minutes) = self.options.big_push_duration
            && minutes > MAX_BIG_PUSH_DURATION
        {
            return Err(PushError::InvalidPayload(format!(
                "big_push_duration {} exceeds {} minutes",
                minutes, MAX_BIG_PUSH_DURATION
            )));
        }

        Ok(PushPayload {
            platform,
            audience,
            notification: self.notification,
            message: self.message,
            sms: self.sms,
            options: self.options,
        })
    }
}

// Gateway wire types

#[derive(Serialize)]
struct WirePayload<'a> {
    platform: &'a PlatformSet,
    audience: &'a Audience,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<WireNotification<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a InAppMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sms_message: Option<&'a SmsMessage>,
    options: &'a DeliveryOptions,
}

impl<'a> From<&'a PushPayload> for WirePayload<'a> {
    fn from(payload: &'a PushPayload) -> Self {
        Self {
            platform: &payload.platform,
            audience: &payload.audience,
            notification: payload
                .notification
                .as_ref()
                .map(|n| WireNotification::new(n, &payload.platform)),
            message: payload.message.as_ref(),
            sms_message: payload.sms.as_ref(),
            options: &payload.options,
        }
    }
}

#[derive(Serialize)]
struct WireNotification<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    alert: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    android: Option<WireAndroid<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ios: Option<WireIos<'a>>,
}

impl<'a> WireNotification<'a> {
    fn new(notification: &'a Notification, platform: &PlatformSet) -> Self {
        let android = (platform.contains(Platform::Android)
            && (notification.android.is_some()
                || notification.title.is_some()
                || !notification.extras.is_empty()))
        .then(|| {
            let specific = notification.android.as_ref();
            WireAndroid {
                alert: notification.alert_for(Platform::Android),
                title: specific
                    .and_then(|a| a.title.as_deref())
                    .or(notification.title.as_deref()),
                builder_id: specific.and_then(|a| a.builder_id),
                extras: notification.extras_for(Platform::Android),
            }
        });

        let ios = (platform.contains(Platform::Ios)
            && (notification.ios.is_some() || !notification.extras.is_empty()))
        .then(|| {
            let specific = notification.ios.as_ref();
            WireIos {
                alert: notification.alert_for(Platform::Ios),
                badge: specific.and_then(|i| i.badge),
                sound: specific.and_then(|i| i.sound.as_deref()),
                content_available: specific.is_some_and(|i| i.content_available),
                mutable_content: specific.is_some_and(|i| i.mutable_content),
                category: specific.and_then(|i| i.category.as_deref()),
                extras: notification.extras_for(Platform::Ios),
            }
        });

        Self {
            alert: notification.alert.as_deref(),
            android,
            ios,
        }
    }
}

#[derive(Serialize)]
struct WireAndroid<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    alert: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    builder_id: Option<u32>,
    #[serde(skip_serializing_if = "Extras::is_empty")]
    extras: Extras,
}

#[derive(Serialize)]
struct WireIos<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    alert: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    badge: Option<Badge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sound: Option<&'a str>,
    #[serde(rename = "content-available", skip_serializing_if = "is_false")]
    content_available: bool,
    #[serde(rename = "mutable-content", skip_serializing_if = "is_false")]
    mutable_content: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "Extras::is_empty")]
    extras: Extras,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AndroidNotification, AudienceTarget};
    use serde_json::json;

    fn ios_tag_and_payload() -> Result<PushPayload> {
        PushPayload::builder()
            .platform(PlatformSet::ios())
            .audience(Audience::tag_and(["tag1", "tag_all"]))
            .notification(
                Notification::builder()
                    .ios(
                        IosNotification::new()
                            .alert("hi")
                            .badge(5)
                            .sound("happy")
                            .extra("from", "JPush"),
                    )
                    .build(),
            )
            .message(InAppMessage::content("body"))
            .options(DeliveryOptions::new().apns_production(true))
            .build()
    }

    #[test]
    fn test_alert_all() {
        let payload = PushPayload::alert_all("hello").unwrap();
        assert_eq!(payload.platform(), &PlatformSet::All);
        assert!(payload.audience().is_all());
        assert_eq!(
            payload.notification().and_then(|n| n.alert.as_deref()),
            Some("hello")
        );
        assert!(payload.message().is_none());
        assert_eq!(payload.options(), &DeliveryOptions::default());
    }

    #[test]
    fn test_alert_all_with_sms() {
        let payload =
            PushPayload::alert_all_with_sms("hello", SmsMessage::content("Test SMS", 10)).unwrap();
        assert_eq!(payload.sms(), Some(&SmsMessage::content("Test SMS", 10)));
    }

    #[test]
    fn test_message_all() {
        let payload = PushPayload::message_all("body").unwrap();
        assert!(payload.notification().is_none());
        assert_eq!(payload.message().map(|m| m.content.as_str()), Some("body"));
    }

    #[test]
    fn test_missing_content_is_rejected() {
        let result = PushPayload::builder()
            .platform(PlatformSet::all())
            .audience(Audience::all())
            .build();
        assert!(matches!(result, Err(PushError::InvalidPayload(_))));
    }

    #[test]
    fn test_missing_audience_is_rejected() {
        let result = PushPayload::builder()
            .platform(PlatformSet::all())
            .notification(Notification::alert("x"))
            .build();
        assert!(matches!(result, Err(PushError::InvalidAudience(_))));
    }

    #[test]
    fn test_empty_platform_is_rejected() {
        let result = PushPayload::builder()
            .platform(PlatformSet::of([]))
            .audience(Audience::all())
            .notification(Notification::alert("x"))
            .build();
        assert!(matches!(result, Err(PushError::InvalidPayload(_))));
    }

    #[test]
    fn test_notification_without_alert_is_rejected() {
        let result = PushPayload::builder()
            .platform(PlatformSet::android())
            .audience(Audience::all())
            .notification(
                Notification::builder()
                    .android(AndroidNotification::new().title("only a title"))
                    .build(),
            )
            .build();
        assert!(matches!(result, Err(PushError::InvalidPayload(_))));
    }

    #[test]
    fn test_alert_only_for_untargeted_platform_is_rejected() {
        let result = PushPayload::builder()
            .platform(PlatformSet::android())
            .audience(Audience::all())
            .notification(
                Notification::builder()
                    .ios(IosNotification::new().alert("ios only"))
                    .build(),
            )
            .build();
        assert!(matches!(result, Err(PushError::InvalidPayload(_))));

        let payload = PushPayload::builder()
            .platform(PlatformSet::android_and_ios())
            .audience(Audience::all())
            .notification(
                Notification::builder()
                    .ios(IosNotification::new().alert("ios only"))
                    .build(),
            )
            .build()
            .unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap()["notification"],
            json!({"ios": {"alert": "ios only"}})
        );
    }

    #[test]
    fn test_audience_with_empty_group_is_rejected() {
        let build = |audience: Audience| {
            PushPayload::builder()
                .platform(PlatformSet::all())
                .audience(audience)
                .notification(Notification::alert("x"))
                .build()
        };

        assert!(matches!(
            build(Audience::tag(Vec::<String>::new())),
            Err(PushError::InvalidAudience(_))
        ));
        assert!(matches!(
            build(Audience::Targets(std::collections::BTreeMap::new())),
            Err(PushError::InvalidAudience(_))
        ));
    }

    #[test]
    fn test_empty_sms_is_rejected() {
        let result = PushPayload::alert_all_with_sms("hello", SmsMessage::content("", 10));
        assert!(matches!(result, Err(PushError::InvalidPayload(_))));
    }

    #[test]
    fn test_ttl_limit() {
        let result = PushPayload::builder()
            .platform(PlatformSet::all())
            .audience(Audience::all())
            .notification(Notification::alert("x"))
            .options(DeliveryOptions::new().time_to_live(MAX_TIME_TO_LIVE + 1))
            .build();
        assert!(matches!(result, Err(PushError::InvalidPayload(_))));
    }

    #[test]
    fn test_same_calls_build_equal_payloads() {
        assert_eq!(ios_tag_and_payload().unwrap(), ios_tag_and_payload().unwrap());
    }

    #[test]
    fn test_notification_and_message_together() {
        let payload = ios_tag_and_payload().unwrap();
        assert!(payload.notification().is_some());
        assert!(payload.message().is_some());

        let defaulted = payload.with_defaults(&DeliveryDefaults {
            apns_production: false,
            time_to_live: 86_400,
        });
        assert_eq!(defaulted.options().apns_production, Some(true));
        assert_eq!(defaulted.options().time_to_live, Some(86_400));
        // caller payload is left as built
        assert_eq!(payload.options().time_to_live, None);
    }

    #[test]
    fn test_wire_format_alert_all() {
        let payload = PushPayload::alert_all("hello").unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "platform": "all",
                "audience": "all",
                "notification": {"alert": "hello"},
                "options": {}
            })
        );
    }

    #[test]
    fn test_wire_format_ios_tag_and() {
        let payload = ios_tag_and_payload().unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "platform": ["ios"],
                "audience": {"tag_and": ["tag1", "tag_all"]},
                "notification": {
                    "ios": {
                        "alert": "hi",
                        "badge": 5,
                        "sound": "happy",
                        "extras": {"from": "JPush"}
                    }
                },
                "message": {"msg_content": "body"},
                "options": {"apns_production": true}
            })
        );
    }

    #[test]
    fn test_wire_format_android_and_ios() {
        let payload = PushPayload::builder()
            .platform(PlatformSet::android_and_ios())
            .audience(Audience::tag(["tag1"]))
            .notification(
                Notification::builder()
                    .alert("alert content")
                    .android(AndroidNotification::new().title("Android Title"))
                    .ios(IosNotification::new().incr_badge(1).extra("extra_key", "extra_value"))
                    .build(),
            )
            .build()
            .unwrap();

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "platform": ["android", "ios"],
                "audience": {"tag": ["tag1"]},
                "notification": {
                    "alert": "alert content",
                    "android": {"alert": "alert content", "title": "Android Title"},
                    "ios": {
                        "alert": "alert content",
                        "badge": "+1",
                        "extras": {"extra_key": "extra_value"}
                    }
                },
                "options": {}
            })
        );
    }

    #[test]
    fn test_wire_format_audience_and_sms() {
        let payload = PushPayload::builder()
            .platform(PlatformSet::android_and_ios())
            .audience(
                Audience::builder()
                    .target(AudienceTarget::tag(["tag1", "tag2"]))
                    .target(AudienceTarget::alias(["alias1", "alias2"]))
                    .build()
                    .unwrap(),
            )
            .message(InAppMessage::content("msg").extra("from", "JPush"))
            .sms(SmsMessage::content("Test SMS", 10))
            .options(DeliveryOptions::new().sendno(3).time_to_live(60))
            .build()
            .unwrap();

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "platform": ["android", "ios"],
                "audience": {"tag": ["tag1", "tag2"], "alias": ["alias1", "alias2"]},
                "message": {"msg_content": "msg", "extras": {"from": "JPush"}},
                "sms_message": {"content": "Test SMS", "delay_time": 10},
                "options": {"sendno": 3, "time_to_live": 60}
            })
        );
    }

    #[test]
    fn test_common_extras_reach_targeted_platforms_only() {
        let payload = PushPayload::builder()
            .platform(PlatformSet::android())
            .audience(Audience::all())
            .notification(Notification::builder().alert("a").extra("k", "v").build())
            .build()
            .unwrap();

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["notification"]["android"]["extras"], json!({"k": "v"}));
        assert!(value["notification"].get("ios").is_none());
    }
}
