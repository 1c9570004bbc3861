//! Tray notification content.

use serde::ser::Serializer;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::Platform;

/// Custom key/value data delivered with a notification or message.
pub type Extras = BTreeMap<String, String>;

/// iOS badge instruction.
///
/// Setting and incrementing are mutually exclusive for one send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    /// Set the badge to an absolute value.
    Set(u32),
    /// Adjust the device's last known badge by a relative amount.
    Increment(i32),
}

impl Serialize for Badge {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Set(value) => serializer.serialize_u32(*value),
            Self::Increment(delta) => serializer.serialize_str(&format!("{delta:+}")),
        }
    }
}

/// Android-specific notification fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AndroidNotification {
    /// Alert text, overriding the common alert.
    pub alert: Option<String>,
    /// Notification title.
    pub title: Option<String>,
    /// Notification layout id configured in the client SDK.
    pub builder_id: Option<u32>,
    /// Android extras, added on top of the common extras.
    pub extras: Extras,
}

impl AndroidNotification {
    /// Create an empty override.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the alert.
    pub fn alert(mut self, alert: impl Into<String>) -> Self {
        self.alert = Some(alert.into());
        self
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the builder id.
    pub fn builder_id(mut self, id: u32) -> Self {
        self.builder_id = Some(id);
        self
    }

    /// Add one extra.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// Add several extras.
    pub fn extras(mut self, extras: impl IntoIterator<Item = (String, String)>) -> Self {
        self.extras.extend(extras);
        self
    }
}

/// iOS-specific notification fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IosNotification {
    /// Alert text, overriding the common alert.
    pub alert: Option<String>,
    /// Badge instruction.
    pub badge: Option<Badge>,
    /// Sound file name.
    pub sound: Option<String>,
    /// Wake the app in the background.
    pub content_available: bool,
    /// Let a notification service extension modify the content.
    pub mutable_content: bool,
    /// Notification category.
    pub category: Option<String>,
    /// iOS extras, added on top of the common extras.
    pub extras: Extras,
}

impl IosNotification {
    /// Create an empty override.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the alert.
    pub fn alert(mut self, alert: impl Into<String>) -> Self {
        self.alert = Some(alert.into());
        self
    }

    /// Set the badge to an absolute value.
    pub fn badge(mut self, badge: u32) -> Self {
        self.badge = Some(Badge::Set(badge));
        self
    }

    /// Increment the badge by `delta`.
    pub fn incr_badge(mut self, delta: i32) -> Self {
        self.badge = Some(Badge::Increment(delta));
        self
    }

    /// Set the sound.
    pub fn sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }

    /// Mark as content-available.
    pub fn content_available(mut self) -> Self {
        self.content_available = true;
        self
    }

    /// Enable mutable content.
    pub fn mutable_content(mut self) -> Self {
        self.mutable_content = true;
        self
    }

    /// Set the category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Add one extra.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// Add several extras.
    pub fn extras(mut self, extras: impl IntoIterator<Item = (String, String)>) -> Self {
        self.extras.extend(extras);
        self
    }
}

/// Tray notification content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    /// Alert shared by every platform.
    pub alert: Option<String>,
    /// Title shared by every platform.
    pub title: Option<String>,
    /// Extras shared by every platform.
    pub extras: Extras,
    /// Android override.
    pub android: Option<AndroidNotification>,
    /// iOS override.
    pub ios: Option<IosNotification>,
}

impl Notification {
    /// Notification with only the common alert set.
    pub fn alert(alert: impl Into<String>) -> Self {
        Self {
            alert: Some(alert.into()),
            ..Default::default()
        }
    }

    /// Notification carrying an Android override.
    pub fn android(
        alert: impl Into<String>,
        title: impl Into<String>,
        extras: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self::builder()
            .android(
                AndroidNotification::new()
                    .alert(alert)
                    .title(title)
                    .extras(extras),
            )
            .build()
    }

    /// Notification carrying an iOS override.
    pub fn ios(
        alert: impl Into<String>,
        badge: Option<Badge>,
        sound: Option<String>,
        extras: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let ios = IosNotification {
            alert: Some(alert.into()),
            badge,
            sound,
            ..Default::default()
        };
        Self::builder().ios(ios.extras(extras)).build()
    }

    /// Create a builder.
    pub fn builder() -> NotificationBuilder {
        NotificationBuilder::new()
    }

    /// Alert shown on `platform`: the override's alert, else the common one.
    pub fn alert_for(&self, platform: Platform) -> Option<&str> {
        let specific = match platform {
            Platform::Android => self.android.as_ref().and_then(|a| a.alert.as_deref()),
            Platform::Ios => self.ios.as_ref().and_then(|i| i.alert.as_deref()),
        };
        specific.or(self.alert.as_deref())
    }

    /// Extras delivered on `platform`: common extras, overlaid by the
    /// platform's own.
    pub fn extras_for(&self, platform: Platform) -> Extras {
        let specific = match platform {
            Platform::Android => self.android.as_ref().map(|a| &a.extras),
            Platform::Ios => self.ios.as_ref().map(|i| &i.extras),
        };

        let mut merged = self.extras.clone();
        if let Some(specific) = specific {
            merged.extend(specific.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }

    /// Check if any alert is present.
    pub fn has_alert(&self) -> bool {
        self.alert.is_some()
            || self.android.as_ref().is_some_and(|a| a.alert.is_some())
            || self.ios.as_ref().is_some_and(|i| i.alert.is_some())
    }
}

/// Builder for notifications.
#[derive(Default)]
pub struct NotificationBuilder {
    notification: Notification,
}

impl NotificationBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the common alert.
    pub fn alert(mut self, alert: impl Into<String>) -> Self {
        self.notification.alert = Some(alert.into());
        self
    }

    /// Set the common title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.notification.title = Some(title.into());
        self
    }

    /// Add a common extra.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.notification.extras.insert(key.into(), value.into());
        self
    }

    /// Set the Android override.
    pub fn android(mut self, android: AndroidNotification) -> Self {
        self.notification.android = Some(android);
        self
    }

    /// Set the iOS override.
    pub fn ios(mut self, ios: IosNotification) -> Self {
        self.notification.ios = Some(ios);
        self
    }

    /// Build the notification.
    pub fn build(self) -> Notification {
        self.notification
    }
}
