//! In-app messages and SMS fallback content.

use serde::{Deserialize, Serialize};

use crate::Extras;

/// In-app ("silent") message.
///
/// Delivered to the app without an OS-level display; the app decides how to
/// handle it. May travel alongside a tray [`Notification`](crate::Notification).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InAppMessage {
    /// Message body.
    #[serde(rename = "msg_content")]
    pub content: String,
    /// Message title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Content type hint for the app.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Custom data.
    #[serde(default, skip_serializing_if = "Extras::is_empty")]
    pub extras: Extras,
}

impl InAppMessage {
    /// Message with only a body, no tray notification.
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the content type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Add one extra.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }
}

/// SMS fallback sent when the push is not delivered online in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsMessage {
    /// SMS text.
    #[serde(rename = "content")]
    pub text: String,
    /// Seconds to wait for online delivery before falling back to SMS.
    #[serde(rename = "delay_time")]
    pub delay_seconds: u32,
}

impl SmsMessage {
    /// Create an SMS fallback.
    pub fn content(text: impl Into<String>, delay_seconds: u32) -> Self {
        Self {
            text: text.into(),
            delay_seconds,
        }
    }
}
