//! # Armature JPush
//!
//! Cross-platform push composition and delivery through the JPush gateway.
//!
//! ## Features
//!
//! - **Audiences**: `all`, tags (union or intersection), aliases,
//!   registration ids and segments, combined across groups
//! - **Content**: common alerts, Android and iOS overrides, in-app messages
//!   and SMS fallback
//! - **Environment defaults**: APNs channel and offline retention filled in
//!   at send time, never baked into the payload
//! - **Failure classification**: retryable transport errors versus gateway
//!   rejections that need a corrected payload
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use armature_jpush::{Dispatcher, JPushConfig, PushPayload};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = JPushConfig::from_env()?;
//!     let dispatcher = Dispatcher::from_config(&config)?;
//!
//!     let payload = PushPayload::alert_all("Hello!")?;
//!     match dispatcher.send(&payload).await {
//!         Ok(result) => println!("sent, msg_id = {}", result.msg_id),
//!         Err(e) if e.is_retryable() => { /* back off and resubmit */ }
//!         Err(e) => eprintln!("fix the request: {}", e),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Targeted pushes
//!
//! ```rust,ignore
//! use armature_jpush::prelude::*;
//!
//! let payload = PushPayload::builder()
//!     .platform(PlatformSet::ios())
//!     .audience(Audience::tag_and(["tag1", "tag_all"]))
//!     .notification(
//!         Notification::builder()
//!             .ios(IosNotification::new().alert("hi").badge(5).sound("happy"))
//!             .build(),
//!     )
//!     .message(InAppMessage::content("body"))
//!     .options(DeliveryOptions::new().apns_production(true))
//!     .build()?;
//! ```

mod audience;
mod config;
mod dispatcher;
mod error;
mod message;
mod notification;
mod options;
mod payload;
mod platform;
mod provider;
mod sink;

#[cfg(feature = "client")]
mod client;

pub use audience::{Audience, AudienceBuilder, AudienceTarget, AudienceType, Device};
pub use config::{DEFAULT_ENDPOINT, JPushConfig};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, GatewayFault, PushError, Rejection, Result};
pub use message::{InAppMessage, SmsMessage};
pub use notification::{
    AndroidNotification, Badge, Extras, IosNotification, Notification, NotificationBuilder,
};
pub use options::{DeliveryDefaults, DeliveryOptions, MAX_BIG_PUSH_DURATION, MAX_TIME_TO_LIVE};
pub use payload::{PushPayload, PushPayloadBuilder};
pub use platform::{Platform, PlatformSet};
pub use provider::{GatewaySender, PushResult};
pub use sink::{DispatchOutcome, DispatchReport, NoopSink, OutcomeSink, TracingSink};

#[cfg(feature = "client")]
pub use client::JPushClient;

/// Prelude for common imports.
///
/// ```
/// use armature_jpush::prelude::*;
/// ```
pub mod prelude {
    pub use crate::audience::{Audience, AudienceTarget};
    pub use crate::config::JPushConfig;
    pub use crate::dispatcher::Dispatcher;
    pub use crate::error::{DispatchError, PushError, Result};
    pub use crate::message::{InAppMessage, SmsMessage};
    pub use crate::notification::{AndroidNotification, Badge, IosNotification, Notification};
    pub use crate::options::DeliveryOptions;
    pub use crate::payload::PushPayload;
    pub use crate::platform::PlatformSet;
    pub use crate::provider::{GatewaySender, PushResult};
    pub use crate::sink::{OutcomeSink, TracingSink};

    #[cfg(feature = "client")]
    pub use crate::client::JPushClient;
}
