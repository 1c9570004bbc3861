//! Payload dispatch and failure classification.

use std::sync::Arc;
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

use crate::{
    DeliveryDefaults, DispatchError, DispatchOutcome, DispatchReport, GatewaySender,
    OutcomeSink, PushPayload, PushResult, TracingSink,
};

/// Submits payloads to the gateway and classifies the result.
///
/// A dispatcher holds no mutable state; one instance can serve concurrent
/// sends. It never retries: a [`DispatchError::Transport`] is returned to the
/// caller, who decides when to resubmit.
#[derive(Clone)]
pub struct Dispatcher {
    sender: Arc<dyn GatewaySender>,
    sink: Arc<dyn OutcomeSink>,
    defaults: DeliveryDefaults,
}

impl Dispatcher {
    /// Create a dispatcher reporting through [`TracingSink`].
    ///
    /// Fails with [`PushError::Config`](crate::PushError::Config) when the defaults exceed gateway
    /// limits.
    pub fn new(
        sender: impl GatewaySender + 'static,
        defaults: DeliveryDefaults,
    ) -> crate::Result<Self> {
        defaults.validate()?;
        Ok(Self {
            sender: Arc::new(sender),
            sink: Arc::new(TracingSink),
            defaults,
        })
    }

    /// Create a dispatcher backed by the HTTP gateway client.
    #[cfg(feature = "client")]
    pub fn from_config(config: &crate::JPushConfig) -> crate::Result<Self> {
        let client = crate::JPushClient::new(config.clone())?;
        Self::new(client, config.defaults())
    }

    /// Replace the observability sink.
    pub fn with_sink(mut self, sink: impl OutcomeSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Replace the delivery defaults, e.g. after a configuration reload.
    pub fn with_defaults(mut self, defaults: DeliveryDefaults) -> crate::Result<Self> {
        defaults.validate()?;
        self.defaults = defaults;
        Ok(self)
    }

    /// Delivery defaults applied to unset options.
    pub fn defaults(&self) -> &DeliveryDefaults {
        &self.defaults
    }

    /// Send a payload.
    ///
    /// Unset delivery options are filled from the defaults on a copy; the
    /// caller's payload is left as built. Every call reports exactly once to
    /// the sink.
    pub async fn send(&self, payload: &PushPayload) -> Result<PushResult, DispatchError> {
        let request_id = Uuid::new_v4();
        let payload = payload.with_defaults(&self.defaults);

        debug!(
            %request_id,
            payload = %payload.to_json().unwrap_or_default(),
            "Submitting push"
        );

        let result = self
            .sender
            .submit(&payload)
            .instrument(info_span!("jpush_submit", %request_id))
            .await
            .map_err(DispatchError::from);

        let outcome = match &result {
            Ok(push) => DispatchOutcome::Success(push.clone()),
            Err(err) => DispatchOutcome::Failure(err.clone()),
        };
        self.sink.record(&DispatchReport {
            request_id,
            outcome,
        });

        result
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeliveryOptions, GatewayFault, PushError, Rejection};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubGateway {
        response: Result<PushResult, GatewayFault>,
        seen: Mutex<Vec<PushPayload>>,
    }

    impl StubGateway {
        fn new(response: Result<PushResult, GatewayFault>) -> Arc<Self> {
            Arc::new(Self {
                response,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl GatewaySender for StubGateway {
        async fn submit(&self, payload: &PushPayload) -> Result<PushResult, GatewayFault> {
            self.seen.lock().unwrap().push(payload.clone());
            self.response.clone()
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        reports: Mutex<Vec<DispatchReport>>,
    }

    impl OutcomeSink for RecordingSink {
        fn record(&self, report: &DispatchReport) {
            self.reports.lock().unwrap().push(report.clone());
        }
    }

    fn defaults() -> DeliveryDefaults {
        DeliveryDefaults {
            apns_production: false,
            time_to_live: 86_400,
        }
    }

    #[tokio::test]
    async fn test_send_success() {
        let gateway = StubGateway::new(Ok(PushResult::new("42")));
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = Dispatcher::new(gateway.clone(), defaults())
            .unwrap()
            .with_sink(sink.clone());

        let payload = PushPayload::alert_all("hello").unwrap();
        let result = dispatcher.send(&payload).await.unwrap();

        assert_eq!(result, PushResult::new("42"));
        let reports = sink.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(
            reports[0].outcome,
            DispatchOutcome::Success(PushResult::new("42"))
        );
    }

    #[tokio::test]
    async fn test_defaults_applied_before_submit() {
        let gateway = StubGateway::new(Ok(PushResult::new("1")));
        let dispatcher = Dispatcher::new(gateway.clone(), defaults()).unwrap();

        let payload = PushPayload::alert_all("hello").unwrap();
        dispatcher.send(&payload).await.unwrap();

        let seen = gateway.seen.lock().unwrap();
        assert_eq!(
            seen[0].options(),
            &DeliveryOptions::new().apns_production(false).time_to_live(86_400)
        );
        assert_eq!(payload.options(), &DeliveryOptions::new());
    }

    #[tokio::test]
    async fn test_transport_fault() {
        let gateway = StubGateway::new(Err(GatewayFault::Connection("timed out".into())));
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = Dispatcher::new(gateway, defaults())
            .unwrap()
            .with_sink(sink.clone());

        let err = dispatcher
            .send(&PushPayload::alert_all("hello").unwrap())
            .await
            .unwrap_err();

        assert_eq!(err, DispatchError::Transport("timed out".into()));
        assert!(err.is_retryable());
        let reports = sink.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert!(!reports[0].is_success());
    }

    #[tokio::test]
    async fn test_rejection() {
        let gateway = StubGateway::new(Err(GatewayFault::Rejected(Rejection::new(
            400,
            1003,
            "parameter value is invalid",
        ))));
        let dispatcher = Dispatcher::new(gateway, defaults())
            .unwrap()
            .with_sink(crate::NoopSink);

        let err = dispatcher
            .send(&PushPayload::alert_all("hello").unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_with_defaults_replaces_defaults() {
        let gateway = StubGateway::new(Ok(PushResult::new("1")));
        let reloaded = DeliveryDefaults {
            apns_production: true,
            time_to_live: 60,
        };
        let dispatcher = Dispatcher::new(gateway, defaults())
            .unwrap()
            .with_defaults(reloaded)
            .unwrap();
        assert_eq!(dispatcher.defaults(), &reloaded);
    }

    #[test]
    fn test_defaults_over_ttl_limit_are_rejected() {
        let too_long = DeliveryDefaults {
            apns_production: false,
            time_to_live: crate::MAX_TIME_TO_LIVE + 1,
        };

        let gateway = StubGateway::new(Ok(PushResult::new("1")));
        assert!(matches!(
            Dispatcher::new(gateway.clone(), too_long),
            Err(PushError::Config(_))
        ));

        let dispatcher = Dispatcher::new(gateway, defaults()).unwrap();
        assert!(matches!(
            dispatcher.clone().with_defaults(too_long),
            Err(PushError::Config(_))
        ));
        assert_eq!(dispatcher.defaults(), &defaults());
    }
}
