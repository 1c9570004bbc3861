//! Observability sinks for dispatch outcomes.

use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{DispatchError, PushResult};

/// Outcome of one `send` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Gateway accepted the push.
    Success(PushResult),
    /// Send failed with a classified error.
    Failure(DispatchError),
}

/// Structured record of one `send` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Id generated for the send attempt.
    pub request_id: Uuid,
    /// What happened.
    pub outcome: DispatchOutcome,
}

impl DispatchReport {
    /// Check if the push was accepted.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, DispatchOutcome::Success(_))
    }
}

/// Receives exactly one report per dispatched payload.
pub trait OutcomeSink: Send + Sync {
    /// Record a dispatch outcome.
    fn record(&self, report: &DispatchReport);
}

impl<T: OutcomeSink + ?Sized> OutcomeSink for Arc<T> {
    fn record(&self, report: &DispatchReport) {
        (**self).record(report);
    }
}

/// Sink that reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl OutcomeSink for TracingSink {
    fn record(&self, report: &DispatchReport) {
        let request_id = report.request_id;
        match &report.outcome {
            DispatchOutcome::Success(result) => {
                info!(
                    %request_id,
                    msg_id = %result.msg_id,
                    sendno = ?result.sendno,
                    "Push accepted by gateway"
                );
            }
            DispatchOutcome::Failure(DispatchError::Transport(cause)) => {
                warn!(%request_id, error = %cause, "Connection error, should retry later");
            }
            DispatchOutcome::Failure(DispatchError::Rejected {
                status,
                code,
                message,
                msg_id,
            }) => {
                error!(
                    %request_id,
                    status,
                    code,
                    message = %message,
                    msg_id = ?msg_id,
                    "Error response from gateway, review and fix the request"
                );
            }
        }
    }
}

/// Sink that discards reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl OutcomeSink for NoopSink {
    fn record(&self, _report: &DispatchReport) {}
}
