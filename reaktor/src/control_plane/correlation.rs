//! Pending-request table keyed by correlation id.

use crate::error::ControlError;
use crate::types::control::Response;
use futures::channel::oneshot;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Successful resolution of a control-plane command.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlOutcome {
    Routed { source_ref: u64 },
    Unrouted,
    Authorized { auth_mask: u64, auth_expires: u64 },
    Unauthorized,
}

type ResultSink = oneshot::Sender<Result<ControlOutcome, ControlError>>;

/// Issues fresh correlation ids and resolves pending handles at most once.
///
/// Mutated only from the owning controller's turns; the broadcast transport
/// is the only cross-thread handoff point.
pub(crate) struct CorrelationTable {
    next_correlation_id: u64,
    pending: HashMap<u64, ResultSink>,
}

impl CorrelationTable {
    pub(crate) fn new() -> Self {
        Self {
            next_correlation_id: 1,
            pending: HashMap::new(),
        }
    }

    /// Allocates the next correlation id. Monotonic for the lifetime of the
    /// owning controller instance.
    pub(crate) fn next_correlation_id(&mut self) -> u64 {
        let correlation_id = self.next_correlation_id;
        self.next_correlation_id += 1;
        correlation_id
    }

    pub(crate) fn register(&mut self, correlation_id: u64) -> PendingResponse {
        let (sender, receiver) = oneshot::channel();
        self.pending.insert(correlation_id, sender);
        PendingResponse {
            correlation_id,
            receiver,
        }
    }

    /// Rolls back a registration whose command never reached the wire.
    pub(crate) fn unregister(&mut self, correlation_id: u64) {
        self.pending.remove(&correlation_id);
    }

    /// Resolves the matching handle, removing the entry. Returns `false`
    /// when no pending request matches; the caller discards the response.
    pub(crate) fn resolve(&mut self, response: &Response) -> bool {
        let Some(sink) = self.pending.remove(&response.correlation_id()) else {
            return false;
        };

        let resolution = match *response {
            Response::Routed { source_ref, .. } => Ok(ControlOutcome::Routed { source_ref }),
            Response::Unrouted { .. } => Ok(ControlOutcome::Unrouted),
            Response::Authorized {
                auth_mask,
                auth_expires,
                ..
            } => Ok(ControlOutcome::Authorized {
                auth_mask,
                auth_expires,
            }),
            Response::Unauthorized { .. } => Ok(ControlOutcome::Unauthorized),
            Response::Error { correlation_id } => {
                Err(ControlError::CommandFailed { correlation_id })
            }
        };

        // The caller may have dropped the handle; abandonment is silent.
        let _ = sink.send(resolution);
        true
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Caller-held handle for one issued command.
///
/// Resolves at most once. Poll with [`try_outcome`](Self::try_outcome) from
/// scheduler turns, or await it; dropping the handle abandons the request
/// silently. No timeout is enforced by this layer.
pub struct PendingResponse {
    correlation_id: u64,
    receiver: oneshot::Receiver<Result<ControlOutcome, ControlError>>,
}

impl PendingResponse {
    pub fn correlation_id(&self) -> u64 {
        self.correlation_id
    }

    /// Non-blocking check; `None` while the response is still outstanding.
    pub fn try_outcome(&mut self) -> Option<Result<ControlOutcome, ControlError>> {
        match self.receiver.try_recv() {
            Ok(Some(resolution)) => Some(resolution),
            Ok(None) => None,
            Err(_canceled) => Some(Err(ControlError::Abandoned)),
        }
    }
}

impl Future for PendingResponse {
    type Output = Result<ControlOutcome, ControlError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|resolved| resolved.unwrap_or(Err(ControlError::Abandoned)))
    }
}
