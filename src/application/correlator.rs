use super::orchestrator::SessionOrchestrator;
use crate::domain::host::{CorrelationToken, HostEvent, HostResponse};
use crate::error::{BridgeError, Result};
use crate::interfaces::json::host_message;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// A host event together with the token its response must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMessage {
    pub token: CorrelationToken,
    pub event: HostEvent,
}

#[derive(Debug)]
pub enum Reply {
    Response(HostResponse),
    /// The event never reached the checkout flow (e.g. a concurrent event).
    Rejected(BridgeError),
}

/// What the host receives for one inbound event.
#[derive(Debug)]
pub struct OutboundMessage {
    pub token: CorrelationToken,
    pub reply: Reply,
}

/// Obligation to answer one inbound event.
///
/// `resolve` consumes the handle, so a second resolution does not compile.
/// Dropping an unresolved handle is a bug: it is logged, and asserts in
/// debug builds.
#[derive(Debug)]
pub struct ResponseHandle {
    token: CorrelationToken,
    outbound: Option<mpsc::UnboundedSender<OutboundMessage>>,
}

impl ResponseHandle {
    pub fn token(&self) -> &CorrelationToken {
        &self.token
    }

    pub fn resolve(mut self, outcome: Result<HostResponse>) {
        let Some(outbound) = self.outbound.take() else {
            return;
        };
        let reply = match outcome {
            Ok(response) => Reply::Response(response),
            Err(err) => Reply::Rejected(err),
        };
        let message = OutboundMessage {
            token: self.token.clone(),
            reply,
        };
        if outbound.send(message).is_err() {
            warn!(token = %self.token, "host channel closed, response dropped");
        }
    }
}

impl Drop for ResponseHandle {
    fn drop(&mut self) {
        if self.outbound.is_some() {
            error!(token = %self.token, "response handle dropped without a response");
            debug_assert!(
                std::thread::panicking(),
                "response handle {} dropped without a response",
                self.token
            );
        }
    }
}

/// Pairs every inbound host event with exactly one outbound response.
///
/// Responses are delivered on the receiver returned by [`MessageCorrelator::new`]
/// in the order the events complete; since the orchestrator runs one event at a
/// time, that is the order the host sent them.
#[derive(Clone)]
pub struct MessageCorrelator {
    orchestrator: Arc<SessionOrchestrator>,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
}

impl MessageCorrelator {
    pub fn new(
        orchestrator: Arc<SessionOrchestrator>,
    ) -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (outbound, inbound) = mpsc::unbounded_channel();
        (
            Self {
                orchestrator,
                outbound,
            },
            inbound,
        )
    }

    pub fn orchestrator(&self) -> &Arc<SessionOrchestrator> {
        &self.orchestrator
    }

    pub fn open(&self, token: CorrelationToken) -> ResponseHandle {
        ResponseHandle {
            token,
            outbound: Some(self.outbound.clone()),
        }
    }

    /// Decodes a raw host message and processes it. Messages without a usable
    /// token or with an unknown event kind are logged and dropped.
    pub async fn receive(&self, raw: &str) {
        match host_message::decode(raw) {
            Ok(message) => self.submit(message).await,
            Err(err) => warn!(%err, "dropping host message"),
        }
    }

    pub async fn submit(&self, message: HostMessage) {
        let handle = self.open(message.token);
        let outcome = self.orchestrator.dispatch(message.event).await;
        match &outcome {
            Ok(response) => {
                debug!(token = %handle.token(), status = ?response.status, "responding to host")
            }
            Err(err) => warn!(token = %handle.token(), %err, "rejecting host event"),
        }
        handle.resolve(outcome);
    }
}
