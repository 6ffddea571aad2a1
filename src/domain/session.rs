use super::checkout::{CheckoutId, CheckoutSnapshot};
use super::host::SessionOutcome;
use std::sync::Arc;

/// Which service step the session is waiting on while an event is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingStep {
    #[default]
    None,
    /// `setShippingAddress` for a shipping contact update.
    AwaitingShippingAddress,
    /// `setFinalFields` carrying the full shipping contact.
    AwaitingShippingContact,
    /// `setShippingLine`, either chosen by the host or the default selection.
    AwaitingShippingLine,
    /// `setFinalFields` with the email only.
    AwaitingFinalFields,
    AwaitingPayment,
}

/// The single checkout in progress on this device.
///
/// A `Session` is a value: every transition returns a new session and the
/// snapshot is shared behind an `Arc`, so a reader holding an older session
/// never observes a half-applied mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    checkout_id: CheckoutId,
    snapshot: Arc<CheckoutSnapshot>,
    pending_step: PendingStep,
    outcome: Option<SessionOutcome>,
}

impl Session {
    pub fn new(snapshot: CheckoutSnapshot) -> Self {
        Self {
            checkout_id: snapshot.id.clone(),
            snapshot: Arc::new(snapshot),
            pending_step: PendingStep::None,
            outcome: None,
        }
    }

    pub fn checkout_id(&self) -> &CheckoutId {
        &self.checkout_id
    }

    pub fn snapshot(&self) -> &Arc<CheckoutSnapshot> {
        &self.snapshot
    }

    pub fn pending_step(&self) -> PendingStep {
        self.pending_step
    }

    /// `None` while the session is live.
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    pub fn is_active(&self) -> bool {
        self.outcome.is_none()
    }

    pub fn is_idle(&self) -> bool {
        self.pending_step == PendingStep::None
    }

    pub fn with_pending_step(&self, step: PendingStep) -> Self {
        Self {
            pending_step: step,
            ..self.clone()
        }
    }

    pub fn with_snapshot(&self, snapshot: CheckoutSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            ..self.clone()
        }
    }

    pub fn terminated(&self, outcome: SessionOutcome) -> Self {
        Self {
            outcome: Some(outcome),
            ..self.clone()
        }
    }
}
