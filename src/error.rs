use crate::domain::checkout::{CheckoutId, ValidationFailure};
use crate::domain::session::PendingStep;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// Transport-level failure reported by the checkout service.
    #[error("Checkout service error: {0}")]
    Service(String),
    /// Field-tagged failures; the only error subject to classification.
    #[error("Checkout validation failed ({} field errors)", .0.len())]
    Validation(Vec<ValidationFailure>),
    #[error("Event rejected: {in_flight:?} is still in flight")]
    ConcurrentEvent { in_flight: PendingStep },
    /// The host's own payment provider failed before any service call.
    #[error("Payment processing error: {0}")]
    Processing(String),
    #[error("Session {0} is no longer active")]
    SessionInactive(CheckoutId),
    #[error("Malformed host message: {0}")]
    MalformedMessage(String),
    #[error("Unknown host event kind: {0}")]
    UnknownEvent(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Validation failures carried by this error, if it is a validation error.
    pub fn validation_failures(&self) -> Option<&[ValidationFailure]> {
        match self {
            Self::Validation(failures) => Some(failures),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
