use super::checkout::{MailingAddress, NativePayment, ShippingMethod, SummaryItem};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token the host uses to match a response to the event that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationToken(String);

impl CorrelationToken {
    /// Returns `None` for an empty or blank token.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of outcomes the host understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    Success,
    Failure,
    InvalidShippingAddress,
    InvalidShippingContact,
    InvalidBillingAddress,
    Unserviceable,
}

impl AuthorizationStatus {
    /// Whether the host re-renders its summary screen for this status.
    pub fn renders_summary(self) -> bool {
        !matches!(self, Self::Failure | Self::InvalidBillingAddress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostErrorKind {
    InvalidShippingAddress,
    InvalidShippingContact,
    InvalidBillingAddress,
    Unserviceable,
}

impl HostErrorKind {
    pub fn status(self) -> AuthorizationStatus {
        match self {
            Self::InvalidShippingAddress => AuthorizationStatus::InvalidShippingAddress,
            Self::InvalidShippingContact => AuthorizationStatus::InvalidShippingContact,
            Self::InvalidBillingAddress => AuthorizationStatus::InvalidBillingAddress,
            Self::Unserviceable => AuthorizationStatus::Unserviceable,
        }
    }
}

/// A structured, field-level error the host can attach to its UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostError {
    pub kind: HostErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl HostError {
    pub fn new(kind: HostErrorKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// The synthesized error for an address no shipping rate serves.
    pub fn unserviceable(message: impl Into<String>) -> Self {
        Self {
            kind: HostErrorKind::Unserviceable,
            field: None,
            message: message.into(),
        }
    }
}

/// The single response delivered for a host event.
///
/// Summary items and shipping methods are only kept for statuses that make the
/// host re-render its summary (see [`AuthorizationStatus::renders_summary`]).
/// Errors never accompany `Success` or `Failure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostResponse {
    pub status: AuthorizationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_items: Option<Vec<SummaryItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_methods: Option<Vec<ShippingMethod>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<HostError>>,
}

impl HostResponse {
    pub fn new(status: AuthorizationStatus) -> Self {
        Self {
            status,
            summary_items: None,
            shipping_methods: None,
            errors: None,
        }
    }

    pub fn success() -> Self {
        Self::new(AuthorizationStatus::Success)
    }

    pub fn failure() -> Self {
        Self::new(AuthorizationStatus::Failure)
    }

    pub fn with_summary(mut self, items: Vec<SummaryItem>) -> Self {
        if self.status.renders_summary() {
            self.summary_items = Some(items);
        }
        self
    }

    pub fn with_shipping_methods(mut self, methods: Vec<ShippingMethod>) -> Self {
        if self.status.renders_summary() {
            self.shipping_methods = Some(methods);
        }
        self
    }

    pub fn with_errors(mut self, errors: Vec<HostError>) -> Self {
        if !matches!(
            self.status,
            AuthorizationStatus::Success | AuthorizationStatus::Failure
        ) {
            self.errors = Some(errors);
        }
        self
    }
}

/// How the host's payment sheet was dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    #[serde(alias = "Success")]
    Completed,
    Cancelled,
    Failed,
}

/// An event emitted by the host's payment sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The user picked one of the shipping options the host was offered.
    ShippingIdentifierUpdate(String),
    /// The user changed the (possibly partial) shipping contact.
    ShippingContactUpdate(MailingAddress),
    PaymentAuthorization(NativePayment),
    SessionTerminated(SessionOutcome),
}

impl HostEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ShippingIdentifierUpdate(_) => "shipping_identifier_update",
            Self::ShippingContactUpdate(_) => "shipping_contact_update",
            Self::PaymentAuthorization(_) => "payment_authorization",
            Self::SessionTerminated(_) => "session_terminated",
        }
    }
}
