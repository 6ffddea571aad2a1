//! Maps checkout validation failures onto the host's authorization vocabulary.

use super::checkout::ValidationFailure;
use super::host::{AuthorizationStatus, HostError, HostErrorKind};

/// Address fields sent as part of a full mailing address.
pub const SHIPPING_ADDRESS_FIELDS: [&str; 6] =
    ["address1", "address2", "city", "country", "province", "zip"];

/// Contact fields sent as part of a full mailing address.
pub const SHIPPING_CONTACT_FIELDS: [&str; 3] = ["firstName", "lastName", "phone"];

/// The only address fields the host discloses before the user authorizes.
pub const PARTIAL_SHIPPING_ADDRESS_FIELDS: [&str; 4] = ["city", "country", "province", "zip"];

pub const EMAIL_FIELD: &str = "email";

/// Host-side name of the email contact field.
pub const HOST_EMAIL_FIELD: &str = "emailAddress";

/// Selects the rule set applied to a list of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassificationContext {
    /// `submitTokenizedPayment`: billing or shipping address prefixes.
    CheckoutMutation,
    /// `setFinalFields`: address, contact and email fields.
    FullShippingAndContact,
    /// `setShippingAddress` with a partial address: geographic fields only.
    PartialShippingAddress,
    /// `setShippingLine`: never classified.
    ShippingLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Classified {
        status: AuthorizationStatus,
        errors: Vec<HostError>,
    },
    /// A failure could not be attributed; the host gets a bare `Failure`.
    Abandoned,
}

impl Classification {
    pub fn status(&self) -> AuthorizationStatus {
        match self {
            Self::Classified { status, .. } => *status,
            Self::Abandoned => AuthorizationStatus::Failure,
        }
    }

    pub fn into_parts(self) -> (AuthorizationStatus, Vec<HostError>) {
        match self {
            Self::Classified { status, errors } => (status, errors),
            Self::Abandoned => (AuthorizationStatus::Failure, Vec::new()),
        }
    }
}

/// Classifies `failures` in arrival order under the rules of `context`.
///
/// Errors accumulate in arrival order while the aggregate status is the one
/// of the last matched failure. In every context but
/// [`ClassificationContext::PartialShippingAddress`] the first unrecognized
/// failure abandons classification; a failure with an empty field path
/// abandons in every context. An empty list yields `Failure`.
///
/// The partial-address rules only look at shipping fields: a geographic
/// field under `billingAddress` is skipped like any other unmatched failure.
pub fn classify(failures: &[ValidationFailure], context: ClassificationContext) -> Classification {
    if context == ClassificationContext::ShippingLine {
        return Classification::Abandoned;
    }

    let mut status = AuthorizationStatus::Failure;
    let mut errors = Vec::new();

    for failure in failures {
        let Some(last) = failure.last_segment() else {
            return Classification::Abandoned;
        };

        let matched = match context {
            ClassificationContext::CheckoutMutation => match_checkout_mutation(failure, last),
            ClassificationContext::FullShippingAndContact => match_full_shipping(failure, last),
            ClassificationContext::PartialShippingAddress => {
                if PARTIAL_SHIPPING_ADDRESS_FIELDS.contains(&last)
                    && !failure.has_segment("billingAddress")
                {
                    Some(HostError::new(
                        HostErrorKind::InvalidShippingAddress,
                        last,
                        &failure.message,
                    ))
                } else {
                    continue;
                }
            }
            ClassificationContext::ShippingLine => None,
        };

        let Some(error) = matched else {
            return Classification::Abandoned;
        };
        status = error.kind.status();
        errors.push(error);
    }

    Classification::Classified { status, errors }
}

fn match_checkout_mutation(failure: &ValidationFailure, last: &str) -> Option<HostError> {
    let kind = if failure.has_segment("billingAddress") {
        HostErrorKind::InvalidBillingAddress
    } else if failure.has_segment("shippingAddress") {
        HostErrorKind::InvalidShippingAddress
    } else {
        return None;
    };
    Some(HostError::new(kind, last, &failure.message))
}

fn match_full_shipping(failure: &ValidationFailure, last: &str) -> Option<HostError> {
    if SHIPPING_ADDRESS_FIELDS.contains(&last) {
        Some(HostError::new(
            HostErrorKind::InvalidShippingAddress,
            last,
            &failure.message,
        ))
    } else if SHIPPING_CONTACT_FIELDS.contains(&last) {
        Some(HostError::new(
            HostErrorKind::InvalidShippingContact,
            last,
            &failure.message,
        ))
    } else if last == EMAIL_FIELD {
        Some(HostError::new(
            HostErrorKind::InvalidShippingContact,
            HOST_EMAIL_FIELD,
            &failure.message,
        ))
    } else {
        None
    }
}
