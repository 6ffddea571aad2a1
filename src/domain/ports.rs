use super::checkout::{
    CheckoutId, CheckoutSnapshot, MailingAddress, ShippingFields, TokenizedPayment,
};
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// The remote cart/checkout service.
///
/// Each mutation resolves to the updated snapshot, or to
/// [`BridgeError::Validation`] for field-tagged rejections. Any other error is
/// treated as a transport failure. Timeouts and retries are the
/// implementation's concern.
#[async_trait]
pub trait CheckoutService: Send + Sync {
    async fn set_shipping_address(
        &self,
        checkout_id: &CheckoutId,
        address: MailingAddress,
    ) -> Result<CheckoutSnapshot>;

    async fn set_shipping_line(
        &self,
        checkout_id: &CheckoutId,
        shipping_rate_handle: &str,
    ) -> Result<CheckoutSnapshot>;

    async fn set_final_fields(
        &self,
        checkout_id: &CheckoutId,
        email: &str,
        shipping: Option<ShippingFields>,
    ) -> Result<CheckoutSnapshot>;

    async fn submit_tokenized_payment(
        &self,
        checkout_id: &CheckoutId,
        payment: TokenizedPayment,
    ) -> Result<CheckoutSnapshot>;
}

/// UI-layer collaborator notified when the payment sheet is dismissed.
pub trait CheckoutObserver: Send + Sync {
    fn on_checkout_completed(&self);
    fn on_checkout_cancelled(&self);
    /// `error` is a [`BridgeError::Processing`]: the host's payment provider
    /// failed, not the checkout service.
    fn on_checkout_failed(&self, error: &BridgeError);
}

pub type CheckoutServiceArc = Arc<dyn CheckoutService>;
pub type CheckoutObserverArc = Arc<dyn CheckoutObserver>;
