use crate::domain::ports::CheckoutObserver;
use crate::error::BridgeError;
use tracing::{info, warn};

/// Reports terminal checkout notifications through `tracing`.
///
/// Used by the CLI where no UI layer is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CheckoutObserver for TracingObserver {
    fn on_checkout_completed(&self) {
        info!("checkout completed");
    }

    fn on_checkout_cancelled(&self) {
        info!("checkout cancelled");
    }

    fn on_checkout_failed(&self, error: &BridgeError) {
        warn!(%error, "checkout failed");
    }
}
