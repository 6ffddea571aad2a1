use crate::error::{BridgeError, Result};
use serde::Deserialize;
use std::path::Path;

/// Settings for the payment bridge. Every field has a default, so an empty
/// JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Label of the total line in the price summary.
    pub merchant_name: String,
    /// `type` of the tokenized payment submitted to the checkout service.
    pub payment_type: String,
    pub unserviceable_message: String,
    pub processing_error_message: String,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            merchant_name: "TOTAL".to_string(),
            payment_type: "apple_pay".to_string(),
            unserviceable_message: "Shipping address is in an unserviceable area".to_string(),
            processing_error_message: "Unable to retrieve a payment from the user's payment \
                provider. Fallback to web checkout."
                .to_string(),
            log_filter: "warn".to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    fn validate(&self) -> Result<()> {
        if self.payment_type.trim().is_empty() {
            return Err(BridgeError::Config("payment_type must not be empty".to_string()));
        }
        if self.merchant_name.trim().is_empty() {
            return Err(BridgeError::Config("merchant_name must not be empty".to_string()));
        }
        Ok(())
    }
}
