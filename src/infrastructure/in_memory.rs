use crate::domain::checkout::{
    CheckoutId, CheckoutSnapshot, MailingAddress, ShippingFields, ShippingRate, TokenizedPayment,
    ValidationFailure,
};
use crate::domain::ports::CheckoutService;
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The checkout service mutations, as recorded by [`InMemoryCheckoutService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SetShippingAddress,
    SetShippingLine,
    SetFinalFields,
    SubmitTokenizedPayment,
}

/// A failure returned by the next matching call instead of running it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedFailure {
    Transport(String),
    Validation(Vec<ValidationFailure>),
}

impl From<ScriptedFailure> for BridgeError {
    fn from(failure: ScriptedFailure) -> Self {
        match failure {
            ScriptedFailure::Transport(message) => BridgeError::Service(message),
            ScriptedFailure::Validation(failures) => BridgeError::Validation(failures),
        }
    }
}

/// Seed data for the simulated service: the checkout and the shipping rates
/// offered per country code.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutFixture {
    pub checkout: CheckoutSnapshot,
    #[serde(default)]
    pub shipping_rates: BTreeMap<String, Vec<ShippingRate>>,
}

impl CheckoutFixture {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

struct State {
    checkout: CheckoutSnapshot,
    shipping_rates: BTreeMap<String, Vec<ShippingRate>>,
    calls: Vec<Operation>,
    scripted: VecDeque<(Operation, ScriptedFailure)>,
}

/// A simulated checkout service holding a single checkout in memory.
///
/// Validates inputs the way the remote service does, answering with
/// field-tagged [`ValidationFailure`]s, and records every call it receives.
/// Clones share state.
#[derive(Clone)]
pub struct InMemoryCheckoutService {
    state: Arc<RwLock<State>>,
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn require(failures: &mut Vec<ValidationFailure>, value: &Option<String>, path: [&str; 2]) {
    if blank(value) {
        failures.push(ValidationFailure::new(path, "can't be blank"));
    }
}

impl InMemoryCheckoutService {
    pub fn new(fixture: CheckoutFixture) -> Self {
        Self {
            state: Arc::new(RwLock::new(State {
                checkout: fixture.checkout,
                shipping_rates: fixture.shipping_rates,
                calls: Vec::new(),
                scripted: VecDeque::new(),
            })),
        }
    }

    /// A USD checkout requiring shipping, with two rates for `US`, one for
    /// `CA`, and none elsewhere.
    pub fn sample() -> Self {
        let rate = |handle: &str, title: &str, price| ShippingRate {
            handle: handle.to_string(),
            title: title.to_string(),
            price,
        };
        let mut shipping_rates = BTreeMap::new();
        shipping_rates.insert(
            "US".to_string(),
            vec![
                rate("standard", "Standard Shipping", dec!(5.00)),
                rate("express", "Express Shipping", dec!(15.00)),
            ],
        );
        shipping_rates.insert(
            "CA".to_string(),
            vec![rate("intl", "International Shipping", dec!(20.00))],
        );

        Self::new(CheckoutFixture {
            checkout: CheckoutSnapshot {
                id: CheckoutId::new("checkout-1"),
                currency_code: "USD".to_string(),
                subtotal_price: dec!(40.00),
                total_tax: dec!(3.20),
                total_price: dec!(43.20),
                requires_shipping: true,
                email: None,
                shipping_address: None,
                shipping_line: None,
                available_shipping_rates: Vec::new(),
                completed: false,
            },
            shipping_rates,
        })
    }

    pub async fn snapshot(&self) -> CheckoutSnapshot {
        self.state.read().await.checkout.clone()
    }

    /// Every call received so far, in order.
    pub async fn calls(&self) -> Vec<Operation> {
        self.state.read().await.calls.clone()
    }

    pub async fn call_count(&self, operation: Operation) -> usize {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter(|op| **op == operation)
            .count()
    }

    /// Makes the next call of `operation` fail with `failure`.
    pub async fn script_failure(&self, operation: Operation, failure: ScriptedFailure) {
        self.state.write().await.scripted.push_back((operation, failure));
    }

    /// Records the call and returns the scripted failure for it, if any.
    async fn enter(&self, operation: Operation, checkout_id: &CheckoutId) -> Result<()> {
        let mut state = self.state.write().await;
        state.calls.push(operation);

        if let Some(index) = state.scripted.iter().position(|(op, _)| *op == operation)
            && let Some((_, failure)) = state.scripted.remove(index)
        {
            return Err(failure.into());
        }
        if state.checkout.id != *checkout_id {
            return Err(BridgeError::Service(format!("checkout {checkout_id} not found")));
        }
        Ok(())
    }
}

impl State {
    fn rates_for(&self, address: &MailingAddress) -> Vec<ShippingRate> {
        address
            .country
            .as_ref()
            .and_then(|country| self.shipping_rates.get(country))
            .cloned()
            .unwrap_or_default()
    }

    fn select_rate(&mut self, handle: &str) -> std::result::Result<(), ValidationFailure> {
        let rate = self
            .checkout
            .available_shipping_rates
            .iter()
            .find(|rate| rate.handle == handle)
            .cloned()
            .ok_or_else(|| ValidationFailure::new(["shippingRateHandle"], "is invalid"))?;
        self.checkout.shipping_line = Some(rate);
        self.checkout.recompute_total();
        Ok(())
    }

    fn apply_address(&mut self, address: MailingAddress) {
        self.checkout.available_shipping_rates = self.rates_for(&address);
        self.checkout.shipping_address = Some(address);
        self.checkout.shipping_line = None;
        self.checkout.recompute_total();
    }
}

#[async_trait]
impl CheckoutService for InMemoryCheckoutService {
    async fn set_shipping_address(
        &self,
        checkout_id: &CheckoutId,
        address: MailingAddress,
    ) -> Result<CheckoutSnapshot> {
        self.enter(Operation::SetShippingAddress, checkout_id).await?;

        let mut failures = Vec::new();
        require(&mut failures, &address.country, ["shippingAddress", "country"]);
        require(&mut failures, &address.zip, ["shippingAddress", "zip"]);
        if !failures.is_empty() {
            return Err(BridgeError::Validation(failures));
        }

        let mut state = self.state.write().await;
        state.apply_address(address);
        Ok(state.checkout.clone())
    }

    async fn set_shipping_line(
        &self,
        checkout_id: &CheckoutId,
        shipping_rate_handle: &str,
    ) -> Result<CheckoutSnapshot> {
        self.enter(Operation::SetShippingLine, checkout_id).await?;

        let mut state = self.state.write().await;
        state
            .select_rate(shipping_rate_handle)
            .map_err(|failure| BridgeError::Validation(vec![failure]))?;
        Ok(state.checkout.clone())
    }

    async fn set_final_fields(
        &self,
        checkout_id: &CheckoutId,
        email: &str,
        shipping: Option<ShippingFields>,
    ) -> Result<CheckoutSnapshot> {
        self.enter(Operation::SetFinalFields, checkout_id).await?;

        let mut failures = Vec::new();
        if !email.contains('@') {
            failures.push(ValidationFailure::new(["email"], "is invalid"));
        }
        if let Some(fields) = &shipping {
            let address = &fields.shipping_address;
            require(&mut failures, &address.address1, ["shippingAddress", "address1"]);
            require(&mut failures, &address.city, ["shippingAddress", "city"]);
            require(&mut failures, &address.country, ["shippingAddress", "country"]);
            require(&mut failures, &address.zip, ["shippingAddress", "zip"]);
            require(&mut failures, &address.last_name, ["shippingAddress", "lastName"]);
        }
        if !failures.is_empty() {
            return Err(BridgeError::Validation(failures));
        }

        let mut state = self.state.write().await;
        let selection = match &shipping {
            Some(fields) => {
                let previous_line = state
                    .checkout
                    .shipping_line
                    .as_ref()
                    .map(|line| line.handle.clone());
                let handle = fields.shipping_identifier.clone().or(previous_line);
                if let Some(handle) = &handle
                    && !state
                        .rates_for(&fields.shipping_address)
                        .iter()
                        .any(|rate| &rate.handle == handle)
                {
                    return Err(BridgeError::Validation(vec![ValidationFailure::new(
                        ["shippingRateHandle"],
                        "is invalid",
                    )]));
                }
                handle
            }
            None => None,
        };

        // The handle is known to be offered, so the checkout is written whole.
        state.checkout.email = Some(email.to_string());
        if let Some(fields) = shipping {
            state.apply_address(fields.shipping_address);
            if let Some(handle) = selection {
                state
                    .select_rate(&handle)
                    .map_err(|failure| BridgeError::Validation(vec![failure]))?;
            }
        }
        Ok(state.checkout.clone())
    }

    async fn submit_tokenized_payment(
        &self,
        checkout_id: &CheckoutId,
        payment: TokenizedPayment,
    ) -> Result<CheckoutSnapshot> {
        self.enter(Operation::SubmitTokenizedPayment, checkout_id).await?;

        let mut state = self.state.write().await;
        let mut failures = Vec::new();
        require(&mut failures, &payment.billing_address.country, ["billingAddress", "country"]);
        require(&mut failures, &payment.billing_address.zip, ["billingAddress", "zip"]);
        if payment.payment_data.trim().is_empty() {
            failures.push(ValidationFailure::new(["payment", "paymentData"], "can't be blank"));
        }
        if payment.payment_amount.amount != state.checkout.total_price
            || payment.payment_amount.currency_code != state.checkout.currency_code
        {
            failures.push(ValidationFailure::new(
                ["payment", "paymentAmount"],
                "does not match the checkout total",
            ));
        }
        if state.checkout.requires_shipping && state.checkout.shipping_line.is_none() {
            failures.push(ValidationFailure::new(["shippingLine"], "can't be blank"));
        }
        if !failures.is_empty() {
            return Err(BridgeError::Validation(failures));
        }

        state.checkout.completed = true;
        Ok(state.checkout.clone())
    }
}
