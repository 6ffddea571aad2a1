use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a checkout on the remote checkout service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutId(pub String);

impl CheckoutId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A field-tagged validation error returned by a checkout mutation.
///
/// `field` locates the offending input, outermost segment first
/// (e.g. `["shippingAddress", "zip"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub field: Vec<String>,
    pub message: String,
}

impl ValidationFailure {
    pub fn new<S: Into<String>>(
        field: impl IntoIterator<Item = S>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    /// The discriminating key used for classification.
    pub fn last_segment(&self) -> Option<&str> {
        self.field.last().map(String::as_str)
    }

    pub fn has_segment(&self, segment: &str) -> bool {
        self.field.iter().any(|s| s == segment)
    }
}

/// Mailing address as collected by the host. Before authorization the host only
/// discloses a partial address (city, province, zip, country).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailingAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A shipping rate offered by the checkout service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRate {
    pub handle: String,
    pub title: String,
    pub price: Decimal,
}

/// A shipping option as presented to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethod {
    pub identifier: String,
    pub label: String,
    pub price_estimate: Decimal,
}

impl From<&ShippingRate> for ShippingMethod {
    fn from(rate: &ShippingRate) -> Self {
        Self {
            identifier: rate.handle.clone(),
            label: rate.title.clone(),
            price_estimate: rate.price,
        }
    }
}

/// One line of the price summary the host renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryItem {
    pub label: String,
    pub amount: Decimal,
}

impl SummaryItem {
    fn new(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// Immutable view of the checkout after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSnapshot {
    pub id: CheckoutId,
    pub currency_code: String,
    pub subtotal_price: Decimal,
    pub total_tax: Decimal,
    pub total_price: Decimal,
    pub requires_shipping: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<MailingAddress>,
    #[serde(default)]
    pub shipping_line: Option<ShippingRate>,
    #[serde(default)]
    pub available_shipping_rates: Vec<ShippingRate>,
    #[serde(default)]
    pub completed: bool,
}

impl CheckoutSnapshot {
    /// Shipping options in the order the service returned them.
    pub fn shipping_methods(&self) -> Vec<ShippingMethod> {
        self.available_shipping_rates
            .iter()
            .map(ShippingMethod::from)
            .collect()
    }

    /// Price summary lines, ending with the total labelled by `merchant_name`.
    pub fn summary_items(&self, merchant_name: &str) -> Vec<SummaryItem> {
        let mut items = vec![SummaryItem::new("SUBTOTAL", self.subtotal_price)];
        if let Some(line) = &self.shipping_line {
            items.push(SummaryItem::new("SHIPPING", line.price));
        }
        items.push(SummaryItem::new("TAXES", self.total_tax));
        items.push(SummaryItem::new(merchant_name, self.total_price));
        items
    }

    /// Recomputes `total_price` from subtotal, tax and the selected shipping line.
    pub fn recompute_total(&mut self) {
        let shipping = self
            .shipping_line
            .as_ref()
            .map_or(Decimal::ZERO, |line| line.price);
        self.total_price = self.subtotal_price + self.total_tax + shipping;
    }
}

/// Shipping details sent alongside the final checkout fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingFields {
    pub shipping_address: MailingAddress,
    pub shipping_identifier: Option<String>,
}

/// Payment payload the host hands over once the user authorized the payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativePayment {
    pub email: String,
    pub billing_address: MailingAddress,
    #[serde(default)]
    pub shipping_address: Option<MailingAddress>,
    #[serde(default)]
    pub shipping_identifier: Option<String>,
    pub transaction_identifier: String,
    pub payment_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyInput {
    pub amount: Decimal,
    pub currency_code: String,
}

/// Input for `submitTokenizedPayment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizedPayment {
    pub payment_amount: MoneyInput,
    pub billing_address: MailingAddress,
    pub idempotency_key: String,
    pub payment_data: String,
    pub r#type: String,
}

impl TokenizedPayment {
    /// Charges the checkout's current total with the host-provided credential.
    pub fn for_checkout(
        checkout: &CheckoutSnapshot,
        payment: &NativePayment,
        payment_type: &str,
    ) -> Self {
        Self {
            payment_amount: MoneyInput {
                amount: checkout.total_price,
                currency_code: checkout.currency_code.clone(),
            },
            billing_address: payment.billing_address.clone(),
            idempotency_key: payment.transaction_identifier.clone(),
            payment_data: payment.payment_data.clone(),
            r#type: payment_type.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot() -> CheckoutSnapshot {
        CheckoutSnapshot {
            id: CheckoutId::new("c1"),
            currency_code: "USD".to_string(),
            subtotal_price: dec!(40.00),
            total_tax: dec!(3.20),
            total_price: dec!(43.20),
            requires_shipping: true,
            email: None,
            shipping_address: None,
            shipping_line: None,
            available_shipping_rates: vec![
                ShippingRate {
                    handle: "std".to_string(),
                    title: "Standard".to_string(),
                    price: dec!(5.00),
                },
                ShippingRate {
                    handle: "exp".to_string(),
                    title: "Express".to_string(),
                    price: dec!(15.00),
                },
            ],
            completed: false,
        }
    }

    #[test]
    fn test_summary_items_without_shipping_line() {
        let items = snapshot().summary_items("Hat Shop");
        let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["SUBTOTAL", "TAXES", "Hat Shop"]);
        assert_eq!(items[2].amount, dec!(43.20));
    }

    #[test]
    fn test_summary_items_with_shipping_line() {
        let mut checkout = snapshot();
        checkout.shipping_line = Some(checkout.available_shipping_rates[1].clone());
        checkout.recompute_total();

        let items = checkout.summary_items("Hat Shop");
        assert_eq!(items[1], SummaryItem::new("SHIPPING", dec!(15.00)));
        assert_eq!(items.last().unwrap().amount, dec!(58.20));
    }

    #[test]
    fn test_shipping_methods_keep_service_order() {
        let methods = snapshot().shipping_methods();
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].identifier, "std");
        assert_eq!(methods[0].label, "Standard");
        assert_eq!(methods[1].price_estimate, dec!(15.00));
    }

    #[test]
    fn test_validation_failure_last_segment() {
        let failure = ValidationFailure::new(["shippingAddress", "zip"], "is invalid");
        assert_eq!(failure.last_segment(), Some("zip"));
        assert!(failure.has_segment("shippingAddress"));

        let empty = ValidationFailure::new(Vec::<String>::new(), "oops");
        assert_eq!(empty.last_segment(), None);
    }

    #[test]
    fn test_tokenized_payment_uses_checkout_total() {
        let checkout = snapshot();
        let payment = NativePayment {
            email: "a@b.co".to_string(),
            billing_address: MailingAddress::default(),
            shipping_address: None,
            shipping_identifier: None,
            transaction_identifier: "txn-1".to_string(),
            payment_data: "opaque".to_string(),
        };

        let tokenized = TokenizedPayment::for_checkout(&checkout, &payment, "apple_pay");
        assert_eq!(tokenized.payment_amount.amount, dec!(43.20));
        assert_eq!(tokenized.payment_amount.currency_code, "USD");
        assert_eq!(tokenized.idempotency_key, "txn-1");
        assert_eq!(tokenized.r#type, "apple_pay");
    }
}
