#![allow(dead_code)]

use async_trait::async_trait;
use paybridge::application::orchestrator::SessionOrchestrator;
use paybridge::config::BridgeConfig;
use paybridge::domain::checkout::{
    CheckoutId, CheckoutSnapshot, MailingAddress, NativePayment, ShippingFields, TokenizedPayment,
};
use paybridge::domain::ports::{CheckoutObserver, CheckoutService};
use paybridge::domain::session::Session;
use paybridge::error::{BridgeError, Result};
use paybridge::infrastructure::in_memory::InMemoryCheckoutService;
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Completed,
    Cancelled,
    Failed(String),
}

/// Records every notification the orchestrator sends to the UI layer.
#[derive(Default)]
pub struct RecordingObserver {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingObserver {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl CheckoutObserver for RecordingObserver {
    fn on_checkout_completed(&self) {
        self.notifications.lock().unwrap().push(Notification::Completed);
    }

    fn on_checkout_cancelled(&self) {
        self.notifications.lock().unwrap().push(Notification::Cancelled);
    }

    fn on_checkout_failed(&self, error: &BridgeError) {
        self.notifications
            .lock()
            .unwrap()
            .push(Notification::Failed(error.to_string()));
    }
}

/// Holds every call at the door until the test releases it, so a test can
/// act while a service call is in flight.
#[derive(Clone)]
pub struct GatedCheckoutService {
    inner: InMemoryCheckoutService,
    gate: Arc<Semaphore>,
    entered: Arc<Notify>,
}

impl GatedCheckoutService {
    pub fn new(inner: InMemoryCheckoutService) -> Self {
        Self {
            inner,
            gate: Arc::new(Semaphore::new(0)),
            entered: Arc::new(Notify::new()),
        }
    }

    /// Resolves once a call is waiting at the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Lets `calls` more calls through.
    pub fn release(&self, calls: usize) {
        self.gate.add_permits(calls);
    }

    async fn wait(&self) {
        self.entered.notify_one();
        self.gate.acquire().await.unwrap().forget();
    }
}

#[async_trait]
impl CheckoutService for GatedCheckoutService {
    async fn set_shipping_address(
        &self,
        checkout_id: &CheckoutId,
        address: MailingAddress,
    ) -> Result<CheckoutSnapshot> {
        self.wait().await;
        self.inner.set_shipping_address(checkout_id, address).await
    }

    async fn set_shipping_line(
        &self,
        checkout_id: &CheckoutId,
        shipping_rate_handle: &str,
    ) -> Result<CheckoutSnapshot> {
        self.wait().await;
        self.inner
            .set_shipping_line(checkout_id, shipping_rate_handle)
            .await
    }

    async fn set_final_fields(
        &self,
        checkout_id: &CheckoutId,
        email: &str,
        shipping: Option<ShippingFields>,
    ) -> Result<CheckoutSnapshot> {
        self.wait().await;
        self.inner.set_final_fields(checkout_id, email, shipping).await
    }

    async fn submit_tokenized_payment(
        &self,
        checkout_id: &CheckoutId,
        payment: TokenizedPayment,
    ) -> Result<CheckoutSnapshot> {
        self.wait().await;
        self.inner.submit_tokenized_payment(checkout_id, payment).await
    }
}

pub struct Harness {
    pub orchestrator: Arc<SessionOrchestrator>,
    pub service: InMemoryCheckoutService,
    pub observer: Arc<RecordingObserver>,
}

pub async fn harness() -> Harness {
    let service = InMemoryCheckoutService::sample();
    let observer = Arc::new(RecordingObserver::default());
    let orchestrator = SessionOrchestrator::new(
        Session::new(service.snapshot().await),
        Arc::new(service.clone()),
        observer.clone(),
        BridgeConfig::default(),
    );
    Harness {
        orchestrator: Arc::new(orchestrator),
        service,
        observer,
    }
}

pub struct GatedHarness {
    pub orchestrator: Arc<SessionOrchestrator>,
    pub service: InMemoryCheckoutService,
    pub gated: GatedCheckoutService,
    pub observer: Arc<RecordingObserver>,
}

pub async fn gated_harness() -> GatedHarness {
    let service = InMemoryCheckoutService::sample();
    let gated = GatedCheckoutService::new(service.clone());
    let observer = Arc::new(RecordingObserver::default());
    let orchestrator = SessionOrchestrator::new(
        Session::new(service.snapshot().await),
        Arc::new(gated.clone()),
        observer.clone(),
        BridgeConfig::default(),
    );
    GatedHarness {
        orchestrator: Arc::new(orchestrator),
        service,
        gated,
        observer,
    }
}

pub fn partial_address(country: &str) -> MailingAddress {
    MailingAddress {
        city: Some("Portland".to_string()),
        province: Some("OR".to_string()),
        zip: Some("97201".to_string()),
        country: Some(country.to_string()),
        ..Default::default()
    }
}

pub fn full_address(country: &str) -> MailingAddress {
    MailingAddress {
        address1: Some("123 Main St".to_string()),
        first_name: Some("Ada".to_string()),
        last_name: Some("Lovelace".to_string()),
        phone: Some("555-0100".to_string()),
        ..partial_address(country)
    }
}

pub fn payment(email: &str, shipping: Option<MailingAddress>) -> NativePayment {
    NativePayment {
        email: email.to_string(),
        billing_address: full_address("US"),
        shipping_address: shipping,
        shipping_identifier: Some("standard".to_string()),
        transaction_identifier: "txn-0001".to_string(),
        payment_data: "tokenized-payment-data".to_string(),
    }
}
