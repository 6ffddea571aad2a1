use crate::config::BridgeConfig;
use crate::domain::checkout::{
    CheckoutId, CheckoutSnapshot, MailingAddress, NativePayment, ShippingFields, SummaryItem,
    TokenizedPayment,
};
use crate::domain::classifier::{Classification, ClassificationContext, classify};
use crate::domain::host::{AuthorizationStatus, HostError, HostEvent, HostResponse, SessionOutcome};
use crate::domain::ports::{CheckoutObserverArc, CheckoutServiceArc};
use crate::domain::session::{PendingStep, Session};
use crate::error::{BridgeError, Result};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Drives checkout mutations for the events of one payment session.
///
/// The orchestrator owns the [`Session`] and processes at most one host event
/// at a time: a second event arriving while a service call is in flight is
/// rejected with [`BridgeError::ConcurrentEvent`] before any service method is
/// invoked. `SessionTerminated` is accepted in any state and is terminal.
pub struct SessionOrchestrator {
    checkout_id: CheckoutId,
    session: Mutex<Session>,
    service: CheckoutServiceArc,
    observer: CheckoutObserverArc,
    config: BridgeConfig,
}

/// Marks the session busy for the lifetime of one event; dropping it returns
/// the session to [`PendingStep::None`].
struct InFlight<'a> {
    session: &'a Mutex<Session>,
}

impl InFlight<'_> {
    /// Moves on to the next service call. Returns `false`, leaving the step
    /// untouched, once the session has been terminated.
    fn advance(&self, step: PendingStep) -> bool {
        let mut session = lock(self.session);
        if !session.is_active() {
            return false;
        }
        *session = session.with_pending_step(step);
        true
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut session = lock(self.session);
        *session = session.with_pending_step(PendingStep::None);
    }
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

fn final_fields_step(shipping: &Option<ShippingFields>) -> PendingStep {
    if shipping.is_some() {
        PendingStep::AwaitingShippingContact
    } else {
        PendingStep::AwaitingFinalFields
    }
}

impl SessionOrchestrator {
    pub fn new(
        session: Session,
        service: CheckoutServiceArc,
        observer: CheckoutObserverArc,
        config: BridgeConfig,
    ) -> Self {
        Self {
            checkout_id: session.checkout_id().clone(),
            session: Mutex::new(session),
            service,
            observer,
            config,
        }
    }

    /// A consistent copy of the session as of now.
    pub fn session(&self) -> Session {
        lock(&self.session).clone()
    }

    /// Read-only accessor for the UI layer.
    pub fn current_snapshot(&self) -> Arc<CheckoutSnapshot> {
        lock(&self.session).snapshot().clone()
    }

    pub fn into_session(self) -> Session {
        self.session
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Routes a host event to its handler.
    pub async fn dispatch(&self, event: HostEvent) -> Result<HostResponse> {
        debug!(checkout = %self.checkout_id, event = event.kind(), "host event received");
        match event {
            HostEvent::ShippingIdentifierUpdate(identifier) => {
                self.handle_shipping_identifier_update(&identifier).await
            }
            HostEvent::ShippingContactUpdate(address) => {
                self.handle_shipping_contact_update(address).await
            }
            HostEvent::PaymentAuthorization(payment) => {
                self.handle_payment_authorization(payment).await
            }
            HostEvent::SessionTerminated(outcome) => Ok(self.handle_session_terminated(outcome)),
        }
    }

    /// The user picked a shipping option. Any error here is a plain `Failure`:
    /// the identifier came from options the host was given.
    pub async fn handle_shipping_identifier_update(
        &self,
        identifier: &str,
    ) -> Result<HostResponse> {
        let _in_flight = self.begin(PendingStep::AwaitingShippingLine)?;

        let result = self
            .mutate(
                self.service.set_shipping_line(&self.checkout_id, identifier),
                ClassificationContext::ShippingLine,
            )
            .await;

        Ok(match result {
            Ok(snapshot) => HostResponse::success().with_summary(self.summary(&snapshot)),
            Err(classification) => self.respond(classification, false),
        })
    }

    /// The user changed the shipping contact. On success the first available
    /// shipping rate becomes the default shipping line; an address without
    /// rates is reported as `Unserviceable`.
    pub async fn handle_shipping_contact_update(
        &self,
        address: MailingAddress,
    ) -> Result<HostResponse> {
        let in_flight = self.begin(PendingStep::AwaitingShippingAddress)?;

        let snapshot = match self
            .mutate(
                self.service.set_shipping_address(&self.checkout_id, address),
                ClassificationContext::PartialShippingAddress,
            )
            .await
        {
            Ok(snapshot) => snapshot,
            // Validation errors nothing could be attributed to still point
            // the host at the address it sent.
            Err(Classification::Classified {
                status: AuthorizationStatus::Failure,
                errors,
            }) => {
                let classification = Classification::Classified {
                    status: AuthorizationStatus::InvalidShippingAddress,
                    errors,
                };
                return Ok(self.respond(classification, false));
            }
            Err(classification) => return Ok(self.respond(classification, false)),
        };

        let methods = snapshot.shipping_methods();
        let Some(default_method) = methods.first() else {
            info!(checkout = %self.checkout_id, "no shipping rates for address");
            return Ok(HostResponse::new(AuthorizationStatus::Unserviceable)
                .with_summary(self.summary(&snapshot))
                .with_shipping_methods(methods)
                .with_errors(vec![HostError::unserviceable(
                    &self.config.unserviceable_message,
                )]));
        };

        if !in_flight.advance(PendingStep::AwaitingShippingLine) {
            return Ok(self.terminated_mid_flight());
        }
        let result = self
            .mutate(
                self.service
                    .set_shipping_line(&self.checkout_id, &default_method.identifier),
                ClassificationContext::ShippingLine,
            )
            .await;

        Ok(match result {
            Ok(snapshot) => HostResponse::success()
                .with_summary(self.summary(&snapshot))
                .with_shipping_methods(methods),
            Err(classification) => self.respond(classification, false),
        })
    }

    /// Sets the email and, when given, the full shipping contact.
    pub async fn handle_final_fields_set(
        &self,
        email: &str,
        shipping: Option<ShippingFields>,
    ) -> Result<HostResponse> {
        let _in_flight = self.begin(final_fields_step(&shipping))?;

        Ok(match self.set_final_fields(email, shipping).await {
            Ok(snapshot) => HostResponse::success().with_summary(self.summary(&snapshot)),
            Err(response) => response,
        })
    }

    /// Sets the final fields, then charges the authorized credential. Payment
    /// is never submitted unless the final fields were accepted.
    pub async fn handle_payment_authorization(
        &self,
        payment: NativePayment,
    ) -> Result<HostResponse> {
        let shipping = if self.current_snapshot().requires_shipping {
            payment
                .shipping_address
                .clone()
                .map(|shipping_address| ShippingFields {
                    shipping_address,
                    shipping_identifier: payment.shipping_identifier.clone(),
                })
        } else {
            None
        };

        let in_flight = self.begin(final_fields_step(&shipping))?;

        let snapshot = match self.set_final_fields(&payment.email, shipping).await {
            Ok(snapshot) => snapshot,
            Err(response) => return Ok(response),
        };

        if !in_flight.advance(PendingStep::AwaitingPayment) {
            return Ok(self.terminated_mid_flight());
        }
        let tokenized =
            TokenizedPayment::for_checkout(&snapshot, &payment, &self.config.payment_type);
        let result = self
            .mutate(
                self.service
                    .submit_tokenized_payment(&self.checkout_id, tokenized),
                ClassificationContext::CheckoutMutation,
            )
            .await;

        Ok(match result {
            Ok(_) => {
                info!(checkout = %self.checkout_id, "tokenized payment accepted");
                HostResponse::success()
            }
            Err(classification) => self.respond(classification, true),
        })
    }

    /// The host dismissed its payment sheet. Only the first termination
    /// notifies the observer; later ones are acknowledged and ignored.
    pub fn handle_session_terminated(&self, outcome: SessionOutcome) -> HostResponse {
        {
            let mut session = lock(&self.session);
            if let Some(previous) = session.outcome() {
                debug!(
                    checkout = %self.checkout_id,
                    ?previous,
                    ?outcome,
                    "session already terminated"
                );
                return HostResponse::success();
            }
            *session = session.terminated(outcome);
        }

        info!(checkout = %self.checkout_id, ?outcome, "checkout session finished");
        match outcome {
            SessionOutcome::Completed => self.observer.on_checkout_completed(),
            SessionOutcome::Cancelled => self.observer.on_checkout_cancelled(),
            SessionOutcome::Failed => self.observer.on_checkout_failed(&BridgeError::Processing(
                self.config.processing_error_message.clone(),
            )),
        }
        HostResponse::success()
    }

    fn begin(&self, step: PendingStep) -> Result<InFlight<'_>> {
        let mut session = lock(&self.session);
        if !session.is_active() {
            return Err(BridgeError::SessionInactive(self.checkout_id.clone()));
        }
        if !session.is_idle() {
            return Err(BridgeError::ConcurrentEvent {
                in_flight: session.pending_step(),
            });
        }
        *session = session.with_pending_step(step);
        Ok(InFlight {
            session: &self.session,
        })
    }

    async fn set_final_fields(
        &self,
        email: &str,
        shipping: Option<ShippingFields>,
    ) -> std::result::Result<Arc<CheckoutSnapshot>, HostResponse> {
        self.mutate(
            self.service
                .set_final_fields(&self.checkout_id, email, shipping),
            ClassificationContext::FullShippingAndContact,
        )
        .await
        .map_err(|classification| {
            let with_methods =
                classification.status() == AuthorizationStatus::InvalidShippingContact;
            self.respond(classification, with_methods)
        })
    }

    /// Awaits a service call and installs its snapshot. Results arriving after
    /// the session was terminated are discarded.
    async fn mutate(
        &self,
        call: impl Future<Output = Result<CheckoutSnapshot>>,
        context: ClassificationContext,
    ) -> std::result::Result<Arc<CheckoutSnapshot>, Classification> {
        match call.await {
            Ok(snapshot) => self.commit(snapshot).ok_or(Classification::Abandoned),
            Err(error) => Err(self.classify_error(&error, context)),
        }
    }

    fn terminated_mid_flight(&self) -> HostResponse {
        debug!(checkout = %self.checkout_id, "session terminated mid-flight, skipping next call");
        HostResponse::failure()
    }

    fn commit(&self, snapshot: CheckoutSnapshot) -> Option<Arc<CheckoutSnapshot>> {
        let mut session = lock(&self.session);
        if !session.is_active() {
            debug!(
                checkout = %self.checkout_id,
                "session terminated mid-flight, discarding result"
            );
            return None;
        }
        *session = session.with_snapshot(snapshot);
        Some(session.snapshot().clone())
    }

    fn classify_error(
        &self,
        error: &BridgeError,
        context: ClassificationContext,
    ) -> Classification {
        match error.validation_failures() {
            Some(failures) => {
                let classification = classify(failures, context);
                warn!(
                    checkout = %self.checkout_id,
                    ?context,
                    failures = failures.len(),
                    status = ?classification.status(),
                    "checkout validation failed"
                );
                classification
            }
            None => {
                warn!(
                    checkout = %self.checkout_id,
                    ?context,
                    %error,
                    "checkout service call failed"
                );
                Classification::Abandoned
            }
        }
    }

    fn respond(&self, classification: Classification, with_methods: bool) -> HostResponse {
        let (status, errors) = classification.into_parts();
        if status == AuthorizationStatus::Failure {
            return HostResponse::failure();
        }

        let snapshot = self.current_snapshot();
        let mut response = HostResponse::new(status).with_summary(self.summary(&snapshot));
        if with_methods {
            response = response.with_shipping_methods(snapshot.shipping_methods());
        }
        response.with_errors(errors)
    }

    fn summary(&self, snapshot: &CheckoutSnapshot) -> Vec<SummaryItem> {
        snapshot.summary_items(&self.config.merchant_name)
    }
}
