use std::sync::Arc;

use evently_client::{ApiClient, ApiError};
use evently_core::availability::{can_register, Availability};
use evently_core::payment::{PaymentWidget, WidgetOutcome};
use evently_shared::models::{EventDetail, EventRegistration, EventStatus, EventSummary};

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Refused client-side; no request was made
    #[error("{0}")]
    NotAvailable(&'static str),

    /// Provider reported a failure, or the widget itself broke
    #[error("Payment failed: {0}")]
    PaymentFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Free registration, or a paid one the backend verified
    Registered(EventRegistration),
    /// The widget was closed without completing. Carries whatever the
    /// backend reports for this student now, which may still be a
    /// registration if the payment went through.
    Reconciled(Option<EventRegistration>),
}

impl RegistrationOutcome {
    pub fn registration(&self) -> Option<&EventRegistration> {
        match self {
            RegistrationOutcome::Registered(reg) => Some(reg),
            RegistrationOutcome::Reconciled(reg) => reg.as_ref(),
        }
    }
}

/// Why the register button is hidden, if it is
pub fn unavailable_reason(detail: &EventDetail) -> Option<&'static str> {
    if can_register(detail) {
        return None;
    }
    Some(if detail.event.status != EventStatus::Approved {
        "Event is not open for registration"
    } else if Availability::of(&detail.event).is_full() {
        "Event Full"
    } else {
        "Already registered"
    })
}

/// Drives free and paid registration for the logged-in student
pub struct RegistrationOrchestrator {
    client: ApiClient,
    widget: Arc<dyn PaymentWidget>,
}

impl RegistrationOrchestrator {
    pub fn new(client: ApiClient, widget: Arc<dyn PaymentWidget>) -> Self {
        Self { client, widget }
    }

    /// Register for `event_id`, paying through the widget when the event
    /// has a fee
    pub async fn register(&self, event_id: &str) -> Result<RegistrationOutcome, RegistrationError> {
        let detail = self.client.event_detail(event_id).await?;
        if let Some(reason) = unavailable_reason(&detail) {
            return Err(RegistrationError::NotAvailable(reason));
        }

        if !detail.event.is_paid() {
            let registration = self.client.register_free(event_id).await?;
            tracing::info!(event_id, "Registered for free event");
            return Ok(RegistrationOutcome::Registered(registration));
        }

        self.register_paid(&detail.event).await
    }

    async fn register_paid(&self, event: &EventSummary) -> Result<RegistrationOutcome, RegistrationError> {
        let order = self.client.initiate_payment(&event.id).await?;
        tracing::info!(
            event_id = %event.id,
            order_id = %order.order_id,
            amount = order.amount,
            "Payment order created"
        );

        let outcome = self
            .widget
            .open(&order)
            .await
            .map_err(|e| RegistrationError::PaymentFailed(e.to_string()))?;

        match outcome {
            WidgetOutcome::Completed(callback) => {
                let registration = self.client.verify_payment(&event.id, &callback).await?;
                tracing::info!(event_id = %event.id, "Payment verified");
                Ok(RegistrationOutcome::Registered(registration))
            }
            WidgetOutcome::Dismissed => {
                tracing::info!(event_id = %event.id, "Payment widget dismissed, reconciling");
                let detail = self.client.event_detail(&event.id).await?;
                Ok(RegistrationOutcome::Reconciled(detail.registration))
            }
            WidgetOutcome::Failed(reason) => {
                tracing::warn!(event_id = %event.id, reason = %reason, "Payment failed");
                Err(RegistrationError::PaymentFailed(reason))
            }
        }
    }
}
