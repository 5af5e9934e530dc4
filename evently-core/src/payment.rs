use async_trait::async_trait;
use evently_shared::models::{PaymentCallback, PaymentOrder};

/// How the third-party checkout widget was left by the student
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetOutcome {
    /// Provider reported a completed payment; fields go to the verify endpoint
    Completed(PaymentCallback),
    /// Closed without completing. Registration state must be re-fetched.
    Dismissed,
    /// Provider reported a failure before any callback
    Failed(String),
}

/// The payment provider's checkout widget. Opaque to this system: it takes an
/// order and hands back whatever the provider reported, without any
/// authenticity checks on our side.
#[async_trait]
pub trait PaymentWidget: Send + Sync {
    async fn open(
        &self,
        order: &PaymentOrder,
    ) -> Result<WidgetOutcome, Box<dyn std::error::Error + Send + Sync>>;
}

/// Widget that replays a fixed outcome, for tests and dry runs
pub struct MockPaymentWidget {
    outcome: WidgetOutcome,
}

impl MockPaymentWidget {
    pub fn new(outcome: WidgetOutcome) -> Self {
        Self { outcome }
    }

    /// Completes with callback fields derived from the order id
    pub fn completing() -> Self {
        Self::new(WidgetOutcome::Completed(PaymentCallback {
            provider_order_id: String::new(),
            provider_payment_id: "pay_mock".to_string(),
            provider_signature: "sig_mock".to_string(),
        }))
    }
}

#[async_trait]
impl PaymentWidget for MockPaymentWidget {
    async fn open(
        &self,
        order: &PaymentOrder,
    ) -> Result<WidgetOutcome, Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!("Mock payment widget opened for order {}", order.order_id);

        let outcome = match &self.outcome {
            WidgetOutcome::Completed(cb) if cb.provider_order_id.is_empty() => {
                WidgetOutcome::Completed(PaymentCallback {
                    provider_order_id: order.order_id.clone(),
                    ..cb.clone()
                })
            }
            other => other.clone(),
        };
        Ok(outcome)
    }
}
