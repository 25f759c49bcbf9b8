//! Hosted checkout gateway
//!
//! Collecting the entry fee means handing control to the provider's hosted
//! checkout and waiting for it to resolve. The gateway is constructed once
//! and passed by reference; a confirmation always carries the provider
//! signature, never an unsigned triple.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use crate::errors::PaymentError;
use crate::payment::provider::{InMemoryProvider, Order, PaymentStatus};
use crate::payment::signature;

/// How one checkout attempt resolved
#[derive(Clone, Debug)]
pub enum CheckoutOutcome {
    /// Signed confirmation from the provider
    Confirmed {
        order_id: String,
        payment_id: String,
        signature: String,
    },
    /// User closed the overlay; terminal, not an error
    Cancelled,
    /// Provider-reported failure with a human-readable reason
    Failed { reason: String },
}

/// Capability to run one hosted checkout for an order
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn open(&self, order: &Order) -> Result<CheckoutOutcome, PaymentError>;
}

/// What the next scripted checkout should do
#[derive(Clone, Debug)]
pub enum ScriptStep {
    /// Pay and capture, returning a valid signature
    Pay,
    /// Pay but leave the payment merely authorized
    PayWithoutCapture,
    /// Close the overlay without paying
    Cancel,
    /// Provider-side failure
    Fail(String),
    /// Pay, but return a corrupted signature
    TamperSignature,
}

/// Scripted gateway over the in-memory provider
///
/// Steps are consumed in order; once the script runs dry every checkout
/// pays and captures. This is the crate's stand-in for the hosted overlay.
pub struct ScriptedGateway {
    provider: Arc<InMemoryProvider>,
    key_secret: String,
    script: Mutex<VecDeque<ScriptStep>>,
}

impl ScriptedGateway {
    pub fn new(provider: Arc<InMemoryProvider>, key_secret: impl Into<String>) -> Self {
        Self {
            provider,
            key_secret: key_secret.into(),
            script: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue the behavior of an upcoming checkout
    pub fn push_step(&self, step: ScriptStep) {
        self.script
            .lock()
            .expect("checkout script lock poisoned")
            .push_back(step);
    }

    fn next_step(&self) -> ScriptStep {
        self.script
            .lock()
            .expect("checkout script lock poisoned")
            .pop_front()
            .unwrap_or(ScriptStep::Pay)
    }
}

#[async_trait]
impl CheckoutGateway for ScriptedGateway {
    async fn open(&self, order: &Order) -> Result<CheckoutOutcome, PaymentError> {
        match self.next_step() {
            ScriptStep::Pay => {
                let payment = self
                    .provider
                    .record_payment(&order.order_id, PaymentStatus::Captured)?;
                let sig =
                    signature::sign(&self.key_secret, &order.order_id, &payment.payment_id);
                Ok(CheckoutOutcome::Confirmed {
                    order_id: order.order_id.clone(),
                    payment_id: payment.payment_id,
                    signature: sig,
                })
            }
            ScriptStep::PayWithoutCapture => {
                let payment = self
                    .provider
                    .record_payment(&order.order_id, PaymentStatus::Authorized)?;
                let sig =
                    signature::sign(&self.key_secret, &order.order_id, &payment.payment_id);
                Ok(CheckoutOutcome::Confirmed {
                    order_id: order.order_id.clone(),
                    payment_id: payment.payment_id,
                    signature: sig,
                })
            }
            ScriptStep::Cancel => Ok(CheckoutOutcome::Cancelled),
            ScriptStep::Fail(reason) => Ok(CheckoutOutcome::Failed { reason }),
            ScriptStep::TamperSignature => {
                let payment = self
                    .provider
                    .record_payment(&order.order_id, PaymentStatus::Captured)?;
                Ok(CheckoutOutcome::Confirmed {
                    order_id: order.order_id.clone(),
                    payment_id: payment.payment_id,
                    signature: "deadbeef".to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::provider::PaymentProvider;

    async fn order(provider: &InMemoryProvider) -> Order {
        provider
            .create_order(5000, "INR", "rcpt_user_1", "user-1")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_default_checkout_pays_and_signs() {
        let provider = Arc::new(InMemoryProvider::new());
        let gateway = ScriptedGateway::new(provider.clone(), "secret");
        let order = order(&provider).await;

        match gateway.open(&order).await.unwrap() {
            CheckoutOutcome::Confirmed {
                order_id,
                payment_id,
                signature: sig,
            } => {
                assert_eq!(order_id, order.order_id);
                assert!(signature::verify("secret", &order_id, &payment_id, &sig));
            }
            other => panic!("expected confirmation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_scripted_cancellation() {
        let provider = Arc::new(InMemoryProvider::new());
        let gateway = ScriptedGateway::new(provider.clone(), "secret");
        gateway.push_step(ScriptStep::Cancel);
        let order = order(&provider).await;

        assert!(matches!(
            gateway.open(&order).await.unwrap(),
            CheckoutOutcome::Cancelled
        ));
        // Script consumed: the next checkout pays normally.
        assert!(matches!(
            gateway.open(&order).await.unwrap(),
            CheckoutOutcome::Confirmed { .. }
        ));
    }

    #[tokio::test]
    async fn test_tampered_signature_does_not_verify() {
        let provider = Arc::new(InMemoryProvider::new());
        let gateway = ScriptedGateway::new(provider.clone(), "secret");
        gateway.push_step(ScriptStep::TamperSignature);
        let order = order(&provider).await;

        match gateway.open(&order).await.unwrap() {
            CheckoutOutcome::Confirmed {
                order_id,
                payment_id,
                signature: sig,
            } => {
                assert!(!signature::verify("secret", &order_id, &payment_id, &sig));
            }
            other => panic!("expected confirmation, got {:?}", other),
        }
    }
}
