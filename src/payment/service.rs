//! Order creation and payment verification
//!
//! The server-side half of the payment flow. Amounts arrive here already
//! in minor units; conversion from rupees happens in the lifecycle, once.
//! Verification is two-phase and both phases are mandatory: the signature
//! proves the triple came from the provider, the live status check proves
//! the funds were actually captured.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::PaymentError;
use crate::payment::provider::{
    Order, PaymentProvider, PaymentStatus, PayoutDestination, PayoutReceipt,
};
use crate::payment::signature;

/// Result of a successful two-phase verification
#[derive(Clone, Debug)]
pub struct VerifiedPayment {
    pub payment_id: String,
    pub amount: u64,
    pub status: PaymentStatus,
}

pub struct OrderService {
    provider: Arc<dyn PaymentProvider>,
    key_secret: String,
}

impl OrderService {
    pub fn new(provider: Arc<dyn PaymentProvider>, key_secret: impl Into<String>) -> Self {
        Self {
            provider,
            key_secret: key_secret.into(),
        }
    }

    /// Create a provider order for an already-converted minor-unit amount
    pub async fn create_order(
        &self,
        amount: u64,
        currency: &str,
        user_id: &str,
    ) -> Result<Order, PaymentError> {
        if amount == 0 || currency.is_empty() || user_id.is_empty() {
            return Err(PaymentError::InvalidParams(
                "amount, currency and userId are required".to_string(),
            ));
        }

        let receipt_ref = format!("rcpt_{}_{}", user_id, Utc::now().timestamp_millis());
        let order = self
            .provider
            .create_order(amount, currency, &receipt_ref, user_id)
            .await?;

        info!(
            order_id = %order.order_id,
            amount = order.amount,
            currency = %order.currency,
            user_id = %user_id,
            "Order created"
        );
        Ok(order)
    }

    /// Verify a client-submitted confirmation triple: recompute the MAC,
    /// then confirm captured status with the provider.
    pub async fn verify_payment(
        &self,
        order_id: &str,
        payment_id: &str,
        sig: &str,
    ) -> Result<VerifiedPayment, PaymentError> {
        if order_id.is_empty() || payment_id.is_empty() || sig.is_empty() {
            return Err(PaymentError::InvalidParams(
                "orderId, paymentId and signature are required".to_string(),
            ));
        }

        if !signature::verify(&self.key_secret, order_id, payment_id, sig) {
            warn!(order_id = %order_id, payment_id = %payment_id, "Payment signature mismatch");
            return Err(PaymentError::SignatureMismatch);
        }

        let payment = self.provider.fetch_payment(payment_id).await?;
        if payment.status != PaymentStatus::Captured {
            warn!(
                payment_id = %payment_id,
                status = %payment.status,
                "Payment verified but not captured"
            );
            return Err(PaymentError::NotCaptured {
                status: payment.status.to_string(),
            });
        }

        info!(payment_id = %payment_id, amount = payment.amount, "Payment verified");
        Ok(VerifiedPayment {
            payment_id: payment.payment_id,
            amount: payment.amount,
            status: payment.status,
        })
    }

    /// Send funds to the player's declared destination
    pub async fn issue_payout(
        &self,
        user_id: &str,
        amount: u64,
        destination: &PayoutDestination,
    ) -> Result<PayoutReceipt, PaymentError> {
        if amount == 0 || user_id.is_empty() || destination.upi_id.is_empty() {
            return Err(PaymentError::InvalidParams(
                "userId, amount and upiId are required".to_string(),
            ));
        }

        let receipt = self
            .provider
            .issue_payout(user_id, amount, destination)
            .await?;
        info!(
            payout_id = %receipt.payout_id,
            amount = receipt.amount,
            user_id = %user_id,
            "Payout issued"
        );
        Ok(receipt)
    }
}
