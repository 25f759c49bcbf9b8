//! Payment provider boundary
//!
//! The capability surface the core needs from the hosted payment provider:
//! order creation, payment lookup, payout issuance. The deployed provider
//! SDK lives behind [`PaymentProvider`]; the in-memory implementation backs
//! tests and local runs.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use uuid::Uuid;

use crate::errors::PaymentError;

/// Provider-issued order. Immutable once created.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    /// Minor currency units (paise)
    pub amount: u64,
    pub currency: String,
    pub user_id: String,
    pub receipt_ref: String,
}

/// Provider-reported payment state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Created,
    Authorized,
    Captured,
    Failed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Created => write!(f, "created"),
            PaymentStatus::Authorized => write!(f, "authorized"),
            PaymentStatus::Captured => write!(f, "captured"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A payment as fetched from the provider
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub order_id: String,
    pub amount: u64,
    pub status: PaymentStatus,
}

/// Where a payout lands
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutDestination {
    pub upi_id: String,
    pub account_holder_name: String,
    pub phone: String,
}

/// Provider acknowledgement of an issued payout
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PayoutReceipt {
    pub payout_id: String,
    pub amount: u64,
}

/// The provider operations the core depends on
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_order(
        &self,
        amount: u64,
        currency: &str,
        receipt_ref: &str,
        user_id: &str,
    ) -> Result<Order, PaymentError>;

    async fn fetch_payment(&self, payment_id: &str) -> Result<PaymentRecord, PaymentError>;

    async fn issue_payout(
        &self,
        user_id: &str,
        amount: u64,
        destination: &PayoutDestination,
    ) -> Result<PayoutReceipt, PaymentError>;
}

/// In-memory provider standing in for the hosted SDK
pub struct InMemoryProvider {
    orders: DashMap<String, Order>,
    payments: DashMap<String, PaymentRecord>,
    counter: AtomicU64,
    fail_payouts: AtomicBool,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
            payments: DashMap::new(),
            counter: AtomicU64::new(1),
            fail_payouts: AtomicBool::new(false),
        }
    }

    /// Make subsequent payout calls fail, to exercise retry paths
    pub fn set_fail_payouts(&self, fail: bool) {
        self.fail_payouts.store(fail, Ordering::SeqCst);
    }

    /// Look up a previously created order
    pub fn order(&self, order_id: &str) -> Option<Order> {
        self.orders.get(order_id).map(|o| o.clone())
    }

    /// Record a payment against an order, as the hosted checkout would
    pub fn record_payment(
        &self,
        order_id: &str,
        status: PaymentStatus,
    ) -> Result<PaymentRecord, PaymentError> {
        let order = self
            .orders
            .get(order_id)
            .ok_or_else(|| PaymentError::Provider(format!("Unknown order: {}", order_id)))?;

        let payment = PaymentRecord {
            payment_id: format!("pay_{}", Uuid::new_v4().simple()),
            order_id: order_id.to_string(),
            amount: order.amount,
            status,
        };
        self.payments
            .insert(payment.payment_id.clone(), payment.clone());
        Ok(payment)
    }
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProvider for InMemoryProvider {
    async fn create_order(
        &self,
        amount: u64,
        currency: &str,
        receipt_ref: &str,
        user_id: &str,
    ) -> Result<Order, PaymentError> {
        let seq = self.counter.fetch_add(1, Ordering::SeqCst);
        let order = Order {
            order_id: format!("order_{:08}", seq),
            amount,
            currency: currency.to_string(),
            user_id: user_id.to_string(),
            receipt_ref: receipt_ref.to_string(),
        };
        self.orders.insert(order.order_id.clone(), order.clone());
        Ok(order)
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<PaymentRecord, PaymentError> {
        self.payments
            .get(payment_id)
            .map(|p| p.clone())
            .ok_or_else(|| PaymentError::Provider(format!("Unknown payment: {}", payment_id)))
    }

    async fn issue_payout(
        &self,
        _user_id: &str,
        amount: u64,
        _destination: &PayoutDestination,
    ) -> Result<PayoutReceipt, PaymentError> {
        if self.fail_payouts.load(Ordering::SeqCst) {
            return Err(PaymentError::Provider(
                "Payout rejected by provider".to_string(),
            ));
        }
        Ok(PayoutReceipt {
            payout_id: format!("pout_{}", Uuid::new_v4().simple()),
            amount,
        })
    }
}
