//! API Request/Response Models
//!
//! Bodies for the payment endpoints. Request fields are optional at the
//! wire level so missing parameters surface as a 400 with a message
//! rather than a deserialization failure.

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// POST /api/payment/create-order request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Minor currency units
    pub amount: Option<u64>,
    pub currency: Option<String>,
    pub user_id: Option<String>,
}

/// POST /api/payment/create-order response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: String,
    pub amount: u64,
    pub currency: String,
}

/// POST /api/payment/verify request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
}

/// POST /api/payment/verify response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub payment: PaymentSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub id: String,
    pub amount: u64,
    pub status: String,
}
