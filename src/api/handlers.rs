//! Request Handlers
//!
//! Thin translation between the wire contract and the order service.

use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use super::{
    errors::ApiError,
    middleware::RequestId,
    models::*,
    server::AppState,
};

/// Health check handler - minimal response time
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Create a provider order for a bet or payout charge
/// POST /api/payment/create-order
pub async fn create_order_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    let (Some(amount), Some(currency), Some(user_id)) =
        (body.amount, body.currency, body.user_id)
    else {
        return Err(ApiError::bad_request(
            request_id.0,
            "Missing required parameters".to_string(),
        ));
    };

    let order = state
        .orders
        .create_order(amount, &currency, &user_id)
        .await
        .map_err(|e| ApiError::from_payment(request_id.0, e, "Failed to create order"))?;

    Ok(Json(CreateOrderResponse {
        success: true,
        order_id: order.order_id,
        amount: order.amount,
        currency: order.currency,
    }))
}

/// Verify a client-submitted payment confirmation
/// POST /api/payment/verify
pub async fn verify_payment_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, ApiError> {
    let (Some(order_id), Some(payment_id), Some(signature)) =
        (body.order_id, body.payment_id, body.signature)
    else {
        return Err(ApiError::bad_request(
            request_id.0,
            "Missing payment verification parameters".to_string(),
        ));
    };

    let verified = state
        .orders
        .verify_payment(&order_id, &payment_id, &signature)
        .await
        .map_err(|e| ApiError::from_payment(request_id.0, e, "Payment verification failed"))?;

    Ok(Json(VerifyPaymentResponse {
        success: true,
        payment: PaymentSummary {
            id: verified.payment_id,
            amount: verified.amount,
            status: verified.status.to_string(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::errors::ApiErrorKind;
    use crate::payment::provider::{InMemoryProvider, PaymentStatus};
    use crate::payment::signature;

    fn state() -> (Arc<InMemoryProvider>, Arc<AppState>) {
        let provider = Arc::new(InMemoryProvider::new());
        let orders = Arc::new(crate::payment::service::OrderService::new(
            provider.clone(),
            "secret",
        ));
        let state = Arc::new(AppState {
            orders,
            version: "test".to_string(),
        });
        (provider, state)
    }

    fn request_id() -> Extension<RequestId> {
        Extension(RequestId("req-test".to_string()))
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let Json(body) = health_handler().await;
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn test_create_order_happy_path() {
        let (_, state) = state();
        let body = CreateOrderRequest {
            amount: Some(5000),
            currency: Some("INR".to_string()),
            user_id: Some("user-1".to_string()),
        };
        let Json(resp) = create_order_handler(request_id(), State(state), Json(body))
            .await
            .unwrap();
        assert!(resp.success);
        assert_eq!(resp.amount, 5000);
        assert_eq!(resp.currency, "INR");
        assert!(!resp.order_id.is_empty());
    }

    #[tokio::test]
    async fn test_create_order_missing_params_is_bad_request() {
        let (_, state) = state();
        let body = CreateOrderRequest {
            amount: Some(5000),
            currency: None,
            user_id: Some("user-1".to_string()),
        };
        let err = create_order_handler(request_id(), State(state), Json(body))
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ApiErrorKind::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_verify_happy_path() {
        let (provider, state) = state();
        let order = state
            .orders
            .create_order(5000, "INR", "user-1")
            .await
            .unwrap();
        let payment = provider
            .record_payment(&order.order_id, PaymentStatus::Captured)
            .unwrap();
        let sig = signature::sign("secret", &order.order_id, &payment.payment_id);

        let body = VerifyPaymentRequest {
            order_id: Some(order.order_id),
            payment_id: Some(payment.payment_id.clone()),
            signature: Some(sig),
        };
        let Json(resp) = verify_payment_handler(request_id(), State(state), Json(body))
            .await
            .unwrap();
        assert!(resp.success);
        assert_eq!(resp.payment.id, payment.payment_id);
        assert_eq!(resp.payment.status, "captured");
    }

    #[tokio::test]
    async fn test_verify_bad_signature_is_bad_request() {
        let (provider, state) = state();
        let order = state
            .orders
            .create_order(5000, "INR", "user-1")
            .await
            .unwrap();
        let payment = provider
            .record_payment(&order.order_id, PaymentStatus::Captured)
            .unwrap();

        let body = VerifyPaymentRequest {
            order_id: Some(order.order_id),
            payment_id: Some(payment.payment_id),
            signature: Some("deadbeef".to_string()),
        };
        let err = verify_payment_handler(request_id(), State(state), Json(body))
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ApiErrorKind::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_verify_missing_params_is_bad_request() {
        let (_, state) = state();
        let body = VerifyPaymentRequest {
            order_id: None,
            payment_id: Some("pay_1".to_string()),
            signature: Some("sig".to_string()),
        };
        let err = verify_payment_handler(request_id(), State(state), Json(body))
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ApiErrorKind::BadRequest(_)));
    }
}
