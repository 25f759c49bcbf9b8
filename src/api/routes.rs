//! Route Definitions
//!
//! Maps URLs to handlers with type-safe routing.

use super::handlers::*;
use super::server::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Payment endpoints
        .route("/api/payment/create-order", post(create_order_handler))
        .route("/api/payment/verify", post(verify_payment_handler))
        // Attach shared state
        .with_state(state)
}
