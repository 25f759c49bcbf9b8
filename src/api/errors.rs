//! API Error Handling
//!
//! Structured error responses with proper HTTP status codes and request
//! tracking. Payment integrity failures map to 400; provider failures map
//! to 500 with a generic message, the original error staying in the
//! server logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

use crate::errors::PaymentError;

/// Top-level API error response with request tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub success: bool,
    pub message: String,
}

/// API error types with request tracking
#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub request_id: String,
}

#[derive(Debug)]
pub enum ApiErrorKind {
    BadRequest(String),
    InternalError(String),
}

impl ApiError {
    pub fn bad_request(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::BadRequest(message),
            request_id,
        }
    }

    pub fn internal_error(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::InternalError(message),
            request_id,
        }
    }

    /// Map a payment failure onto the wire contract. `context` is the
    /// generic message used when the detail must not reach the client.
    pub fn from_payment(request_id: String, e: PaymentError, context: &str) -> Self {
        match e {
            PaymentError::InvalidParams(msg) => Self::bad_request(request_id, msg),
            PaymentError::SignatureMismatch => {
                Self::bad_request(request_id, "Invalid payment signature".to_string())
            }
            PaymentError::NotCaptured { .. } => {
                Self::bad_request(request_id, "Payment not captured".to_string())
            }
            other => {
                error!(request_id = %request_id, error = %other, "{}", context);
                Self::internal_error(request_id, context.to_string())
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ApiErrorKind::BadRequest(msg) => write!(f, "[{}] Bad Request: {}", self.request_id, msg),
            ApiErrorKind::InternalError(msg) => {
                write!(f, "[{}] Internal Error: {}", self.request_id, msg)
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.kind {
            ApiErrorKind::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiErrorKind::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse {
            request_id: self.request_id,
            success: false,
            message,
        });

        (status, body).into_response()
    }
}
