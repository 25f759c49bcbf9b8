//! Error types for the payment and lifecycle services
//!
//! One variant per failure class the HTTP layer and the lifecycle need to
//! tell apart. Provider internals are carried as strings so the original
//! error can be logged server-side without leaking into client responses.

use thiserror::Error;

/// Payment order/verification failures
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Missing or malformed request fields (surfaced as 400)
    #[error("Missing required parameters: {0}")]
    InvalidParams(String),

    /// Client-submitted signature does not match the recomputed MAC
    #[error("Invalid payment signature")]
    SignatureMismatch,

    /// Signature matched but the provider does not report the payment captured
    #[error("Payment not captured (status: {status})")]
    NotCaptured { status: String },

    /// Payment gateway unreachable or rejected the request
    #[error("Provider error: {0}")]
    Provider(String),
}

/// Document store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database open failed: {0}")]
    OpenFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Corrupted document at {key}: {reason}")]
    CorruptedData { key: String, reason: String },
}

impl From<rocksdb::Error> for StoreError {
    fn from(e: rocksdb::Error) -> Self {
        StoreError::WriteFailed(e.to_string())
    }
}

/// Bet-payout lifecycle failures
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Game session {0} not found")]
    SessionNotFound(String),

    /// Operation not valid for the session's current status
    #[error("Session {id} is {status}, expected {expected}")]
    InvalidState {
        id: String,
        status: String,
        expected: String,
    },

    /// A payout for this session has already settled
    #[error("Payout already completed for session {0}")]
    PayoutAlreadyCompleted(String),

    /// Another payout attempt for this session is still in flight
    #[error("Payout already in progress for session {0}")]
    PayoutInFlight(String),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
