//! API Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use echo_core::{ErrorKind, Receipt, Revert};
use echo_storage::StorageError;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Proposal not found: {0}")]
    ProposalNotFound(u64),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Fee required: at least {min_fee}")]
    FeeRequired { min_fee: String },

    /// The transaction was applied and reverted
    #[error("{kind}: {message}")]
    Reverted {
        kind: ErrorKind,
        message: String,
        tx_hash: String,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn reverted(receipt: &Receipt, revert: &Revert) -> Self {
        ApiError::Reverted {
            kind: revert.kind(),
            message: revert.to_string(),
            tx_hash: receipt.tx_hash.to_string(),
        }
    }
}

impl From<Revert> for ApiError {
    /// For reverts from read-only calls, which have no transaction hash.
    fn from(revert: Revert) -> Self {
        ApiError::Reverted {
            kind: revert.kind(),
            message: revert.to_string(),
            tx_hash: String::new(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::Reverted {
                kind,
                message,
                tx_hash,
            } => {
                let body = Json(json!({
                    "error": "reverted",
                    "kind": kind,
                    "message": message,
                    "tx_hash": tx_hash,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            ApiError::InvalidAddress(msg) => (StatusCode::BAD_REQUEST, "invalid_address", msg),
            ApiError::InvalidAmount(msg) => (StatusCode::BAD_REQUEST, "invalid_amount", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::ProposalNotFound(id) => (
                StatusCode::NOT_FOUND,
                "proposal_not_found",
                format!("Proposal {} not found", id),
            ),
            ApiError::TransactionNotFound(hash) => (
                StatusCode::NOT_FOUND,
                "transaction_not_found",
                format!("Transaction {} not found", hash),
            ),
            ApiError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, "rate_limited", msg),
            ApiError::FeeRequired { min_fee } => (
                StatusCode::PAYMENT_REQUIRED,
                "fee_required",
                format!("A fee of at least {} is required for this proposal", min_fee),
            ),
            ApiError::Storage(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                err.to_string(),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = Json(json!({
            "error": error_type,
            "message": message,
        }));

        (status, body).into_response()
    }
}
