use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use types::errors::{ExchangeError, LedgerError, OrderError, TransferError};

/// Central error type for the gateway.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    AlreadyTerminal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error")]
    Internal(String),
}

impl From<ExchangeError> for AppError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::Ledger(e) => e.into(),
            ExchangeError::Order(e) => e.into(),
            ExchangeError::Transfer(e) => e.into(),
            ExchangeError::Validation(msg) => AppError::BadRequest(msg),
            ExchangeError::Journal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance { .. } => {
                AppError::InsufficientBalance(err.to_string())
            }
            LedgerError::InsufficientReserved { .. } | LedgerError::UnknownAccount { .. } => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidPrice(_)
            | OrderError::InvalidQuantity(_)
            | OrderError::UnknownSymbol(_) => AppError::BadRequest(err.to_string()),
            OrderError::NotFound { .. } => AppError::NotFound(err.to_string()),
            OrderError::AlreadyTerminal { .. } => AppError::AlreadyTerminal(err.to_string()),
        }
    }
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::InvalidAddress { .. }
            | TransferError::UnsupportedAsset(_)
            | TransferError::InvalidAmount(_) => AppError::BadRequest(err.to_string()),
            TransferError::InsufficientBalance(_) => {
                AppError::InsufficientBalance(err.to_string())
            }
            TransferError::NotFound { .. } => AppError::NotFound(err.to_string()),
            TransferError::AlreadyTerminal { .. } => AppError::AlreadyTerminal(err.to_string()),
            TransferError::NetworkFailure(_) => AppError::ServiceUnavailable(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            AppError::RateLimitExceeded(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, msg, "RATE_LIMIT_EXCEEDED")
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            AppError::InsufficientBalance(msg) => {
                (StatusCode::BAD_REQUEST, msg, "INSUFFICIENT_BALANCE")
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            AppError::AlreadyTerminal(msg) => (StatusCode::CONFLICT, msg, "ALREADY_TERMINAL"),
            AppError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, msg, "SERVICE_UNAVAILABLE")
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}
