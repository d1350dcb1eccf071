//! Error taxonomy for the exchange backend
//!
//! Four client-visible classes: validation failures (rejected before any
//! state mutation), insufficient balance (rejected before reservation),
//! cancel-after-terminal races, and retryable external network failures.

use thiserror::Error;

/// Top-level error type crossing service boundaries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Journal failure: {0}")]
    Journal(String),
}

/// Ledger-specific errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Insufficient balance for {asset}: required {required}, available {available}")]
    InsufficientBalance {
        asset: String,
        required: String,
        available: String,
    },

    #[error("Insufficient reserved balance for {asset}: required {required}, reserved {reserved}")]
    InsufficientReserved {
        asset: String,
        required: String,
        reserved: String,
    },

    #[error("Unknown account: {account_id}")]
    UnknownAccount { account_id: String },
}

/// Order-specific errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderError {
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Order not found: {order_id}")]
    NotFound { order_id: String },

    #[error("Order already in terminal state: {status}")]
    AlreadyTerminal { status: String },
}

/// Transfer and fiat gateway errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    #[error("Invalid address for {asset}: {address}")]
    InvalidAddress { asset: String, address: String },

    #[error("Unsupported asset: {0}")]
    UnsupportedAsset(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("Transfer not found: {transfer_id}")]
    NotFound { transfer_id: String },

    #[error("Transfer already in terminal state: {status}")]
    AlreadyTerminal { status: String },

    #[error("Network failure: {0}")]
    NetworkFailure(String),
}
