//! On-chain transfer and fiat transaction types
//!
//! A transfer is created `Pending` with funds (amount + network fee) already
//! reserved in the ledger. The external network adapter later resolves it to
//! `Confirmed` (reservation settled) or `Failed` (reservation released).

use crate::ids::{AccountId, FiatTxId, TransferId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transfer status. Wire values match the front-end contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Confirmed,
    Failed,
}

impl TransferStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Confirmed | TransferStatus::Failed)
    }
}

/// A withdrawal of book balance to an external address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub transfer_id: TransferId,
    pub account_id: AccountId,
    pub asset: String,
    pub destination: String,
    pub amount: Decimal,
    pub network_fee: Decimal,
    pub status: TransferStatus,
    /// Network transaction hash, assigned when the network adapter accepts
    /// the submission.
    pub tx_hash: String,
    pub confirmations: u32,
    pub created_at: i64, // Unix nanos
    pub updated_at: i64, // Unix nanos
}

impl Transfer {
    pub fn new(
        account_id: AccountId,
        asset: impl Into<String>,
        destination: impl Into<String>,
        amount: Decimal,
        network_fee: Decimal,
        timestamp: i64,
    ) -> Self {
        Self {
            transfer_id: TransferId::new(),
            account_id,
            asset: asset.into(),
            destination: destination.into(),
            amount,
            network_fee,
            status: TransferStatus::Pending,
            tx_hash: String::new(),
            confirmations: 0,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Total ledger reservation backing this transfer.
    pub fn reserved_total(&self) -> Decimal {
        self.amount + self.network_fee
    }

    /// Record network confirmation.
    ///
    /// # Panics
    /// Panics if the transfer is already terminal; callers check first and
    /// surface `AlreadyTerminal`.
    pub fn mark_confirmed(&mut self, confirmations: u32, timestamp: i64) {
        assert!(!self.status.is_terminal(), "cannot confirm terminal transfer");
        self.status = TransferStatus::Confirmed;
        self.confirmations = confirmations;
        self.updated_at = timestamp;
    }

    /// Record network rejection.
    ///
    /// # Panics
    /// Panics if the transfer is already terminal.
    pub fn mark_failed(&mut self, timestamp: i64) {
        assert!(!self.status.is_terminal(), "cannot fail terminal transfer");
        self.status = TransferStatus::Failed;
        self.updated_at = timestamp;
    }
}

/// Direction of a fiat transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiatDirection {
    Deposit,
    Withdraw,
}

/// Fiat transaction status. Wire values match the front-end contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiatStatus {
    Pending,
    Completed,
    Failed,
}

impl FiatStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FiatStatus::Completed | FiatStatus::Failed)
    }
}

/// A fiat deposit or withdrawal routed through an external payment rail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiatTransaction {
    pub transaction_id: FiatTxId,
    pub account_id: AccountId,
    pub currency: String,
    pub amount: Decimal,
    pub direction: FiatDirection,
    pub payment_method: String,
    pub status: FiatStatus,
    pub message: String,
    pub created_at: i64, // Unix nanos
    pub updated_at: i64, // Unix nanos
}

impl FiatTransaction {
    pub fn new(
        account_id: AccountId,
        currency: impl Into<String>,
        amount: Decimal,
        direction: FiatDirection,
        payment_method: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            transaction_id: FiatTxId::new(),
            account_id,
            currency: currency.into(),
            amount,
            direction,
            payment_method: payment_method.into(),
            status: FiatStatus::Pending,
            message: String::new(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    pub fn complete(&mut self, message: impl Into<String>, timestamp: i64) {
        assert!(!self.status.is_terminal(), "fiat transaction already terminal");
        self.status = FiatStatus::Completed;
        self.message = message.into();
        self.updated_at = timestamp;
    }

    pub fn fail(&mut self, message: impl Into<String>, timestamp: i64) {
        assert!(!self.status.is_terminal(), "fiat transaction already terminal");
        self.status = FiatStatus::Failed;
        self.message = message.into();
        self.updated_at = timestamp;
    }
}
