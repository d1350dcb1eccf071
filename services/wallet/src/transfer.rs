//! On-chain transfer lifecycle
//!
//! A transfer reserves amount + network fee before anything touches the
//! network. Submission hands it to a [`NetworkAdapter`]; the transfer
//! stays `pending` until the network reports back, at which point
//! confirmation settles the debit from reserved funds and failure releases
//! the reservation in full. Every path either settles or releases, so a
//! transfer can never strand reserved balance.

use dashmap::DashMap;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use types::errors::TransferError;
use types::ids::{AccountId, TransferId};
use types::transfer::{Transfer, TransferStatus};

use crate::address::validate_address;
use crate::fees::FeeOracle;
use ledger::Ledger;

/// External network submission seam. Returns the network transaction hash
/// on acceptance.
pub trait NetworkAdapter: Send + Sync {
    fn submit(&self, transfer: &Transfer) -> Result<String, TransferError>;
}

/// Accepts every submission, deriving a hash from the transfer id. Stands
/// in for a real chain client.
#[derive(Debug, Default)]
pub struct SimulatedNetwork;

impl NetworkAdapter for SimulatedNetwork {
    fn submit(&self, transfer: &Transfer) -> Result<String, TransferError> {
        let mut hasher = Sha256::new();
        hasher.update(transfer.transfer_id.as_uuid().as_bytes());
        Ok(format!("0x{}", hex::encode(hasher.finalize())))
    }
}

pub struct TransferService {
    ledger: Arc<Ledger>,
    transfers: DashMap<TransferId, Transfer>,
    oracle: Box<dyn FeeOracle>,
    network: Box<dyn NetworkAdapter>,
}

impl TransferService {
    pub fn new(
        ledger: Arc<Ledger>,
        oracle: Box<dyn FeeOracle>,
        network: Box<dyn NetworkAdapter>,
    ) -> Self {
        Self {
            ledger,
            transfers: DashMap::new(),
            oracle,
            network,
        }
    }

    /// Current network fee for an asset.
    pub fn quote_network_fee(&self, asset: &str) -> Result<Decimal, TransferError> {
        self.oracle.quote_network_fee(asset)
    }

    /// Start a withdrawal: validate, reserve amount + fee, submit to the
    /// network, and record the transfer as `pending`.
    ///
    /// Validation failures reject before any state mutation. A network
    /// submission failure releases the reservation and surfaces the error;
    /// nothing is recorded.
    pub fn initiate_transfer(
        &self,
        account: AccountId,
        asset: &str,
        destination: &str,
        amount: Decimal,
        timestamp: i64,
    ) -> Result<Transfer, TransferError> {
        if amount <= Decimal::ZERO {
            return Err(TransferError::InvalidAmount(amount.to_string()));
        }
        if !validate_address(destination, asset) {
            return Err(TransferError::InvalidAddress {
                asset: asset.to_string(),
                address: destination.to_string(),
            });
        }
        let network_fee = self.oracle.quote_network_fee(asset)?;

        let mut transfer =
            Transfer::new(account, asset, destination, amount, network_fee, timestamp);

        self.ledger
            .reserve(account, asset, transfer.reserved_total())
            .map_err(|e| TransferError::InsufficientBalance(e.to_string()))?;

        match self.network.submit(&transfer) {
            Ok(hash) => transfer.tx_hash = hash,
            Err(e) => {
                // Reservation must not outlive a failed submission.
                let _ = self
                    .ledger
                    .release(account, asset, transfer.reserved_total());
                tracing::warn!(%account, asset, error = %e, "transfer submission failed");
                return Err(e);
            }
        }

        tracing::info!(
            transfer_id = %transfer.transfer_id,
            %account,
            asset,
            %amount,
            "transfer initiated"
        );
        self.transfers.insert(transfer.transfer_id, transfer.clone());
        Ok(transfer)
    }

    /// Network reported the transfer confirmed: settle the debit out of
    /// reserved funds.
    pub fn confirm_transfer(
        &self,
        transfer_id: TransferId,
        confirmations: u32,
        timestamp: i64,
    ) -> Result<Transfer, TransferError> {
        let mut entry = self.entry_mut(transfer_id)?;
        Self::check_not_terminal(&entry)?;

        self.ledger
            .settle(entry.account_id, &entry.asset, -entry.reserved_total())
            .map_err(|e| TransferError::NetworkFailure(e.to_string()))?;

        entry.mark_confirmed(confirmations, timestamp);
        tracing::info!(%transfer_id, confirmations, "transfer confirmed");
        Ok(entry.clone())
    }

    /// Network reported the transfer failed: release the full reservation.
    pub fn fail_transfer(
        &self,
        transfer_id: TransferId,
        timestamp: i64,
    ) -> Result<Transfer, TransferError> {
        let mut entry = self.entry_mut(transfer_id)?;
        Self::check_not_terminal(&entry)?;

        self.ledger
            .release(entry.account_id, &entry.asset, entry.reserved_total())
            .map_err(|e| TransferError::NetworkFailure(e.to_string()))?;

        entry.mark_failed(timestamp);
        tracing::warn!(%transfer_id, "transfer failed, reservation released");
        Ok(entry.clone())
    }

    pub fn transfer(&self, transfer_id: TransferId) -> Option<Transfer> {
        self.transfers.get(&transfer_id).map(|t| t.clone())
    }

    fn entry_mut(
        &self,
        transfer_id: TransferId,
    ) -> Result<dashmap::mapref::one::RefMut<'_, TransferId, Transfer>, TransferError> {
        self.transfers
            .get_mut(&transfer_id)
            .ok_or_else(|| TransferError::NotFound {
                transfer_id: transfer_id.to_string(),
            })
    }

    fn check_not_terminal(transfer: &Transfer) -> Result<(), TransferError> {
        if transfer.status.is_terminal() {
            return Err(TransferError::AlreadyTerminal {
                status: match transfer.status {
                    TransferStatus::Confirmed => "confirmed".to_string(),
                    TransferStatus::Failed => "failed".to_string(),
                    TransferStatus::Pending => "pending".to_string(),
                },
            });
        }
        Ok(())
    }
}
