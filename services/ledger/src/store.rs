//! Concurrent balance store
//!
//! Balances live in a sharded map keyed by (account, asset). The map's entry
//! API holds the shard lock for the duration of one operation, so all
//! mutations to a single (account, asset) pair are serialized while distinct
//! pairs proceed in parallel. This serialization is independent of the
//! matching engine's per-symbol locking: one account can have orders resting
//! on many symbols at once.

use dashmap::DashMap;
use rust_decimal::Decimal;
use types::errors::LedgerError;
use types::ids::AccountId;

use crate::balance::Balance;

type BalanceKey = (AccountId, String);

#[derive(Debug, Default)]
pub struct Ledger {
    balances: DashMap<BalanceKey, Balance>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            balances: DashMap::new(),
        }
    }

    /// Credit available funds (fiat deposit completion, test setup).
    pub fn deposit(&self, account: AccountId, asset: &str, amount: Decimal) {
        debug_assert!(amount >= Decimal::ZERO);
        let mut entry = self
            .balances
            .entry((account, asset.to_string()))
            .or_insert_with(Balance::zero);
        entry.available += amount;
        tracing::debug!(%account, asset, %amount, "ledger deposit");
    }

    /// Move funds from available to reserved, failing with
    /// `InsufficientBalance` before any mutation if available < amount.
    pub fn reserve(
        &self,
        account: AccountId,
        asset: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let mut entry = self
            .balances
            .entry((account, asset.to_string()))
            .or_insert_with(Balance::zero);
        entry.reserve(asset, amount)
    }

    /// Reverse a reservation.
    pub fn release(
        &self,
        account: AccountId,
        asset: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Ok(());
        }
        let mut entry = self.entry_mut(account, asset)?;
        entry.release(asset, amount)
    }

    /// Apply a signed balance change atomically. Negative deltas settle
    /// against reserved funds; positive deltas credit available funds.
    pub fn settle(
        &self,
        account: AccountId,
        asset: &str,
        delta: Decimal,
    ) -> Result<(), LedgerError> {
        if delta.is_zero() {
            return Ok(());
        }
        if delta > Decimal::ZERO {
            // Credits may create the balance entry.
            let mut entry = self
                .balances
                .entry((account, asset.to_string()))
                .or_insert_with(Balance::zero);
            return entry.settle(asset, delta);
        }
        let mut entry = self.entry_mut(account, asset)?;
        entry.settle(asset, delta)
    }

    /// Snapshot of one balance. Returns a zero balance for unknown pairs.
    pub fn balance(&self, account: AccountId, asset: &str) -> Balance {
        self.balances
            .get(&(account, asset.to_string()))
            .map(|b| b.clone())
            .unwrap_or_else(Balance::zero)
    }

    /// Snapshot of all balances held by an account.
    pub fn balances_for(&self, account: AccountId) -> Vec<(String, Balance)> {
        let mut out: Vec<(String, Balance)> = self
            .balances
            .iter()
            .filter(|e| e.key().0 == account)
            .map(|e| (e.key().1.clone(), e.value().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    fn entry_mut(
        &self,
        account: AccountId,
        asset: &str,
    ) -> Result<dashmap::mapref::one::RefMut<'_, BalanceKey, Balance>, LedgerError> {
        self.balances
            .get_mut(&(account, asset.to_string()))
            .ok_or_else(|| LedgerError::UnknownAccount {
                account_id: account.to_string(),
            })
    }
}
