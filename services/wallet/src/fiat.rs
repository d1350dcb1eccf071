//! Fiat gateway adapter
//!
//! Deposits and withdrawals route through an external [`PaymentRail`].
//! Withdrawals reserve funds up front and either settle (rail completed)
//! or release (rail failed); deposits credit the ledger only once the rail
//! reports completion. Rail unreachability surfaces as a failed transaction
//! with a message, never a silent drop and never a leaked reservation.

use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;
use types::errors::TransferError;
use types::ids::{AccountId, FiatTxId};
use types::transfer::{FiatDirection, FiatTransaction};

use ledger::Ledger;

/// External payment rail seam.
pub trait PaymentRail: Send + Sync {
    /// Pull funds from the user's payment method.
    fn collect(&self, tx: &FiatTransaction) -> Result<(), TransferError>;
    /// Push funds out to the user's payment method.
    fn payout(&self, tx: &FiatTransaction) -> Result<(), TransferError>;
}

/// A rail that always reports unreachable; for failure-path tests.
#[derive(Debug, Default)]
pub struct UnreachableRail;

impl PaymentRail for UnreachableRail {
    fn collect(&self, _tx: &FiatTransaction) -> Result<(), TransferError> {
        Err(TransferError::NetworkFailure("payment rail unreachable".into()))
    }

    fn payout(&self, _tx: &FiatTransaction) -> Result<(), TransferError> {
        Err(TransferError::NetworkFailure("payment rail unreachable".into()))
    }
}

const SUPPORTED_CURRENCIES: &[&str] = &["USD", "EUR", "GBP"];

pub struct FiatGateway {
    ledger: Arc<Ledger>,
    transactions: DashMap<FiatTxId, FiatTransaction>,
    rail: Box<dyn PaymentRail>,
}

impl FiatGateway {
    pub fn new(ledger: Arc<Ledger>, rail: Box<dyn PaymentRail>) -> Self {
        Self {
            ledger,
            transactions: DashMap::new(),
            rail,
        }
    }

    /// Deposit fiat: the ledger is credited only after the rail confirms
    /// collection. A rail failure is recorded as a failed transaction with
    /// the rail's message; the ledger is untouched.
    pub fn deposit_fiat(
        &self,
        account: AccountId,
        currency: &str,
        amount: Decimal,
        payment_method: &str,
        timestamp: i64,
    ) -> Result<FiatTransaction, TransferError> {
        Self::validate(currency, amount)?;

        let mut tx = FiatTransaction::new(
            account,
            currency,
            amount,
            FiatDirection::Deposit,
            payment_method,
            timestamp,
        );

        match self.rail.collect(&tx) {
            Ok(()) => {
                self.ledger.deposit(account, currency, amount);
                tx.complete("deposit completed", timestamp);
                tracing::info!(transaction_id = %tx.transaction_id, %account, currency, %amount, "fiat deposit completed");
            }
            Err(e) => {
                tx.fail(e.to_string(), timestamp);
                tracing::warn!(transaction_id = %tx.transaction_id, error = %e, "fiat deposit failed");
            }
        }

        self.transactions.insert(tx.transaction_id, tx.clone());
        Ok(tx)
    }

    /// Withdraw fiat: reserve up front, settle on rail completion, release
    /// on rail failure.
    pub fn withdraw_fiat(
        &self,
        account: AccountId,
        currency: &str,
        amount: Decimal,
        payment_method: &str,
        timestamp: i64,
    ) -> Result<FiatTransaction, TransferError> {
        Self::validate(currency, amount)?;

        let mut tx = FiatTransaction::new(
            account,
            currency,
            amount,
            FiatDirection::Withdraw,
            payment_method,
            timestamp,
        );

        self.ledger
            .reserve(account, currency, amount)
            .map_err(|e| TransferError::InsufficientBalance(e.to_string()))?;

        match self.rail.payout(&tx) {
            Ok(()) => {
                self.ledger
                    .settle(account, currency, -amount)
                    .map_err(|e| TransferError::NetworkFailure(e.to_string()))?;
                tx.complete("withdrawal completed", timestamp);
                tracing::info!(transaction_id = %tx.transaction_id, %account, currency, %amount, "fiat withdrawal completed");
            }
            Err(e) => {
                // The reservation must not survive a failed payout.
                self.ledger
                    .release(account, currency, amount)
                    .map_err(|le| TransferError::NetworkFailure(le.to_string()))?;
                tx.fail(e.to_string(), timestamp);
                tracing::warn!(transaction_id = %tx.transaction_id, error = %e, "fiat withdrawal failed");
            }
        }

        self.transactions.insert(tx.transaction_id, tx.clone());
        Ok(tx)
    }

    pub fn transaction(&self, id: FiatTxId) -> Option<FiatTransaction> {
        self.transactions.get(&id).map(|t| t.clone())
    }

    fn validate(currency: &str, amount: Decimal) -> Result<(), TransferError> {
        if !SUPPORTED_CURRENCIES.contains(&currency) {
            return Err(TransferError::UnsupportedAsset(currency.to_string()));
        }
        if amount <= Decimal::ZERO {
            return Err(TransferError::InvalidAmount(amount.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::transfer::FiatStatus;

    const TS: i64 = 1_708_123_456_789_000_000;

    /// Rail that completes everything.
    #[derive(Debug, Default)]
    struct AlwaysOnRail;

    impl PaymentRail for AlwaysOnRail {
        fn collect(&self, _tx: &FiatTransaction) -> Result<(), TransferError> {
            Ok(())
        }
        fn payout(&self, _tx: &FiatTransaction) -> Result<(), TransferError> {
            Ok(())
        }
    }

    fn gateway(rail: Box<dyn PaymentRail>) -> (FiatGateway, Arc<Ledger>, AccountId) {
        let ledger = Arc::new(Ledger::new());
        let account = AccountId::new();
        (FiatGateway::new(Arc::clone(&ledger), rail), ledger, account)
    }

    #[test]
    fn test_deposit_credits_on_completion() {
        let (gw, ledger, account) = gateway(Box::new(AlwaysOnRail));
        let tx = gw
            .deposit_fiat(account, "USD", Decimal::from(500), "card_visa", TS)
            .unwrap();

        assert_eq!(tx.status, FiatStatus::Completed);
        assert!(!tx.message.is_empty());
        assert_eq!(ledger.balance(account, "USD").available, Decimal::from(500));
    }

    #[test]
    fn test_deposit_rail_failure_no_credit() {
        let (gw, ledger, account) = gateway(Box::new(UnreachableRail));
        let tx = gw
            .deposit_fiat(account, "USD", Decimal::from(500), "card_visa", TS)
            .unwrap();

        assert_eq!(tx.status, FiatStatus::Failed);
        assert!(tx.message.contains("unreachable"));
        assert_eq!(ledger.balance(account, "USD").available, Decimal::ZERO);
    }

    #[test]
    fn test_withdraw_settles_reservation() {
        let (gw, ledger, account) = gateway(Box::new(AlwaysOnRail));
        ledger.deposit(account, "USD", Decimal::from(1_000));

        let tx = gw
            .withdraw_fiat(account, "USD", Decimal::from(300), "bank_ach", TS)
            .unwrap();

        assert_eq!(tx.status, FiatStatus::Completed);
        let b = ledger.balance(account, "USD");
        assert_eq!(b.available, Decimal::from(700));
        assert_eq!(b.reserved, Decimal::ZERO);
    }

    #[test]
    fn test_withdraw_rail_failure_releases_reservation() {
        let (gw, ledger, account) = gateway(Box::new(UnreachableRail));
        ledger.deposit(account, "USD", Decimal::from(1_000));

        let tx = gw
            .withdraw_fiat(account, "USD", Decimal::from(300), "bank_ach", TS)
            .unwrap();

        assert_eq!(tx.status, FiatStatus::Failed);
        let b = ledger.balance(account, "USD");
        assert_eq!(b.available, Decimal::from(1_000));
        assert_eq!(b.reserved, Decimal::ZERO);
    }

    #[test]
    fn test_withdraw_insufficient_balance() {
        let (gw, ledger, account) = gateway(Box::new(AlwaysOnRail));
        ledger.deposit(account, "USD", Decimal::from(10));

        let err = gw
            .withdraw_fiat(account, "USD", Decimal::from(300), "bank_ach", TS)
            .unwrap_err();
        assert!(matches!(err, TransferError::InsufficientBalance(_)));
        assert_eq!(ledger.balance(account, "USD").available, Decimal::from(10));
    }

    #[test]
    fn test_unsupported_currency_rejected() {
        let (gw, _, account) = gateway(Box::new(AlwaysOnRail));
        assert!(matches!(
            gw.deposit_fiat(account, "JPY", Decimal::ONE, "card", TS),
            Err(TransferError::UnsupportedAsset(_))
        ));
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let (gw, _, account) = gateway(Box::new(AlwaysOnRail));
        assert!(matches!(
            gw.deposit_fiat(account, "USD", Decimal::ZERO, "card", TS),
            Err(TransferError::InvalidAmount(_))
        ));
        assert!(matches!(
            gw.withdraw_fiat(account, "USD", Decimal::from(-5), "card", TS),
            Err(TransferError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_transaction_lookup() {
        let (gw, _, account) = gateway(Box::new(AlwaysOnRail));
        let tx = gw
            .deposit_fiat(account, "EUR", Decimal::from(50), "sepa", TS)
            .unwrap();
        let found = gw.transaction(tx.transaction_id).unwrap();
        assert_eq!(found, tx);
        assert!(gw.transaction(FiatTxId::new()).is_none());
    }
}
