//! Single-asset balance with available/reserved split
//!
//! Invariant: both components are non-negative at all times. Reserved only
//! grows through `reserve` and only shrinks through `release` or a negative
//! settle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::errors::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub available: Decimal,
    pub reserved: Decimal,
}

impl Balance {
    pub fn new(available: Decimal) -> Self {
        Self {
            available,
            reserved: Decimal::ZERO,
        }
    }

    pub fn zero() -> Self {
        Self::new(Decimal::ZERO)
    }

    pub fn total(&self) -> Decimal {
        self.available + self.reserved
    }

    /// Check the non-negativity invariant.
    pub fn check_invariant(&self) -> bool {
        self.available >= Decimal::ZERO && self.reserved >= Decimal::ZERO
    }

    /// Move `amount` from available to reserved.
    pub fn reserve(&mut self, asset: &str, amount: Decimal) -> Result<(), LedgerError> {
        debug_assert!(amount >= Decimal::ZERO);
        if amount > self.available {
            return Err(LedgerError::InsufficientBalance {
                asset: asset.to_string(),
                required: amount.to_string(),
                available: self.available.to_string(),
            });
        }
        self.available -= amount;
        self.reserved += amount;
        Ok(())
    }

    /// Move `amount` from reserved back to available.
    pub fn release(&mut self, asset: &str, amount: Decimal) -> Result<(), LedgerError> {
        debug_assert!(amount >= Decimal::ZERO);
        if amount > self.reserved {
            return Err(LedgerError::InsufficientReserved {
                asset: asset.to_string(),
                required: amount.to_string(),
                reserved: self.reserved.to_string(),
            });
        }
        self.reserved -= amount;
        self.available += amount;
        Ok(())
    }

    /// Apply a signed balance change. A negative delta consumes reserved
    /// funds (settling a reservation); a positive delta credits available
    /// funds (trade proceeds, deposits).
    pub fn settle(&mut self, asset: &str, delta: Decimal) -> Result<(), LedgerError> {
        if delta < Decimal::ZERO {
            let debit = -delta;
            if debit > self.reserved {
                return Err(LedgerError::InsufficientReserved {
                    asset: asset.to_string(),
                    required: debit.to_string(),
                    reserved: self.reserved.to_string(),
                });
            }
            self.reserved -= debit;
        } else {
            self.available += delta;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_moves_available_to_reserved() {
        let mut b = Balance::new(Decimal::from(100));
        b.reserve("USD", Decimal::from(40)).unwrap();
        assert_eq!(b.available, Decimal::from(60));
        assert_eq!(b.reserved, Decimal::from(40));
        assert_eq!(b.total(), Decimal::from(100));
    }

    #[test]
    fn test_reserve_insufficient() {
        let mut b = Balance::new(Decimal::from(10));
        let err = b.reserve("USD", Decimal::from(11)).unwrap_err();
        assert!(matches!(
            err,
            types::errors::LedgerError::InsufficientBalance { .. }
        ));
        // Rejected before any mutation
        assert_eq!(b.available, Decimal::from(10));
        assert_eq!(b.reserved, Decimal::ZERO);
    }

    #[test]
    fn test_release_reverses_reserve() {
        let mut b = Balance::new(Decimal::from(100));
        b.reserve("USD", Decimal::from(40)).unwrap();
        b.release("USD", Decimal::from(40)).unwrap();
        assert_eq!(b, Balance::new(Decimal::from(100)));
    }

    #[test]
    fn test_release_more_than_reserved_fails() {
        let mut b = Balance::new(Decimal::from(100));
        b.reserve("USD", Decimal::from(10)).unwrap();
        assert!(b.release("USD", Decimal::from(11)).is_err());
    }

    #[test]
    fn test_negative_settle_consumes_reserved() {
        let mut b = Balance::new(Decimal::from(100));
        b.reserve("USD", Decimal::from(100)).unwrap();
        b.settle("USD", Decimal::from(-99)).unwrap();
        b.release("USD", Decimal::ONE).unwrap();
        assert_eq!(b.available, Decimal::ONE);
        assert_eq!(b.reserved, Decimal::ZERO);
    }

    #[test]
    fn test_positive_settle_credits_available() {
        let mut b = Balance::zero();
        b.settle("BTC", Decimal::new(1, 2)).unwrap();
        assert_eq!(b.available, Decimal::new(1, 2));
    }

    #[test]
    fn test_settle_overdraw_reserved_fails() {
        let mut b = Balance::new(Decimal::from(10));
        b.reserve("USD", Decimal::from(5)).unwrap();
        assert!(b.settle("USD", Decimal::from(-6)).is_err());
        assert!(b.check_invariant());
    }
}
