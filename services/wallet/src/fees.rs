//! Network fee quoting
//!
//! Fees come from a [`FeeOracle`] so the service can swap in a live
//! estimator later; the shipped implementation is a static per-asset
//! schedule.

use rust_decimal::Decimal;
use std::collections::HashMap;
use types::errors::TransferError;

/// Source of current network fee estimates, denominated in the asset.
pub trait FeeOracle: Send + Sync {
    fn quote_network_fee(&self, asset: &str) -> Result<Decimal, TransferError>;
}

/// Fixed per-asset fee schedule.
pub struct StaticFeeSchedule {
    fees: HashMap<String, Decimal>,
}

impl StaticFeeSchedule {
    pub fn new(fees: impl IntoIterator<Item = (String, Decimal)>) -> Self {
        Self {
            fees: fees.into_iter().collect(),
        }
    }
}

impl Default for StaticFeeSchedule {
    fn default() -> Self {
        Self::new([
            ("BTC".to_string(), Decimal::new(1, 4)),  // 0.0001 BTC
            ("ETH".to_string(), Decimal::new(2, 3)),  // 0.002 ETH
            ("USDT".to_string(), Decimal::from(5)),
            ("USDC".to_string(), Decimal::from(5)),
        ])
    }
}

impl FeeOracle for StaticFeeSchedule {
    fn quote_network_fee(&self, asset: &str) -> Result<Decimal, TransferError> {
        self.fees
            .get(asset)
            .copied()
            .ok_or_else(|| TransferError::UnsupportedAsset(asset.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_quotes() {
        let oracle = StaticFeeSchedule::default();
        assert_eq!(
            oracle.quote_network_fee("BTC").unwrap(),
            Decimal::new(1, 4)
        );
        assert_eq!(oracle.quote_network_fee("USDT").unwrap(), Decimal::from(5));
    }

    #[test]
    fn test_unknown_asset_rejected() {
        let oracle = StaticFeeSchedule::default();
        assert!(matches!(
            oracle.quote_network_fee("DOGE"),
            Err(TransferError::UnsupportedAsset(_))
        ));
    }
}
