//! Crossing detection
//!
//! An incoming buy crosses when its limit is at or above the best ask; an
//! incoming sell crosses when its limit is at or below the best bid. Market
//! orders carry no limit and cross any resting price.

use types::numeric::Price;
use types::order::Side;

/// Can an incoming order trade against a resting price?
///
/// `taker_limit` is `None` for market orders.
pub fn crosses(taker_side: Side, taker_limit: Option<Price>, maker_price: Price) -> bool {
    match (taker_side, taker_limit) {
        (_, None) => true,
        (Side::Buy, Some(limit)) => limit >= maker_price,
        (Side::Sell, Some(limit)) => limit <= maker_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_crosses_at_or_above_ask() {
        let ask = Price::from_u64(100);
        assert!(crosses(Side::Buy, Some(Price::from_u64(101)), ask));
        assert!(crosses(Side::Buy, Some(Price::from_u64(100)), ask));
        assert!(!crosses(Side::Buy, Some(Price::from_u64(99)), ask));
    }

    #[test]
    fn test_sell_crosses_at_or_below_bid() {
        let bid = Price::from_u64(100);
        assert!(crosses(Side::Sell, Some(Price::from_u64(99)), bid));
        assert!(crosses(Side::Sell, Some(Price::from_u64(100)), bid));
        assert!(!crosses(Side::Sell, Some(Price::from_u64(101)), bid));
    }

    #[test]
    fn test_market_orders_ignore_price() {
        assert!(crosses(Side::Buy, None, Price::from_u64(1_000_000)));
        assert!(crosses(Side::Sell, None, Price::from_u64(1)));
    }
}
