//! Trade construction and fee calculation
//!
//! Each match produces one immutable [`Trade`] carrying a gapless sequence
//! number. Fees are charged in the asset the party receives: the buyer's fee
//! comes out of the base it gains, the seller's out of the quote proceeds.

use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use types::ids::{AccountId, OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::trade::Trade;

/// Maker/taker fee rates in basis points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule {
    pub maker_bps: u32,
    pub taker_bps: u32,
}

impl Default for FeeSchedule {
    /// Maker 0 bp, taker 5 bp.
    fn default() -> Self {
        Self {
            maker_bps: 0,
            taker_bps: 5,
        }
    }
}

impl FeeSchedule {
    fn rate(bps: u32) -> Decimal {
        Decimal::from(bps) / Decimal::from(10_000)
    }

    /// Fee for the buying party, in base asset.
    fn base_fee(&self, bps: u32, quantity: Quantity) -> Decimal {
        quantity.as_decimal() * Self::rate(bps)
    }

    /// Fee for the selling party, in quote asset.
    fn quote_fee(&self, bps: u32, quantity: Quantity, price: Price) -> Decimal {
        quantity.notional(price) * Self::rate(bps)
    }
}

/// Builds trades with monotonically increasing sequence numbers.
///
/// The counter is shared across all symbols so trade sequences are globally
/// monotonic, which journal replay depends on.
#[derive(Debug)]
pub struct TradeFactory {
    sequence: Arc<AtomicU64>,
    fees: FeeSchedule,
}

impl TradeFactory {
    pub fn new(sequence: Arc<AtomicU64>, fees: FeeSchedule) -> Self {
        Self { sequence, fees }
    }

    pub fn next_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Build a trade for one fill at the maker's price.
    #[allow(clippy::too_many_arguments)]
    pub fn make_trade(
        &mut self,
        symbol: Symbol,
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        maker_account_id: AccountId,
        taker_account_id: AccountId,
        taker_side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: i64,
    ) -> Trade {
        let (maker_fee, taker_fee) = match taker_side {
            // Taker buys base, maker sells for quote.
            Side::Buy => (
                self.fees.quote_fee(self.fees.maker_bps, quantity, price),
                self.fees.base_fee(self.fees.taker_bps, quantity),
            ),
            // Taker sells for quote, maker buys base.
            Side::Sell => (
                self.fees.base_fee(self.fees.maker_bps, quantity),
                self.fees.quote_fee(self.fees.taker_bps, quantity, price),
            ),
        };

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);

        Trade::new(
            sequence,
            symbol,
            maker_order_id,
            taker_order_id,
            maker_account_id,
            taker_account_id,
            taker_side,
            price,
            quantity,
            maker_fee,
            taker_fee,
            timestamp,
        )
    }
}
