//! Trade (fill) types
//!
//! A trade records one atomic exchange between a resting maker order and an
//! incoming taker order. Trades are immutable once created and carry a global
//! monotonic sequence number assigned by the matching engine.

use crate::ids::{AccountId, OrderId, Symbol, TradeId};
use crate::numeric::{Price, Quantity};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    /// Global monotonic sequence; gapless within one engine run.
    pub sequence: u64,
    pub symbol: Symbol,

    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub maker_account_id: AccountId,
    pub taker_account_id: AccountId,

    /// Side of the incoming (taker) order.
    pub taker_side: Side,
    /// Execution price: always the resting maker order's price.
    pub price: Price,
    pub quantity: Quantity,

    /// Fee charged to the maker, in the asset the maker received.
    pub maker_fee: Decimal,
    /// Fee charged to the taker, in the asset the taker received.
    pub taker_fee: Decimal,

    pub executed_at: i64, // Unix nanos
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        symbol: Symbol,
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        maker_account_id: AccountId,
        taker_account_id: AccountId,
        taker_side: Side,
        price: Price,
        quantity: Quantity,
        maker_fee: Decimal,
        taker_fee: Decimal,
        executed_at: i64,
    ) -> Self {
        Self {
            trade_id: TradeId::new(),
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
            executed_at,
        }
    }

    /// Notional value (price × quantity) in the quote asset.
    pub fn notional(&self) -> Decimal {
        self.quantity.notional(self.price)
    }
}
