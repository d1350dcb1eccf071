//! Retail taker bot sending a seeded mix of market and crossing limit orders.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use types::ids::{AccountId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::{OrderType, Side};

use crate::bots::TickOutcome;
use matching_engine::{Exchange, OrderRequest};

#[derive(Debug, Clone)]
pub struct TakerConfig {
    pub symbols: Vec<Symbol>,
    /// Order size before jitter.
    pub order_size: Quantity,
    /// Probability a tick sends a market order instead of a limit.
    pub market_ratio: f64,
    /// Anchor for limit prices when the book is empty.
    pub reference_price: Decimal,
}

pub struct Taker {
    pub account_id: AccountId,
    config: TakerConfig,
    rng: ChaCha8Rng,
}

impl Taker {
    pub fn new(account_id: AccountId, config: TakerConfig, rng: ChaCha8Rng) -> Self {
        assert!(!config.symbols.is_empty());
        Self {
            account_id,
            config,
            rng,
        }
    }

    pub fn tick(&mut self, exchange: &Exchange) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        let symbol =
            self.config.symbols[self.rng.gen_range(0..self.config.symbols.len())].clone();
        let side = if self.rng.gen_bool(0.5) {
            Side::Buy
        } else {
            Side::Sell
        };
        let quantity = self.jittered_size();

        let (order_type, price) = if self.rng.gen_bool(self.config.market_ratio) {
            (OrderType::Market, None)
        } else {
            (OrderType::Limit, self.crossing_price(exchange, &symbol, side))
        };
        if order_type == OrderType::Limit && price.is_none() {
            return outcome;
        }

        let result = exchange.submit_order(OrderRequest {
            account_id: self.account_id,
            symbol,
            side,
            order_type,
            price,
            quantity,
        });
        outcome.absorb(&result);
        outcome
    }

    /// A limit price at or through the far touch, so the order takes
    /// liquidity when any is there.
    fn crossing_price(
        &mut self,
        exchange: &Exchange,
        symbol: &Symbol,
        side: Side,
    ) -> Option<Price> {
        let snap = exchange.book_snapshot(symbol, 1).ok()?;
        let anchor = match side {
            Side::Buy => snap
                .asks
                .first()
                .map(|(p, _)| p.as_decimal())
                .unwrap_or(self.config.reference_price),
            Side::Sell => snap
                .bids
                .first()
                .map(|(p, _)| p.as_decimal())
                .unwrap_or(self.config.reference_price),
        };
        // Nudge up to 10 bp through the touch.
        let bps = Decimal::from(self.rng.gen_range(0..=10u32)) / Decimal::from(10_000);
        let raw = match side {
            Side::Buy => anchor * (Decimal::ONE + bps),
            Side::Sell => anchor * (Decimal::ONE - bps),
        };
        Price::try_new(raw.round_dp(2)).ok()
    }

    fn jittered_size(&mut self) -> Quantity {
        let pct = Decimal::from(self.rng.gen_range(10..=100u32));
        let size = self.config.order_size.as_decimal() * pct / Decimal::ONE_HUNDRED;
        Quantity::try_new(size.round_dp(4)).unwrap_or(self.config.order_size)
    }
}
