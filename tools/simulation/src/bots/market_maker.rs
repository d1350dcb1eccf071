//! Market maker bot with spread quoting and inventory skew.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use types::errors::{ExchangeError, OrderError};
use types::ids::{AccountId, OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderType, Side};

use crate::bots::TickOutcome;
use matching_engine::{Exchange, OrderRequest};

#[derive(Debug, Clone)]
pub struct MarketMakerConfig {
    /// Full spread in basis points.
    pub spread_bps: u32,
    /// Quoted size per side, before jitter.
    pub order_size: Quantity,
    /// Net inventory bound; quoting stops on the heavy side beyond it.
    pub max_inventory: Decimal,
    /// Anchor when the book is empty.
    pub reference_price: Decimal,
}

impl Default for MarketMakerConfig {
    fn default() -> Self {
        Self {
            spread_bps: 10,
            order_size: Quantity::from_str("1").unwrap(),
            max_inventory: Decimal::from(10),
            reference_price: Decimal::from(50_000),
        }
    }
}

/// Quotes both sides of one market, re-quoting every tick and skewing
/// prices against accumulated inventory.
pub struct MarketMaker {
    pub account_id: AccountId,
    pub symbol: Symbol,
    pub config: MarketMakerConfig,
    pub net_inventory: Decimal,
    open_quotes: Vec<OrderId>,
    rng: ChaCha8Rng,
}

impl MarketMaker {
    pub fn new(
        account_id: AccountId,
        symbol: Symbol,
        config: MarketMakerConfig,
        rng: ChaCha8Rng,
    ) -> Self {
        Self {
            account_id,
            symbol,
            config,
            net_inventory: Decimal::ZERO,
            open_quotes: Vec::new(),
            rng,
        }
    }

    /// Pull last tick's quotes, absorb any fills into inventory, and quote
    /// a fresh bid/ask around the current mid.
    pub fn tick(&mut self, exchange: &Exchange) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        self.refresh_quotes(exchange);

        let mid = self.mid_price(exchange);
        let half_spread =
            mid * Decimal::from(self.config.spread_bps) / Decimal::from(20_000);
        let skew = if self.config.max_inventory.is_zero() {
            Decimal::ZERO
        } else {
            self.net_inventory / self.config.max_inventory * half_spread
        };

        if self.net_inventory < self.config.max_inventory {
            self.quote(exchange, Side::Buy, mid - half_spread - skew, &mut outcome);
        }
        if self.net_inventory > -self.config.max_inventory {
            self.quote(exchange, Side::Sell, mid + half_spread - skew, &mut outcome);
        }
        outcome
    }

    fn quote(
        &mut self,
        exchange: &Exchange,
        side: Side,
        raw_price: Decimal,
        outcome: &mut TickOutcome,
    ) {
        let price = match Price::try_new(raw_price.round_dp(2)) {
            Ok(p) => p,
            Err(_) => return,
        };
        let size = self.jittered_size();

        let result = exchange.submit_order(OrderRequest {
            account_id: self.account_id,
            symbol: self.symbol.clone(),
            side,
            order_type: OrderType::Limit,
            price: Some(price),
            quantity: size,
        });
        outcome.absorb(&result);

        if let Ok(report) = result {
            self.apply_fills(&report.order);
            if !report.order.status.is_terminal() {
                self.open_quotes.push(report.order.order_id);
            }
        }
    }

    /// Cancel outstanding quotes, folding whatever filled since last tick
    /// into net inventory.
    fn refresh_quotes(&mut self, exchange: &Exchange) {
        let quotes = std::mem::take(&mut self.open_quotes);
        for order_id in quotes {
            match exchange.cancel_order(order_id) {
                Ok(report) => self.apply_fills(&report.order),
                Err(ExchangeError::Order(OrderError::AlreadyTerminal { .. })) => {
                    if let Some(order) = exchange.order(order_id) {
                        self.apply_fills(&order);
                    }
                }
                Err(_) => {}
            }
        }
    }

    fn apply_fills(&mut self, order: &Order) {
        let filled = order.filled_quantity.as_decimal();
        match order.side {
            Side::Buy => self.net_inventory += filled,
            Side::Sell => self.net_inventory -= filled,
        }
    }

    fn mid_price(&mut self, exchange: &Exchange) -> Decimal {
        let snap = match exchange.book_snapshot(&self.symbol, 1) {
            Ok(s) => s,
            Err(_) => return self.config.reference_price,
        };
        match (snap.bids.first(), snap.asks.first()) {
            (Some((bid, _)), Some((ask, _))) => {
                (bid.as_decimal() + ask.as_decimal()) / Decimal::TWO
            }
            (Some((bid, _)), None) => bid.as_decimal(),
            (None, Some((ask, _))) => ask.as_decimal(),
            (None, None) => self.config.reference_price,
        }
    }

    fn jittered_size(&mut self) -> Quantity {
        let pct = Decimal::from(self.rng.gen_range(80..=120u32));
        let size = self.config.order_size.as_decimal() * pct / Decimal::ONE_HUNDRED;
        Quantity::try_new(size.round_dp(4)).unwrap_or(self.config.order_size)
    }
}
