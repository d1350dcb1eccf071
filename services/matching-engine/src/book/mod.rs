//! Order book infrastructure
//!
//! One [`OrderBook`] per symbol: a bid side and an ask side, each a
//! price-sorted map of FIFO queues.

pub mod price_level;
pub mod side;

pub use price_level::{PriceLevel, RestingOrder};
pub use side::BookSide;

use rust_decimal::Decimal;
use types::ids::{OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

/// Both sides of a single symbol's book.
#[derive(Debug)]
pub struct OrderBook {
    pub symbol: Symbol,
    bids: BookSide,
    asks: BookSide,
}

/// Top-of-book and depth view for market data.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BookSnapshot {
    pub symbol: Symbol,
    pub bids: Vec<(Price, Quantity)>,
    pub asks: Vec<(Price, Quantity)>,
}

impl OrderBook {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
        }
    }

    fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Rest an order on its own side.
    pub fn insert(&mut self, order: &Order) {
        let price = order
            .limit_price
            .expect("only limit orders rest in the book");
        self.side_mut(order.side)
            .insert(price, order.order_id, order.account_id, order.remaining_quantity);
    }

    /// Remove a resting order. Returns its remaining quantity if found.
    pub fn remove(&mut self, side: Side, price: Price, order_id: &OrderId) -> Option<Quantity> {
        self.side_mut(side).remove(price, order_id)
    }

    /// Best level of the side opposite to an incoming order.
    pub fn opposite_best_mut(&mut self, taker_side: Side) -> Option<(Price, &mut PriceLevel)> {
        self.side_mut(taker_side.opposite()).best_level_mut()
    }

    /// Drop the opposite side's best level if a fill has emptied it.
    pub fn prune_opposite_best(&mut self, taker_side: Side) {
        self.side_mut(taker_side.opposite()).prune_best();
    }

    pub fn best_bid(&self) -> Option<(Price, Quantity)> {
        self.bids.best()
    }

    pub fn best_ask(&self) -> Option<(Price, Quantity)> {
        self.asks.best()
    }

    /// Quote cost of sweeping up to `quantity` from the ask side at current
    /// prices. Returns (fillable quantity, total quote cost). Used to size
    /// the reservation for a market buy; exact because the book cannot
    /// change between sizing and matching under the symbol lock.
    pub fn ask_sweep_cost(&self, quantity: Quantity) -> (Quantity, Decimal) {
        let mut remaining = quantity;
        let mut cost = Decimal::ZERO;
        for (price, level_qty) in self.asks.iter_levels() {
            if remaining.is_zero() {
                break;
            }
            let take = remaining.min(level_qty);
            cost += take.notional(price);
            remaining = remaining - take;
        }
        (quantity - remaining, cost)
    }

    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        BookSnapshot {
            symbol: self.symbol.clone(),
            bids: self.bids.depth(depth),
            asks: self.asks.depth(depth),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.side(Side::Buy).is_empty() && self.side(Side::Sell).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::AccountId;
    use types::order::OrderType;

    fn limit(side: Side, price: u64, qty: &str) -> Order {
        Order::new(
            AccountId::new(),
            Symbol::new("BTC/USD"),
            side,
            OrderType::Limit,
            Some(Price::from_u64(price)),
            Quantity::from_str(qty).unwrap(),
            1_708_123_456_789_000_000,
        )
    }

    #[test]
    fn test_best_bid_is_highest_best_ask_is_lowest() {
        let mut book = OrderBook::new(Symbol::new("BTC/USD"));
        book.insert(&limit(Side::Buy, 50_000, "1.0"));
        book.insert(&limit(Side::Buy, 51_000, "2.0"));
        book.insert(&limit(Side::Sell, 52_000, "1.5"));
        book.insert(&limit(Side::Sell, 53_000, "0.5"));

        assert_eq!(book.best_bid().unwrap().0, Price::from_u64(51_000));
        assert_eq!(book.best_ask().unwrap().0, Price::from_u64(52_000));
    }

    #[test]
    fn test_remove_clears_empty_levels() {
        let mut book = OrderBook::new(Symbol::new("BTC/USD"));
        let order = limit(Side::Buy, 50_000, "1.0");
        book.insert(&order);

        let removed = book.remove(Side::Buy, Price::from_u64(50_000), &order.order_id);
        assert_eq!(removed, Some(Quantity::from_str("1.0").unwrap()));
        assert!(book.is_empty());
    }

    #[test]
    fn test_ask_sweep_cost_spans_levels() {
        let mut book = OrderBook::new(Symbol::new("BTC/USD"));
        book.insert(&limit(Side::Sell, 100, "1.0"));
        book.insert(&limit(Side::Sell, 110, "1.0"));

        let (fillable, cost) = book.ask_sweep_cost(Quantity::from_str("1.5").unwrap());
        assert_eq!(fillable, Quantity::from_str("1.5").unwrap());
        // 1.0 @ 100 + 0.5 @ 110
        assert_eq!(cost, Decimal::from(155));
    }

    #[test]
    fn test_ask_sweep_cost_partial_liquidity() {
        let mut book = OrderBook::new(Symbol::new("BTC/USD"));
        book.insert(&limit(Side::Sell, 100, "0.4"));

        let (fillable, cost) = book.ask_sweep_cost(Quantity::from_str("2.0").unwrap());
        assert_eq!(fillable, Quantity::from_str("0.4").unwrap());
        assert_eq!(cost, Decimal::from(40));
    }

    #[test]
    fn test_snapshot_depth_ordering() {
        let mut book = OrderBook::new(Symbol::new("BTC/USD"));
        book.insert(&limit(Side::Buy, 49_000, "1.0"));
        book.insert(&limit(Side::Buy, 51_000, "1.0"));
        book.insert(&limit(Side::Buy, 50_000, "1.0"));
        book.insert(&limit(Side::Sell, 54_000, "1.0"));
        book.insert(&limit(Side::Sell, 52_000, "1.0"));

        let snap = book.snapshot(2);
        assert_eq!(snap.bids.len(), 2);
        assert_eq!(snap.bids[0].0, Price::from_u64(51_000));
        assert_eq!(snap.bids[1].0, Price::from_u64(50_000));
        assert_eq!(snap.asks[0].0, Price::from_u64(52_000));
    }
}
