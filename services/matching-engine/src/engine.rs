//! Single-symbol matching engine
//!
//! All state for one symbol: the book, every order ever submitted to it, and
//! the reservation remaining behind each live order. A [`SymbolEngine`] is
//! not thread safe; the [`crate::Exchange`] serializes access behind one
//! mutex per symbol (single-writer-per-symbol discipline), which is what
//! makes time-priority matching deterministic.
//!
//! Reservation accounting: at submission the engine reserves the quote cost
//! for buys (limit price × quantity, or the exact sweep cost for market
//! buys) and the base quantity for sells. Every fill settles against that
//! reservation, limit buys release the price-improvement difference
//! immediately, and any cancel releases exactly what the `reserved` map
//! still tracks — so no path can leak reserved funds.

use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use ledger::Ledger;
use rust_decimal::Decimal;
use types::errors::{ExchangeError, OrderError};
use types::ids::{AccountId, OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderStatus, OrderType, Side};
use types::trade::Trade;

use crate::book::{BookSnapshot, OrderBook};
use crate::matching::crossing;
use crate::matching::executor::{FeeSchedule, TradeFactory};

/// A validated order submission.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub account_id: AccountId,
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    /// Limit price. Required for limit orders; ignored for market orders,
    /// whose execution price is determined at match time.
    pub price: Option<Price>,
    pub quantity: Quantity,
}

/// Outcome of a submission: the order's final state plus all fills.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub order: Order,
    pub trades: Vec<Trade>,
}

/// Outcome of a cancel: the quantity actually cancelled, which may be less
/// than the original quantity if fills raced the cancel.
#[derive(Debug, Clone)]
pub struct CancelReport {
    pub order: Order,
    pub cancelled_quantity: Quantity,
}

pub struct SymbolEngine {
    book: OrderBook,
    /// Every order submitted to this symbol, terminal ones included, so
    /// cancel-after-terminal races report `AlreadyTerminal` rather than
    /// pretending the order never existed.
    orders: HashMap<OrderId, Order>,
    /// Funds still reserved behind each live order: quote for buys, base
    /// for sells.
    reserved: HashMap<OrderId, Decimal>,
    factory: TradeFactory,
}

impl SymbolEngine {
    pub fn new(symbol: Symbol, sequence: Arc<AtomicU64>, fees: FeeSchedule) -> Self {
        Self {
            book: OrderBook::new(symbol),
            orders: HashMap::new(),
            reserved: HashMap::new(),
            factory: TradeFactory::new(sequence, fees),
        }
    }

    /// Submit an order: reserve, match, rest or cancel the remainder.
    pub fn submit(
        &mut self,
        req: OrderRequest,
        ledger: &Ledger,
        timestamp: i64,
    ) -> Result<ExecutionReport, ExchangeError> {
        let mut order = self.validate(req, timestamp)?;

        // Reserve before the order touches the book. A failed reservation
        // rejects the order with no state change anywhere.
        let reserve_amount = self.reservation_for(&order);
        ledger.reserve(order.account_id, reserve_asset(&order), reserve_amount)?;
        self.reserved.insert(order.order_id, reserve_amount);

        let mut trades = Vec::new();
        let mut self_cross = false;

        while !order.remaining_quantity.is_zero() {
            let (maker_price, maker) = match self.book.opposite_best_mut(order.side) {
                Some((price, level)) => match level.front() {
                    Some(front) => (price, front),
                    None => break,
                },
                None => break,
            };

            if !crossing::crosses(order.side, order.limit_price, maker_price) {
                break;
            }
            if maker.account_id == order.account_id {
                // Self-trade prevention, cancel-taker policy: the incoming
                // order's remainder is cancelled rather than trading
                // against the account's own resting order.
                self_cross = true;
                break;
            }

            let fill = order.remaining_quantity.min(maker.remaining);
            let trade = self.factory.make_trade(
                self.book.symbol.clone(),
                maker.order_id,
                order.order_id,
                maker.account_id,
                order.account_id,
                order.side,
                maker_price,
                fill,
                timestamp,
            );

            self.settle_fill(ledger, &trade, order.limit_price)?;
            self.apply_maker_fill(&trade, timestamp);

            if let Some((_, level)) = self.book.opposite_best_mut(order.side) {
                level.consume_front(fill);
            }
            self.book.prune_opposite_best(order.side);

            order.apply_fill(fill, timestamp);
            trades.push(trade);
        }

        if self_cross || (order.order_type == OrderType::Market && !order.is_filled()) {
            // Market remainders never rest; self-crossed takers are cut.
            self.release_remainder(&mut order, ledger, timestamp)?;
        } else if !order.remaining_quantity.is_zero() {
            self.book.insert(&order);
        } else {
            self.reserved.remove(&order.order_id);
        }

        tracing::info!(
            order_id = %order.order_id,
            symbol = %order.symbol,
            status = ?order.status,
            fills = trades.len(),
            "order processed"
        );

        self.orders.insert(order.order_id, order.clone());
        Ok(ExecutionReport { order, trades })
    }

    /// Cancel a resting order, releasing exactly the reservation still
    /// tracked for it. Racing a fill is expected: the report carries the
    /// quantity actually cancelled.
    pub fn cancel(
        &mut self,
        order_id: OrderId,
        ledger: &Ledger,
        timestamp: i64,
    ) -> Result<CancelReport, ExchangeError> {
        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| OrderError::NotFound {
                order_id: order_id.to_string(),
            })?;

        if order.status.is_terminal() {
            return Err(OrderError::AlreadyTerminal {
                status: format!("{:?}", order.status).to_lowercase(),
            }
            .into());
        }

        if let Some(price) = order.limit_price {
            self.book.remove(order.side, price, &order_id);
        }

        let leftover = self.reserved.remove(&order_id).unwrap_or(Decimal::ZERO);
        ledger.release(order.account_id, reserve_asset(order), leftover)?;
        order.mark_cancelled(timestamp);

        let report = CancelReport {
            order: order.clone(),
            cancelled_quantity: order.remaining_quantity,
        };
        tracing::info!(
            order_id = %order_id,
            cancelled = %report.cancelled_quantity,
            "order cancelled"
        );
        Ok(report)
    }

    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    pub fn best_bid(&self) -> Option<(Price, Quantity)> {
        self.book.best_bid()
    }

    pub fn best_ask(&self) -> Option<(Price, Quantity)> {
        self.book.best_ask()
    }

    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        self.book.snapshot(depth)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn validate(&self, req: OrderRequest, timestamp: i64) -> Result<Order, ExchangeError> {
        if req.quantity.is_zero() {
            return Err(OrderError::InvalidQuantity("quantity must be positive".into()).into());
        }
        let limit_price = match req.order_type {
            OrderType::Limit => Some(req.price.ok_or_else(|| {
                ExchangeError::from(OrderError::InvalidPrice(
                    "limit order requires a price".into(),
                ))
            })?),
            // Client-supplied prices on market orders are ignored; the
            // match determines the price.
            OrderType::Market => None,
        };
        Ok(Order::new(
            req.account_id,
            req.symbol,
            req.side,
            req.order_type,
            limit_price,
            req.quantity,
            timestamp,
        ))
    }

    fn reservation_for(&self, order: &Order) -> Decimal {
        match (order.side, order.limit_price) {
            (Side::Buy, Some(limit)) => order.quantity.notional(limit),
            (Side::Buy, None) => {
                // Exact sweep cost under the symbol lock: the book cannot
                // change between sizing and matching.
                let (_, cost) = self.book.ask_sweep_cost(order.quantity);
                cost
            }
            (Side::Sell, _) => order.quantity.as_decimal(),
        }
    }

    /// Settle both legs of one fill and consume the taker's reservation.
    /// For limit buys filled below their limit, the improvement
    /// `(limit − maker_price) × qty` is released back to available
    /// immediately.
    fn settle_fill(
        &mut self,
        ledger: &Ledger,
        trade: &Trade,
        taker_limit: Option<Price>,
    ) -> Result<(), ExchangeError> {
        let base = trade.symbol.base();
        let quote = trade.symbol.quote();
        let qty = trade.quantity;
        let debit = qty.notional(trade.price);

        let (buyer, buyer_fee, seller, seller_fee, buyer_is_taker) = match trade.taker_side {
            Side::Buy => (
                trade.taker_account_id,
                trade.taker_fee,
                trade.maker_account_id,
                trade.maker_fee,
                true,
            ),
            Side::Sell => (
                trade.maker_account_id,
                trade.maker_fee,
                trade.taker_account_id,
                trade.taker_fee,
                false,
            ),
        };

        // Buyer pays quote out of reservation, receives base net of fee.
        ledger.settle(buyer, quote, -debit)?;
        ledger.settle(buyer, base, qty.as_decimal() - buyer_fee)?;

        // Seller delivers base out of reservation, receives quote net of fee.
        ledger.settle(seller, base, -qty.as_decimal())?;
        ledger.settle(seller, quote, debit - seller_fee)?;

        // Taker reservation consumption (maker side is handled in
        // apply_maker_fill, where the maker order is updated).
        let taker_consumed = if buyer_is_taker {
            let improvement = match taker_limit {
                Some(limit) => {
                    let imp = qty.notional(limit) - debit;
                    if imp > Decimal::ZERO {
                        ledger.release(trade.taker_account_id, quote, imp)?;
                    }
                    imp
                }
                None => Decimal::ZERO,
            };
            debit + improvement
        } else {
            qty.as_decimal()
        };
        self.consume_reserved(&trade.taker_order_id, taker_consumed);
        Ok(())
    }

    /// Update the maker's order record and reservation after a fill.
    fn apply_maker_fill(&mut self, trade: &Trade, timestamp: i64) {
        let consumed = match trade.taker_side {
            // Maker is the seller: base was delivered.
            Side::Buy => trade.quantity.as_decimal(),
            // Maker is the buyer: quote was paid at the maker's own price.
            Side::Sell => trade.quantity.notional(trade.price),
        };
        self.consume_reserved(&trade.maker_order_id, consumed);

        let maker = self
            .orders
            .get_mut(&trade.maker_order_id)
            .expect("resting maker order is tracked");
        maker.apply_fill(trade.quantity, timestamp);
        if maker.status.is_terminal() {
            self.reserved.remove(&trade.maker_order_id);
        }
    }

    fn consume_reserved(&mut self, order_id: &OrderId, amount: Decimal) {
        if let Some(entry) = self.reserved.get_mut(order_id) {
            debug_assert!(amount <= *entry, "reservation consumed beyond tracked amount");
            *entry -= amount;
        }
    }

    /// Cancel an order's remainder, releasing whatever reservation is left.
    fn release_remainder(
        &mut self,
        order: &mut Order,
        ledger: &Ledger,
        timestamp: i64,
    ) -> Result<(), ExchangeError> {
        let leftover = self
            .reserved
            .remove(&order.order_id)
            .unwrap_or(Decimal::ZERO);
        ledger.release(order.account_id, reserve_asset(order), leftover)?;
        order.mark_cancelled(timestamp);
        Ok(())
    }
}

/// The asset an order's reservation is held in.
fn reserve_asset(order: &Order) -> &str {
    match order.side {
        Side::Buy => order.symbol.quote(),
        Side::Sell => order.symbol.base(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: i64 = 1_708_123_456_789_000_000;

    fn engine() -> SymbolEngine {
        SymbolEngine::new(
            Symbol::new("BTC/USD"),
            Arc::new(AtomicU64::new(1)),
            FeeSchedule {
                maker_bps: 0,
                taker_bps: 0,
            },
        )
    }

    fn funded_ledger(accounts: &[(AccountId, &str, u64)]) -> Ledger {
        let ledger = Ledger::new();
        for (acct, asset, amount) in accounts {
            ledger.deposit(*acct, asset, Decimal::from(*amount));
        }
        ledger
    }

    fn limit_req(acct: AccountId, side: Side, price: u64, qty: &str) -> OrderRequest {
        OrderRequest {
            account_id: acct,
            symbol: Symbol::new("BTC/USD"),
            side,
            order_type: OrderType::Limit,
            price: Some(Price::from_u64(price)),
            quantity: Quantity::from_str(qty).unwrap(),
        }
    }

    fn market_req(acct: AccountId, side: Side, qty: &str) -> OrderRequest {
        OrderRequest {
            account_id: acct,
            symbol: Symbol::new("BTC/USD"),
            side,
            order_type: OrderType::Market,
            price: None,
            quantity: Quantity::from_str(qty).unwrap(),
        }
    }

    #[test]
    fn test_resting_order_reserves_funds() {
        let mut eng = engine();
        let buyer = AccountId::new();
        let ledger = funded_ledger(&[(buyer, "USD", 1_000)]);

        let report = eng
            .submit(limit_req(buyer, Side::Buy, 100, "5"), &ledger, TS)
            .unwrap();
        assert_eq!(report.order.status, OrderStatus::Open);
        assert!(report.trades.is_empty());

        let b = ledger.balance(buyer, "USD");
        assert_eq!(b.reserved, Decimal::from(500));
        assert_eq!(b.available, Decimal::from(500));
    }

    #[test]
    fn test_insufficient_balance_rejected_before_book() {
        let mut eng = engine();
        let buyer = AccountId::new();
        let ledger = funded_ledger(&[(buyer, "USD", 10)]);

        let err = eng
            .submit(limit_req(buyer, Side::Buy, 100, "5"), &ledger, TS)
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Ledger(_)));
        assert!(eng.best_bid().is_none());
    }

    #[test]
    fn test_full_match_settles_both_sides() {
        let mut eng = engine();
        let seller = AccountId::new();
        let buyer = AccountId::new();
        let ledger = funded_ledger(&[(seller, "BTC", 1), (buyer, "USD", 50_000)]);

        eng.submit(limit_req(seller, Side::Sell, 50_000, "1"), &ledger, TS)
            .unwrap();
        let report = eng
            .submit(limit_req(buyer, Side::Buy, 50_000, "1"), &ledger, TS + 1)
            .unwrap();

        assert_eq!(report.order.status, OrderStatus::Filled);
        assert_eq!(report.trades.len(), 1);
        assert_eq!(ledger.balance(buyer, "BTC").available, Decimal::ONE);
        assert_eq!(ledger.balance(seller, "USD").available, Decimal::from(50_000));
        assert_eq!(ledger.balance(buyer, "USD").total(), Decimal::ZERO);
        assert_eq!(ledger.balance(seller, "BTC").total(), Decimal::ZERO);
    }

    #[test]
    fn test_maker_price_improvement_released() {
        // Resting ask at 9,900; buy limit 0.01 @ 10,000 with exactly 100 USD.
        // Trade executes at the maker's 9,900: debit 99, release 1.
        let mut eng = engine();
        let seller = AccountId::new();
        let buyer = AccountId::new();
        let ledger = funded_ledger(&[(seller, "BTC", 1), (buyer, "USD", 100)]);

        eng.submit(limit_req(seller, Side::Sell, 9_900, "0.01"), &ledger, TS)
            .unwrap();
        let report = eng
            .submit(limit_req(buyer, Side::Buy, 10_000, "0.01"), &ledger, TS + 1)
            .unwrap();

        assert_eq!(report.trades[0].price, Price::from_u64(9_900));
        let usd = ledger.balance(buyer, "USD");
        assert_eq!(usd.available, Decimal::ONE);
        assert_eq!(usd.reserved, Decimal::ZERO);
        assert_eq!(
            ledger.balance(buyer, "BTC").available,
            Decimal::new(1, 2)
        );
    }

    #[test]
    fn test_time_priority_at_equal_price() {
        let mut eng = engine();
        let first = AccountId::new();
        let second = AccountId::new();
        let taker = AccountId::new();
        let ledger = funded_ledger(&[
            (first, "BTC", 1),
            (second, "BTC", 1),
            (taker, "USD", 100_000),
        ]);

        let r1 = eng
            .submit(limit_req(first, Side::Sell, 50_000, "1"), &ledger, TS)
            .unwrap();
        eng.submit(limit_req(second, Side::Sell, 50_000, "1"), &ledger, TS + 1)
            .unwrap();

        let report = eng
            .submit(limit_req(taker, Side::Buy, 50_000, "1"), &ledger, TS + 2)
            .unwrap();
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].maker_order_id, r1.order.order_id);
    }

    #[test]
    fn test_interleaved_insert_match_preserves_fifo() {
        let mut eng = engine();
        let a = AccountId::new();
        let b = AccountId::new();
        let taker = AccountId::new();
        let ledger =
            funded_ledger(&[(a, "BTC", 2), (b, "BTC", 2), (taker, "USD", 1_000_000)]);

        let ra = eng
            .submit(limit_req(a, Side::Sell, 100, "1"), &ledger, TS)
            .unwrap();
        // Partially consume the first order, then insert another at the
        // same price; the first must keep its queue position.
        eng.submit(market_req(taker, Side::Buy, "0.5"), &ledger, TS + 1)
            .unwrap();
        eng.submit(limit_req(b, Side::Sell, 100, "1"), &ledger, TS + 2)
            .unwrap();

        let report = eng
            .submit(market_req(taker, Side::Buy, "1.0"), &ledger, TS + 3)
            .unwrap();
        assert_eq!(report.trades.len(), 2);
        assert_eq!(report.trades[0].maker_order_id, ra.order.order_id);
        assert_eq!(
            report.trades[0].quantity,
            Quantity::from_str("0.5").unwrap()
        );
    }

    #[test]
    fn test_market_no_liquidity_cancelled_not_rested() {
        let mut eng = engine();
        let buyer = AccountId::new();
        let ledger = funded_ledger(&[(buyer, "USD", 1_000)]);

        let report = eng
            .submit(market_req(buyer, Side::Buy, "1"), &ledger, TS)
            .unwrap();
        assert_eq!(report.order.status, OrderStatus::Cancelled);
        assert!(report.trades.is_empty());
        assert!(eng.best_bid().is_none());
        // Nothing stays reserved.
        assert_eq!(ledger.balance(buyer, "USD").reserved, Decimal::ZERO);
    }

    #[test]
    fn test_market_partial_fill_remainder_cancelled() {
        let mut eng = engine();
        let seller = AccountId::new();
        let buyer = AccountId::new();
        let ledger = funded_ledger(&[(seller, "BTC", 1), (buyer, "USD", 100_000)]);

        eng.submit(limit_req(seller, Side::Sell, 50_000, "0.4"), &ledger, TS)
            .unwrap();
        let report = eng
            .submit(market_req(buyer, Side::Buy, "1"), &ledger, TS + 1)
            .unwrap();

        assert_eq!(report.order.status, OrderStatus::Cancelled);
        assert_eq!(
            report.order.filled_quantity,
            Quantity::from_str("0.4").unwrap()
        );
        let usd = ledger.balance(buyer, "USD");
        assert_eq!(usd.reserved, Decimal::ZERO);
        assert_eq!(usd.available, Decimal::from(80_000));
    }

    #[test]
    fn test_market_sell_remainder_releases_base() {
        let mut eng = engine();
        let seller = AccountId::new();
        let buyer = AccountId::new();
        let ledger = funded_ledger(&[(seller, "BTC", 2), (buyer, "USD", 50_000)]);

        eng.submit(limit_req(buyer, Side::Buy, 50_000, "1"), &ledger, TS)
            .unwrap();
        let report = eng
            .submit(market_req(seller, Side::Sell, "2"), &ledger, TS + 1)
            .unwrap();

        assert_eq!(report.order.status, OrderStatus::Cancelled);
        let btc = ledger.balance(seller, "BTC");
        assert_eq!(btc.reserved, Decimal::ZERO);
        assert_eq!(btc.available, Decimal::ONE);
        assert_eq!(ledger.balance(seller, "USD").available, Decimal::from(50_000));
    }

    #[test]
    fn test_self_trade_cancels_taker_remainder() {
        let mut eng = engine();
        let acct = AccountId::new();
        let ledger = funded_ledger(&[(acct, "BTC", 1), (acct, "USD", 50_000)]);

        eng.submit(limit_req(acct, Side::Sell, 50_000, "1"), &ledger, TS)
            .unwrap();
        let report = eng
            .submit(limit_req(acct, Side::Buy, 50_000, "1"), &ledger, TS + 1)
            .unwrap();

        assert_eq!(report.order.status, OrderStatus::Cancelled);
        assert!(report.trades.is_empty());
        // The resting sell is untouched; the buy reservation is released.
        assert_eq!(eng.best_ask().unwrap().0, Price::from_u64(50_000));
        assert_eq!(ledger.balance(acct, "USD").reserved, Decimal::ZERO);
    }

    #[test]
    fn test_cancel_releases_reservation() {
        let mut eng = engine();
        let buyer = AccountId::new();
        let ledger = funded_ledger(&[(buyer, "USD", 1_000)]);

        let report = eng
            .submit(limit_req(buyer, Side::Buy, 100, "5"), &ledger, TS)
            .unwrap();
        let cancel = eng
            .cancel(report.order.order_id, &ledger, TS + 1)
            .unwrap();

        assert_eq!(cancel.cancelled_quantity, Quantity::from_str("5").unwrap());
        let b = ledger.balance(buyer, "USD");
        assert_eq!(b.available, Decimal::from(1_000));
        assert_eq!(b.reserved, Decimal::ZERO);
    }

    #[test]
    fn test_cancel_after_partial_fill_reports_actual_remaining() {
        let mut eng = engine();
        let seller = AccountId::new();
        let buyer = AccountId::new();
        let ledger = funded_ledger(&[(seller, "BTC", 1), (buyer, "USD", 100_000)]);

        let rest = eng
            .submit(limit_req(seller, Side::Sell, 50_000, "1"), &ledger, TS)
            .unwrap();
        eng.submit(limit_req(buyer, Side::Buy, 50_000, "0.3"), &ledger, TS + 1)
            .unwrap();

        let cancel = eng.cancel(rest.order.order_id, &ledger, TS + 2).unwrap();
        assert_eq!(
            cancel.cancelled_quantity,
            Quantity::from_str("0.7").unwrap()
        );
        let btc = ledger.balance(seller, "BTC");
        assert_eq!(btc.reserved, Decimal::ZERO);
        assert_eq!(btc.available, Decimal::from_str_exact("0.7").unwrap());
    }

    #[test]
    fn test_cancel_filled_order_is_already_terminal() {
        let mut eng = engine();
        let seller = AccountId::new();
        let buyer = AccountId::new();
        let ledger = funded_ledger(&[(seller, "BTC", 1), (buyer, "USD", 50_000)]);

        let rest = eng
            .submit(limit_req(seller, Side::Sell, 50_000, "1"), &ledger, TS)
            .unwrap();
        eng.submit(limit_req(buyer, Side::Buy, 50_000, "1"), &ledger, TS + 1)
            .unwrap();

        let err = eng.cancel(rest.order.order_id, &ledger, TS + 2).unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::Order(OrderError::AlreadyTerminal { .. })
        ));
    }

    #[test]
    fn test_cancel_unknown_order_not_found() {
        let mut eng = engine();
        let ledger = Ledger::new();
        let err = eng.cancel(OrderId::new(), &ledger, TS).unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::Order(OrderError::NotFound { .. })
        ));
    }

    #[test]
    fn test_fill_quantities_balance_per_trade() {
        let mut eng = engine();
        let seller = AccountId::new();
        let buyer = AccountId::new();
        let ledger = funded_ledger(&[(seller, "BTC", 5), (buyer, "USD", 500_000)]);

        for i in 0..3 {
            eng.submit(limit_req(seller, Side::Sell, 50_000 + i, "1"), &ledger, TS)
                .unwrap();
        }
        let report = eng
            .submit(limit_req(buyer, Side::Buy, 50_002, "2.5"), &ledger, TS + 1)
            .unwrap();

        let taker_filled: Decimal = report
            .trades
            .iter()
            .map(|t| t.quantity.as_decimal())
            .sum();
        assert_eq!(taker_filled, report.order.filled_quantity.as_decimal());
        // Base gained by buyer equals base delivered by seller.
        assert_eq!(
            ledger.balance(buyer, "BTC").available,
            Decimal::from(5) - ledger.balance(seller, "BTC").total()
        );
    }

    #[test]
    fn test_limit_without_price_rejected() {
        let mut eng = engine();
        let ledger = Ledger::new();
        let mut req = limit_req(AccountId::new(), Side::Buy, 100, "1");
        req.price = None;
        let err = eng.submit(req, &ledger, TS).unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::Order(OrderError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut eng = engine();
        let ledger = Ledger::new();
        let req = OrderRequest {
            account_id: AccountId::new(),
            symbol: Symbol::new("BTC/USD"),
            side: Side::Buy,
            order_type: OrderType::Limit,
            price: Some(Price::from_u64(100)),
            quantity: Quantity::zero(),
        };
        let err = eng.submit(req, &ledger, TS).unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::Order(OrderError::InvalidQuantity(_))
        ));
    }

    use proptest::prelude::*;

    fn order_strategy() -> impl Strategy<Value = (usize, Side, OrderType, u64, u32)> {
        (
            0usize..3,
            prop_oneof![Just(Side::Buy), Just(Side::Sell)],
            prop_oneof![Just(OrderType::Limit), Just(OrderType::Market)],
            1u64..200,
            1u32..5,
        )
    }

    proptest! {
        /// Conservation over arbitrary order streams: with zero fees, every
        /// unit deposited is still held by some account after any mix of
        /// limit/market submissions, no balance goes negative, and every
        /// fill honors the taker's limit.
        #[test]
        fn prop_order_stream_conserves_funds(
            ops in proptest::collection::vec(order_strategy(), 1..48)
        ) {
            let mut eng = engine();
            let accounts = [AccountId::new(), AccountId::new(), AccountId::new()];
            let ledger = Ledger::new();
            for acct in &accounts {
                ledger.deposit(*acct, "USD", Decimal::from(1_000_000));
                ledger.deposit(*acct, "BTC", Decimal::from(100));
            }

            let mut ts = TS;
            for (idx, side, order_type, price, qty) in ops {
                ts += 1;
                let req = OrderRequest {
                    account_id: accounts[idx],
                    symbol: Symbol::new("BTC/USD"),
                    side,
                    order_type,
                    price: match order_type {
                        OrderType::Limit => Some(Price::from_u64(price)),
                        OrderType::Market => None,
                    },
                    quantity: Quantity::try_new(Decimal::from(qty)).unwrap(),
                };
                // Rejections (insufficient balance) must change nothing.
                if let Ok(report) = eng.submit(req, &ledger, ts) {
                    for trade in &report.trades {
                        match (side, report.order.limit_price) {
                            (Side::Buy, Some(limit)) => prop_assert!(trade.price <= limit),
                            (Side::Sell, Some(limit)) => prop_assert!(trade.price >= limit),
                            _ => {}
                        }
                    }
                }
                for acct in &accounts {
                    prop_assert!(ledger.balance(*acct, "USD").check_invariant());
                    prop_assert!(ledger.balance(*acct, "BTC").check_invariant());
                }
            }

            let usd: Decimal = accounts
                .iter()
                .map(|a| ledger.balance(*a, "USD").total())
                .sum();
            let btc: Decimal = accounts
                .iter()
                .map(|a| ledger.balance(*a, "BTC").total())
                .sum();
            prop_assert_eq!(usd, Decimal::from(3_000_000));
            prop_assert_eq!(btc, Decimal::from(300));
        }
    }
}
