//! Order lifecycle types
//!
//! An order moves `Open → PartiallyFilled → Filled` or is cancelled from
//! either non-terminal state. Market orders never rest: any unmatched
//! remainder is cancelled by the engine.

use crate::ids::{AccountId, OrderId, Symbol};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Order side. Wire values match the front-end contract (`buy`/`sell`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order type. Wire values match the front-end contract (`market`/`limit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Execute immediately against resting liquidity; remainder is cancelled.
    Market,
    /// Execute while prices cross; remainder rests in the book.
    Limit,
}

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted, nothing filled yet.
    Open,
    /// Some quantity filled, remainder active.
    PartiallyFilled,
    /// Fully filled (terminal).
    Filled,
    /// Cancelled with remaining quantity released (terminal).
    Cancelled,
}

impl OrderStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// A client order as tracked by the matching engine.
///
/// Invariant: `filled_quantity + remaining_quantity == quantity`, and
/// `filled_quantity` never exceeds `quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub account_id: AccountId,
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    /// Present on limit orders only. A market order's execution price is
    /// determined at match time, never supplied by the client.
    pub limit_price: Option<Price>,
    pub quantity: Quantity,
    pub filled_quantity: Quantity,
    pub remaining_quantity: Quantity,
    pub status: OrderStatus,
    pub created_at: i64, // Unix nanos
    pub updated_at: i64, // Unix nanos
}

impl Order {
    pub fn new(
        account_id: AccountId,
        symbol: Symbol,
        side: Side,
        order_type: OrderType,
        limit_price: Option<Price>,
        quantity: Quantity,
        timestamp: i64,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            account_id,
            symbol,
            side,
            order_type,
            limit_price,
            quantity,
            filled_quantity: Quantity::zero(),
            remaining_quantity: quantity,
            status: OrderStatus::Open,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Check the quantity invariant: filled + remaining = total.
    pub fn check_invariant(&self) -> bool {
        self.filled_quantity + self.remaining_quantity == self.quantity
    }

    pub fn is_filled(&self) -> bool {
        self.filled_quantity == self.quantity
    }

    pub fn has_fills(&self) -> bool {
        !self.filled_quantity.is_zero()
    }

    /// Apply a fill, advancing the status.
    ///
    /// # Panics
    /// Panics if the fill would exceed the remaining quantity or leave the
    /// order violating its invariant.
    pub fn apply_fill(&mut self, fill_quantity: Quantity, timestamp: i64) {
        assert!(
            fill_quantity <= self.remaining_quantity,
            "fill exceeds remaining quantity"
        );

        self.filled_quantity = self.filled_quantity + fill_quantity;
        self.remaining_quantity = self.remaining_quantity - fill_quantity;

        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.updated_at = timestamp;

        assert!(self.check_invariant(), "invariant violated after fill");
    }

    /// Mark the order cancelled. The remaining quantity stays recorded so a
    /// cancel racing a fill reports what was actually cancelled.
    ///
    /// # Panics
    /// Panics if the order is already terminal; callers must check first and
    /// surface `AlreadyTerminal` to the client.
    pub fn mark_cancelled(&mut self, timestamp: i64) {
        assert!(!self.status.is_terminal(), "cannot cancel terminal order");
        self.status = OrderStatus::Cancelled;
        self.updated_at = timestamp;
    }
}
