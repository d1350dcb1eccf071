//! FIFO queue of resting orders at one price
//!
//! Time priority is the fairness contract of the exchange: within a price
//! level the order inserted first is always matched first, so the queue is
//! strictly append-at-back, consume-at-front.

use std::collections::VecDeque;
use types::ids::{AccountId, OrderId};
use types::numeric::Quantity;

/// One resting order's footprint in the book.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestingOrder {
    pub order_id: OrderId,
    pub account_id: AccountId,
    pub remaining: Quantity,
}

/// All orders resting at one price, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    queue: VecDeque<RestingOrder>,
    total: Quantity,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            total: Quantity::zero(),
        }
    }

    /// Append at the back of the queue (lowest time priority).
    pub fn push_back(&mut self, order_id: OrderId, account_id: AccountId, remaining: Quantity) {
        self.queue.push_back(RestingOrder {
            order_id,
            account_id,
            remaining,
        });
        self.total = self.total + remaining;
    }

    /// The order with the highest time priority.
    pub fn front(&self) -> Option<RestingOrder> {
        self.queue.front().copied()
    }

    /// Reduce the front order after a fill; drops it once fully consumed.
    pub fn consume_front(&mut self, fill: Quantity) {
        let front = self
            .queue
            .front_mut()
            .expect("consume_front on empty level");
        debug_assert!(fill <= front.remaining);
        front.remaining = front.remaining - fill;
        self.total = self.total.saturating_sub(fill);
        if front.remaining.is_zero() {
            self.queue.pop_front();
        }
    }

    /// Remove an order anywhere in the queue. Returns its remaining quantity.
    pub fn remove(&mut self, order_id: &OrderId) -> Option<Quantity> {
        let idx = self.queue.iter().position(|o| &o.order_id == order_id)?;
        let removed = self.queue.remove(idx)?;
        self.total = self.total.saturating_sub(removed.remaining);
        Some(removed.remaining)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn total_quantity(&self) -> Quantity {
        self.total
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
