//! One side of an order book
//!
//! Price levels live in a BTreeMap for deterministic iteration; the "best"
//! end depends on the side: highest price for bids, lowest for asks.

use std::collections::BTreeMap;
use types::ids::{AccountId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::Side;

use super::price_level::PriceLevel;

#[derive(Debug)]
pub struct BookSide {
    side: Side,
    levels: BTreeMap<Price, PriceLevel>,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    pub fn insert(
        &mut self,
        price: Price,
        order_id: OrderId,
        account_id: AccountId,
        remaining: Quantity,
    ) {
        self.levels
            .entry(price)
            .or_insert_with(PriceLevel::new)
            .push_back(order_id, account_id, remaining);
    }

    /// Remove an order at a known price. Empty levels are dropped so the
    /// best-price lookups stay O(log n) over live levels only.
    pub fn remove(&mut self, price: Price, order_id: &OrderId) -> Option<Quantity> {
        let level = self.levels.get_mut(&price)?;
        let removed = level.remove(order_id)?;
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Some(removed)
    }

    /// Best price and total quantity at it.
    pub fn best(&self) -> Option<(Price, Quantity)> {
        self.best_entry()
            .map(|(price, level)| (*price, level.total_quantity()))
    }

    /// Mutable access to the best level, for the matching loop.
    pub fn best_level_mut(&mut self) -> Option<(Price, &mut PriceLevel)> {
        match self.side {
            Side::Buy => self
                .levels
                .iter_mut()
                .next_back()
                .map(|(p, l)| (*p, l)),
            Side::Sell => self.levels.iter_mut().next().map(|(p, l)| (*p, l)),
        }
    }

    /// Drop the best level if a fill has emptied it.
    pub fn prune_best(&mut self) {
        let price = match self.best_entry() {
            Some((p, level)) if level.is_empty() => *p,
            _ => return,
        };
        self.levels.remove(&price);
    }

    /// Iterate levels from best to worst as (price, total quantity).
    pub fn iter_levels(&self) -> Box<dyn Iterator<Item = (Price, Quantity)> + '_> {
        let mapped = |(p, l): (&Price, &PriceLevel)| (*p, l.total_quantity());
        match self.side {
            Side::Buy => Box::new(self.levels.iter().rev().map(mapped)),
            Side::Sell => Box::new(self.levels.iter().map(mapped)),
        }
    }

    /// Top `depth` levels, best first.
    pub fn depth(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.iter_levels().take(depth).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    fn best_entry(&self) -> Option<(&Price, &PriceLevel)> {
        match self.side {
            Side::Buy => self.levels.iter().next_back(),
            Side::Sell => self.levels.iter().next(),
        }
    }
}
