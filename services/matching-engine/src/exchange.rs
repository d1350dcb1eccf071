//! Multi-symbol exchange coordinator
//!
//! One [`SymbolEngine`] per configured market, each behind its own mutex so
//! symbols match in parallel while each book has exactly one writer. The
//! shared ledger serializes per (account, asset) independently, which lets
//! one account trade on many symbols concurrently without a global lock.
//!
//! Executed trades are journaled after the symbol lock is released and
//! before the submission is acknowledged, so a crash cannot ack a fill the
//! journal never saw.

use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use ledger::Ledger;
use types::errors::{ExchangeError, OrderError};
use types::ids::{OrderId, Symbol};
use types::order::Order;

use crate::book::BookSnapshot;
use crate::engine::{CancelReport, ExecutionReport, OrderRequest, SymbolEngine};
use crate::events::TradeJournal;
use crate::matching::FeeSchedule;

pub struct Exchange {
    ledger: Arc<Ledger>,
    engines: DashMap<Symbol, Mutex<SymbolEngine>>,
    /// Routes cancels and lookups to the owning symbol engine.
    order_index: DashMap<OrderId, Symbol>,
    journal: Mutex<Box<dyn TradeJournal>>,
}

impl Exchange {
    /// Create an exchange for a fixed set of markets. Submissions for any
    /// other symbol are rejected with `UnknownSymbol`.
    ///
    /// `first_sequence` seeds the global trade sequence; recovery passes
    /// one past the highest sequence found in the journal.
    pub fn new(
        ledger: Arc<Ledger>,
        symbols: impl IntoIterator<Item = Symbol>,
        journal: Box<dyn TradeJournal>,
        fees: FeeSchedule,
        first_sequence: u64,
    ) -> Self {
        let sequence = Arc::new(AtomicU64::new(first_sequence));
        let engines = DashMap::new();
        for symbol in symbols {
            engines.insert(
                symbol.clone(),
                Mutex::new(SymbolEngine::new(symbol, Arc::clone(&sequence), fees)),
            );
        }
        Self {
            ledger,
            engines,
            order_index: DashMap::new(),
            journal: Mutex::new(journal),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        let mut out: Vec<Symbol> = self.engines.iter().map(|e| e.key().clone()).collect();
        out.sort();
        out
    }

    /// Submit an order to its symbol's engine.
    ///
    /// The symbol lock covers reservation, matching, and settlement; the
    /// journal write happens after it is dropped so slow storage never
    /// stalls other traders on the same symbol.
    pub fn submit_order(&self, req: OrderRequest) -> Result<ExecutionReport, ExchangeError> {
        let symbol = req.symbol.clone();
        let engine = self
            .engines
            .get(&symbol)
            .ok_or_else(|| OrderError::UnknownSymbol(symbol.to_string()))?;

        let report = {
            let mut guard = lock(engine.value());
            guard.submit(req, &self.ledger, now_nanos())?
        };

        self.order_index.insert(report.order.order_id, symbol);
        self.journal_trades(&report)?;
        Ok(report)
    }

    /// Cancel an order wherever it lives.
    pub fn cancel_order(&self, order_id: OrderId) -> Result<CancelReport, ExchangeError> {
        let symbol = self
            .order_index
            .get(&order_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| OrderError::NotFound {
                order_id: order_id.to_string(),
            })?;
        let engine = self
            .engines
            .get(&symbol)
            .ok_or_else(|| OrderError::UnknownSymbol(symbol.to_string()))?;

        let mut guard = lock(engine.value());
        guard.cancel(order_id, &self.ledger, now_nanos())
    }

    /// Current state of an order.
    pub fn order(&self, order_id: OrderId) -> Option<Order> {
        let symbol = self.order_index.get(&order_id)?.value().clone();
        let engine = self.engines.get(&symbol)?;
        let guard = lock(engine.value());
        guard.order(&order_id).cloned()
    }

    /// Depth snapshot of one market.
    pub fn book_snapshot(
        &self,
        symbol: &Symbol,
        depth: usize,
    ) -> Result<BookSnapshot, ExchangeError> {
        let engine = self
            .engines
            .get(symbol)
            .ok_or_else(|| OrderError::UnknownSymbol(symbol.to_string()))?;
        let guard = lock(engine.value());
        Ok(guard.snapshot(depth))
    }

    fn journal_trades(&self, report: &ExecutionReport) -> Result<(), ExchangeError> {
        if report.trades.is_empty() {
            return Ok(());
        }
        let mut journal = lock(&self.journal);
        for trade in &report.trades {
            journal
                .record_trade(trade)
                .map_err(|e| ExchangeError::Journal(e.to_string()))?;
        }
        Ok(())
    }
}

/// A poisoned engine mutex means a panic mid-match on another thread; the
/// engine state is still internally consistent up to the last completed
/// fill, so recover the guard rather than propagating the poison.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Wall-clock timestamp in Unix nanoseconds.
pub fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0)
}
