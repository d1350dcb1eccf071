//! Journal seam for executed trades
//!
//! The exchange coordinator journals every trade before acknowledging the
//! submission to the caller, so a crash between match and ack cannot
//! silently lose a fill. The sink is a trait so the engine stays free of
//! storage dependencies; the gateway wires in the persistence journal.

use thiserror::Error;
use types::trade::Trade;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("trade journal failure: {0}")]
pub struct JournalFault(pub String);

/// Durable sink for executed trades.
pub trait TradeJournal: Send {
    /// Persist one trade. Must not return until the trade is durable
    /// according to the sink's flush policy.
    fn record_trade(&mut self, trade: &Trade) -> Result<(), JournalFault>;
}

/// Discards trades; for tests and simulations that do not need durability.
#[derive(Debug, Default)]
pub struct NoopJournal;

impl TradeJournal for NoopJournal {
    fn record_trade(&mut self, _trade: &Trade) -> Result<(), JournalFault> {
        Ok(())
    }
}

/// Collects trades in memory; used by tests asserting journal-before-ack.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    pub trades: Vec<Trade>,
}

impl TradeJournal for MemoryJournal {
    fn record_trade(&mut self, trade: &Trade) -> Result<(), JournalFault> {
        self.trades.push(trade.clone());
        Ok(())
    }
}
