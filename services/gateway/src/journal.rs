//! Durable trade journal backing the exchange
//!
//! Bridges the engine's journal seam onto the append-only on-disk journal,
//! so every acknowledged fill is framed, checksummed, and flushed per the
//! configured policies before the submission returns.

use matching_engine::{JournalFault, TradeJournal};
use persistence::{JournalConfig, JournalWriter};
use types::trade::Trade;

pub struct DurableJournal {
    writer: JournalWriter,
}

impl DurableJournal {
    /// Open (or resume) the on-disk journal. `next_sequence` comes from
    /// recovery: one past the highest sequence already on disk.
    pub fn open(config: JournalConfig, next_sequence: u64) -> anyhow::Result<Self> {
        let mut writer = JournalWriter::open(config)?;
        writer.set_next_sequence(next_sequence);
        Ok(Self { writer })
    }
}

impl TradeJournal for DurableJournal {
    fn record_trade(&mut self, trade: &Trade) -> Result<(), JournalFault> {
        self.writer
            .append_trade(trade)
            .map_err(|e| JournalFault(e.to_string()))
    }
}
