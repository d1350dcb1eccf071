//! Boot recovery from the trade journal
//!
//! On startup the journal is replayed front to back: every `TradeExecuted`
//! entry is decoded, sequences are checked for gaps, and the highest
//! sequence seen seeds the engine's trade counter so it resumes gapless.
//! A corrupt tail (the normal crash signature) is cut off and logged; a
//! corrupt entry in the middle of the journal aborts recovery.

use crate::journal::{JournalError, EVENT_TRADE_EXECUTED};
use crate::reader::{CorruptionRecord, JournalReader, ReaderError};
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;
use types::trade::Trade;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("Reader error: {0}")]
    Reader(#[from] ReaderError),

    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("Sequence gap during replay: expected {expected}, got {got}")]
    SequenceGap { expected: u64, got: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ── Outcome ─────────────────────────────────────────────────────────

/// Result of a journal replay.
#[derive(Debug)]
pub struct RecoveredState {
    /// Every trade recovered, in sequence order.
    pub trades: Vec<Trade>,
    /// The sequence the engine should assign to its next trade.
    pub next_sequence: u64,
    /// Corruption found (and skipped) in the journal tail.
    pub corruption: Vec<CorruptionRecord>,
}

/// Timing and counts for the recovery pass.
#[derive(Debug, Clone)]
pub struct RecoveryMetrics {
    pub replay_count: u64,
    pub replay_time_ms: u64,
    pub final_sequence: u64,
}

// ── Recovery ────────────────────────────────────────────────────────

pub struct RecoveryEngine {
    journal_dir: PathBuf,
}

impl RecoveryEngine {
    pub fn new(journal_dir: impl Into<PathBuf>) -> Self {
        Self {
            journal_dir: journal_dir.into(),
        }
    }

    /// Replay the journal, returning the recovered trades and the next
    /// trade sequence. An empty or missing journal recovers to a cold
    /// start with `next_sequence = 1`.
    pub fn recover(&self) -> Result<(RecoveredState, RecoveryMetrics), RecoveryError> {
        let start = Instant::now();
        let mut reader = JournalReader::open(&self.journal_dir)?;

        // Tail corruption is tolerated; everything before it must be whole.
        let (entries, corruption) = reader.recover_entries();

        let mut trades = Vec::with_capacity(entries.len());
        let mut last_seq: Option<u64> = None;

        for entry in &entries {
            if let Some(prev) = last_seq {
                if entry.sequence != prev + 1 {
                    return Err(RecoveryError::SequenceGap {
                        expected: prev + 1,
                        got: entry.sequence,
                    });
                }
            }
            last_seq = Some(entry.sequence);

            if entry.event_type == EVENT_TRADE_EXECUTED {
                trades.push(entry.decode_trade()?);
            }
        }

        let next_sequence = last_seq.map(|s| s + 1).unwrap_or(1);
        let metrics = RecoveryMetrics {
            replay_count: entries.len() as u64,
            replay_time_ms: start.elapsed().as_millis() as u64,
            final_sequence: last_seq.unwrap_or(0),
        };

        tracing::info!(
            trades = trades.len(),
            next_sequence,
            corrupt_regions = corruption.len(),
            elapsed_ms = metrics.replay_time_ms,
            "journal recovery complete"
        );

        Ok((
            RecoveredState {
                trades,
                next_sequence,
                corruption,
            },
            metrics,
        ))
    }
}

// ── Tests ───────────────────────────────────────────────────────────
