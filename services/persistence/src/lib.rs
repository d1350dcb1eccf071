//! Trade journal persistence
//!
//! Append-only journal writing with CRC32C checksums and rotation,
//! sequential reading with corruption detection, and boot recovery that
//! replays the trade log to restore the engine's sequence counter.

pub mod journal;
pub mod reader;
pub mod recovery;

pub use journal::{
    FlushPolicy, FsyncPolicy, JournalConfig, JournalEntry, JournalError, JournalWriter,
    EVENT_TRADE_EXECUTED,
};
pub use reader::{CorruptionKind, CorruptionRecord, JournalReader, ReaderError};
pub use recovery::{RecoveredState, RecoveryEngine, RecoveryError, RecoveryMetrics};
