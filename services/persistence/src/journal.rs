//! Append-only trade journal with checksums
//!
//! Every executed trade is written as one framed entry before the submission
//! is acknowledged, so the journal is the authoritative record of what
//! traded. Entries carry the trade's global sequence number and a CRC32C
//! checksum; the writer enforces gapless sequences and rotates files at a
//! size threshold.
//!
//! # Binary format (per entry)
//! ```text
//! [total_len: u32]
//! [sequence:  u64]
//! [timestamp: i64]
//! [event_type_len: u16][event_type: bytes]
//! [payload_len: u32][payload: bytes]
//! [checksum: u32]  // CRC32C over sequence+timestamp+event_type+payload
//! ```

use crc32c::crc32c;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use types::trade::Trade;

/// Event type tag for an executed trade.
pub const EVENT_TRADE_EXECUTED: &str = "TradeExecuted";

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Sequence error: expected {expected}, got {got}")]
    SequenceError { expected: u64, got: u64 },
}

// ── Journal entry ───────────────────────────────────────────────────

/// One persisted event: a sequence number, exchange timestamp, event type
/// tag, opaque payload, and a CRC32C checksum over all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub sequence: u64,
    /// Unix nanosecond timestamp of the event.
    pub timestamp: i64,
    pub event_type: String,
    /// Bincode-serialized event payload.
    pub payload: Vec<u8>,
    pub checksum: u32,
}

impl JournalEntry {
    /// Create an entry, computing the checksum.
    pub fn new(sequence: u64, timestamp: i64, event_type: String, payload: Vec<u8>) -> Self {
        let checksum = Self::compute_checksum(sequence, timestamp, &event_type, &payload);
        Self {
            sequence,
            timestamp,
            event_type,
            payload,
            checksum,
        }
    }

    /// Frame an executed trade as a journal entry.
    pub fn for_trade(trade: &Trade) -> Result<Self, JournalError> {
        let payload =
            bincode::serialize(trade).map_err(|e| JournalError::Serialization(e.to_string()))?;
        Ok(Self::new(
            trade.sequence,
            trade.executed_at,
            EVENT_TRADE_EXECUTED.to_string(),
            payload,
        ))
    }

    /// Decode a `TradeExecuted` payload back into a trade.
    pub fn decode_trade(&self) -> Result<Trade, JournalError> {
        if self.event_type != EVENT_TRADE_EXECUTED {
            return Err(JournalError::Serialization(format!(
                "not a trade entry: {}",
                self.event_type
            )));
        }
        bincode::deserialize(&self.payload)
            .map_err(|e| JournalError::Serialization(e.to_string()))
    }

    pub fn compute_checksum(
        sequence: u64,
        timestamp: i64,
        event_type: &str,
        payload: &[u8],
    ) -> u32 {
        let mut buf = Vec::with_capacity(8 + 8 + event_type.len() + payload.len());
        buf.extend_from_slice(&sequence.to_le_bytes());
        buf.extend_from_slice(&timestamp.to_le_bytes());
        buf.extend_from_slice(event_type.as_bytes());
        buf.extend_from_slice(payload);
        crc32c(&buf)
    }

    pub fn verify_checksum(&self) -> bool {
        let expected =
            Self::compute_checksum(self.sequence, self.timestamp, &self.event_type, &self.payload);
        self.checksum == expected
    }

    /// Serialize to the binary wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let event_type_bytes = self.event_type.as_bytes();
        let event_type_len = event_type_bytes.len() as u16;
        let payload_len = self.payload.len() as u32;

        // body = 8 (seq) + 8 (ts) + 2 (et_len) + et + 4 (pl_len) + pl + 4 (crc)
        let body_len: u32 = 8 + 8 + 2 + (event_type_len as u32) + 4 + payload_len + 4;

        let mut buf = Vec::with_capacity(4 + body_len as usize);
        buf.extend_from_slice(&body_len.to_le_bytes());
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&event_type_len.to_le_bytes());
        buf.extend_from_slice(event_type_bytes);
        buf.extend_from_slice(&payload_len.to_le_bytes());
        buf.extend_from_slice(&self.payload);
        buf.extend_from_slice(&self.checksum.to_le_bytes());
        buf
    }

    /// Deserialize from the binary wire format.
    ///
    /// Returns `(entry, bytes_consumed)`. Corrupt or truncated input comes
    /// back as an error, never a panic.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), JournalError> {
        if data.len() < 4 {
            return Err(JournalError::Serialization(
                "not enough data for length prefix".into(),
            ));
        }

        let body_len = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        // An implausibly large frame means the prefix itself is corrupt.
        if body_len > 100_000_000 {
            return Err(JournalError::Serialization(format!(
                "implausible body length: {}",
                body_len
            )));
        }

        let total = 4 + body_len;
        if data.len() < total {
            return Err(JournalError::Serialization(format!(
                "incomplete entry: need {} bytes, have {}",
                total,
                data.len()
            )));
        }

        // Minimum body: 8 + 8 + 2 + 0 + 4 + 0 + 4 = 26
        if body_len < 26 {
            return Err(JournalError::Serialization(format!(
                "body too small: {} bytes",
                body_len
            )));
        }

        let body = &data[4..total];
        let mut pos: usize = 0;

        let sequence = u64::from_le_bytes(body[pos..pos + 8].try_into().unwrap());
        pos += 8;

        let timestamp = i64::from_le_bytes(body[pos..pos + 8].try_into().unwrap());
        pos += 8;

        let event_type_len = u16::from_le_bytes(body[pos..pos + 2].try_into().unwrap()) as usize;
        pos += 2;

        if pos + event_type_len > body.len() {
            return Err(JournalError::Serialization(format!(
                "event_type_len {} exceeds remaining body",
                event_type_len
            )));
        }
        let event_type = String::from_utf8(body[pos..pos + event_type_len].to_vec())
            .map_err(|e| JournalError::Serialization(e.to_string()))?;
        pos += event_type_len;

        if pos + 4 > body.len() {
            return Err(JournalError::Serialization(
                "not enough data for payload length".into(),
            ));
        }
        let payload_len = u32::from_le_bytes(body[pos..pos + 4].try_into().unwrap()) as usize;
        pos += 4;

        if pos + payload_len > body.len() {
            return Err(JournalError::Serialization(format!(
                "payload_len {} exceeds remaining body",
                payload_len
            )));
        }
        let payload = body[pos..pos + payload_len].to_vec();
        pos += payload_len;

        if pos + 4 > body.len() {
            return Err(JournalError::Serialization(
                "not enough data for checksum".into(),
            ));
        }
        let checksum = u32::from_le_bytes(body[pos..pos + 4].try_into().unwrap());

        Ok((
            Self {
                sequence,
                timestamp,
                event_type,
                payload,
                checksum,
            },
            total,
        ))
    }
}

// ── Flush / fsync policies ──────────────────────────────────────────

/// When buffered data is flushed to the OS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlushPolicy {
    EveryWrite,
    EveryN(usize),
}

/// When `fsync` is called.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FsyncPolicy {
    EveryWrite,
    EveryN(usize),
    OnRotation,
}

// ── Writer configuration ────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct JournalConfig {
    /// Directory for journal files.
    pub dir: PathBuf,
    /// Maximum file size in bytes before rotation.
    pub max_file_size: u64,
    pub flush_policy: FlushPolicy,
    pub fsync_policy: FsyncPolicy,
}

impl JournalConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_file_size: 64 * 1024 * 1024,
            flush_policy: FlushPolicy::EveryWrite,
            fsync_policy: FsyncPolicy::EveryWrite,
        }
    }
}

// ── Writer ──────────────────────────────────────────────────────────

/// Append-only journal writer with checksums, rotation, and fsync control.
pub struct JournalWriter {
    config: JournalConfig,
    writer: BufWriter<File>,
    current_file: PathBuf,
    current_file_size: u64,
    next_sequence: u64,
    writes_since_flush: usize,
    writes_since_fsync: usize,
    file_index: u64,
}

impl JournalWriter {
    /// Open a writer, creating the directory if needed and appending to the
    /// latest existing journal file.
    pub fn open(config: JournalConfig) -> Result<Self, JournalError> {
        fs::create_dir_all(&config.dir)?;

        let file_index = Self::find_latest_index(&config.dir);
        let current_file = Self::journal_path(&config.dir, file_index);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&current_file)?;
        let current_file_size = file.metadata()?.len();

        Ok(Self {
            config,
            writer: BufWriter::new(file),
            current_file,
            current_file_size,
            next_sequence: 0, // set via set_next_sequence after recovery
            writes_since_flush: 0,
            writes_since_fsync: 0,
            file_index,
        })
    }

    /// Set the next expected sequence number (after recovery).
    pub fn set_next_sequence(&mut self, seq: u64) {
        self.next_sequence = seq;
    }

    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn current_file_path(&self) -> &Path {
        &self.current_file
    }

    /// Append one entry, enforcing sequence monotonicity.
    pub fn append(&mut self, entry: &JournalEntry) -> Result<(), JournalError> {
        if self.next_sequence > 0 && entry.sequence != self.next_sequence {
            return Err(JournalError::SequenceError {
                expected: self.next_sequence,
                got: entry.sequence,
            });
        }

        if self.current_file_size >= self.config.max_file_size {
            self.rotate()?;
        }

        let bytes = entry.to_bytes();
        self.writer.write_all(&bytes)?;

        self.current_file_size += bytes.len() as u64;
        self.next_sequence = entry.sequence + 1;
        self.writes_since_flush += 1;
        self.writes_since_fsync += 1;

        self.apply_flush_policy()?;
        self.apply_fsync_policy()?;
        Ok(())
    }

    /// Frame and append an executed trade.
    pub fn append_trade(&mut self, trade: &Trade) -> Result<(), JournalError> {
        let entry = JournalEntry::for_trade(trade)?;
        self.append(&entry)
    }

    /// Force flush + fsync (shutdown, rotation).
    pub fn sync(&mut self) -> Result<(), JournalError> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        self.writes_since_flush = 0;
        self.writes_since_fsync = 0;
        Ok(())
    }

    // ── Internal ────────────────────────────────────────────────────

    fn apply_flush_policy(&mut self) -> Result<(), JournalError> {
        let should_flush = match self.config.flush_policy {
            FlushPolicy::EveryWrite => true,
            FlushPolicy::EveryN(n) => self.writes_since_flush >= n,
        };
        if should_flush {
            self.writer.flush()?;
            self.writes_since_flush = 0;
        }
        Ok(())
    }

    fn apply_fsync_policy(&mut self) -> Result<(), JournalError> {
        let should_fsync = match self.config.fsync_policy {
            FsyncPolicy::EveryWrite => true,
            FsyncPolicy::EveryN(n) => self.writes_since_fsync >= n,
            FsyncPolicy::OnRotation => false,
        };
        if should_fsync {
            self.writer.get_ref().sync_all()?;
            self.writes_since_fsync = 0;
        }
        Ok(())
    }

    fn rotate(&mut self) -> Result<(), JournalError> {
        // Fsync the old file before switching
        self.sync()?;

        self.file_index += 1;
        self.current_file = Self::journal_path(&self.config.dir, self.file_index);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.current_file)?;
        self.writer = BufWriter::new(file);
        self.current_file_size = 0;
        Ok(())
    }

    fn journal_path(dir: &Path, index: u64) -> PathBuf {
        dir.join(format!("journal-{:06}.bin", index))
    }

    fn find_latest_index(dir: &Path) -> u64 {
        fs::read_dir(dir)
            .ok()
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| {
                        let name = e.file_name().to_string_lossy().to_string();
                        name.strip_prefix("journal-")?
                            .strip_suffix(".bin")?
                            .parse::<u64>()
                            .ok()
                    })
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }
}

// ── Tests ───────────────────────────────────────────────────────────
