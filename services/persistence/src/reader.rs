//! Sequential journal reader with corruption detection
//!
//! Reads journal files in index order, validating every entry's CRC32C
//! checksum. A corrupt or truncated tail is the expected crash signature:
//! the reader recovers the valid prefix and logs what it skipped, with
//! byte offsets for diagnostics.

use crate::journal::{JournalEntry, JournalError};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("Checksum mismatch at byte offset {offset}: entry seq={sequence}")]
    ChecksumMismatch { offset: u64, sequence: u64 },

    #[error("Sequence gap: expected {expected}, got {got}")]
    SequenceGap { expected: u64, got: u64 },

    #[error("Sequence not monotonic: prev={prev}, current={current}")]
    NotMonotonic { prev: u64, current: u64 },
}

// ── Corruption log ──────────────────────────────────────────────────

/// One detected corruption, with its location.
#[derive(Debug, Clone)]
pub struct CorruptionRecord {
    pub byte_offset: u64,
    pub kind: CorruptionKind,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CorruptionKind {
    ChecksumMismatch,
    TruncatedEntry,
}

// ── Reader ──────────────────────────────────────────────────────────

pub struct JournalReader {
    /// Journal file paths, sorted by index.
    files: Vec<PathBuf>,
    current_file_idx: usize,
    /// Raw bytes of the current file.
    data: Vec<u8>,
    pos: usize,
    /// Byte offset across all files.
    global_offset: u64,
    last_sequence: Option<u64>,
    corruption_log: Vec<CorruptionRecord>,
}

impl JournalReader {
    /// Open a reader over every journal file in a directory. An absent or
    /// empty directory reads as an empty journal.
    pub fn open(dir: &Path) -> Result<Self, ReaderError> {
        let files = Self::discover_files(dir)?;
        let mut reader = Self {
            files,
            current_file_idx: 0,
            data: Vec::new(),
            pos: 0,
            global_offset: 0,
            last_sequence: None,
            corruption_log: Vec::new(),
        };
        reader.load_current_file()?;
        Ok(reader)
    }

    /// Read the next entry, validating its checksum. `None` once all files
    /// are exhausted.
    pub fn next_entry(&mut self) -> Result<Option<JournalEntry>, ReaderError> {
        loop {
            if self.pos >= self.data.len() {
                if !self.advance_file()? {
                    return Ok(None);
                }
            }

            let offset_before = self.global_offset;
            match JournalEntry::from_bytes(&self.data[self.pos..]) {
                Ok((entry, consumed)) => {
                    self.pos += consumed;
                    self.global_offset += consumed as u64;

                    if !entry.verify_checksum() {
                        self.corruption_log.push(CorruptionRecord {
                            byte_offset: offset_before,
                            kind: CorruptionKind::ChecksumMismatch,
                            detail: format!(
                                "CRC32C mismatch for seq={}, stored={:#010x}",
                                entry.sequence, entry.checksum
                            ),
                        });
                        return Err(ReaderError::ChecksumMismatch {
                            offset: offset_before,
                            sequence: entry.sequence,
                        });
                    }

                    self.last_sequence = Some(entry.sequence);
                    return Ok(Some(entry));
                }
                Err(_) => {
                    // Unparseable remainder: crash-truncated tail.
                    let remaining = self.data.len() - self.pos;
                    if remaining > 0 {
                        self.corruption_log.push(CorruptionRecord {
                            byte_offset: offset_before,
                            kind: CorruptionKind::TruncatedEntry,
                            detail: format!(
                                "truncated entry: {} bytes remaining",
                                remaining
                            ),
                        });
                    }
                    self.pos = self.data.len();
                }
            }
        }
    }

    /// Read every valid entry.
    pub fn read_all(&mut self) -> Result<Vec<JournalEntry>, ReaderError> {
        let mut entries = Vec::new();
        while let Some(entry) = self.next_entry()? {
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Read every entry, failing on the first sequence gap.
    pub fn read_all_validated(&mut self) -> Result<Vec<JournalEntry>, ReaderError> {
        let mut entries = Vec::new();
        let mut expected_seq: Option<u64> = None;

        while let Some(entry) = self.next_entry()? {
            if let Some(exp) = expected_seq {
                if entry.sequence != exp {
                    return Err(ReaderError::SequenceGap {
                        expected: exp,
                        got: entry.sequence,
                    });
                }
            }
            expected_seq = Some(entry.sequence + 1);
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Read as many valid entries as possible, skipping corrupted regions.
    /// Returns the recovered entries and the corruption log.
    pub fn recover_entries(&mut self) -> (Vec<JournalEntry>, Vec<CorruptionRecord>) {
        let mut entries = Vec::new();
        loop {
            match self.next_entry() {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => break,
                Err(ReaderError::ChecksumMismatch { .. }) => {
                    self.skip_corrupted_region();
                }
                Err(_) => break,
            }
        }
        (entries, self.corruption_log.clone())
    }

    pub fn current_offset(&self) -> u64 {
        self.global_offset
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    pub fn corruption_log(&self) -> &[CorruptionRecord] {
        &self.corruption_log
    }

    /// Validate that entries carry gapless, strictly increasing sequences.
    pub fn validate_sequences(entries: &[JournalEntry]) -> Result<(), ReaderError> {
        for window in entries.windows(2) {
            let (prev, curr) = (&window[0], &window[1]);
            if curr.sequence <= prev.sequence {
                return Err(ReaderError::NotMonotonic {
                    prev: prev.sequence,
                    current: curr.sequence,
                });
            }
            if curr.sequence != prev.sequence + 1 {
                return Err(ReaderError::SequenceGap {
                    expected: prev.sequence + 1,
                    got: curr.sequence,
                });
            }
        }
        Ok(())
    }

    // ── Internal ────────────────────────────────────────────────────

    fn discover_files(dir: &Path) -> Result<Vec<PathBuf>, ReaderError> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files: Vec<(u64, PathBuf)> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().to_string();
                let idx = name
                    .strip_prefix("journal-")?
                    .strip_suffix(".bin")?
                    .parse::<u64>()
                    .ok()?;
                Some((idx, e.path()))
            })
            .collect();

        files.sort_by_key(|(idx, _)| *idx);
        Ok(files.into_iter().map(|(_, p)| p).collect())
    }

    fn load_current_file(&mut self) -> Result<(), ReaderError> {
        self.data.clear();
        self.pos = 0;
        if self.current_file_idx < self.files.len() {
            let mut file = File::open(&self.files[self.current_file_idx])?;
            file.read_to_end(&mut self.data)?;
        }
        Ok(())
    }

    fn advance_file(&mut self) -> Result<bool, ReaderError> {
        self.current_file_idx += 1;
        if self.current_file_idx < self.files.len() {
            self.load_current_file()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Scan forward for the next plausible length prefix after a corrupt
    /// entry.
    fn skip_corrupted_region(&mut self) {
        while self.pos < self.data.len() {
            self.pos += 1;
            self.global_offset += 1;
            if self.pos + 4 <= self.data.len() {
                let len = u32::from_le_bytes([
                    self.data[self.pos],
                    self.data[self.pos + 1],
                    self.data[self.pos + 2],
                    self.data[self.pos + 3],
                ]) as usize;
                if len > 0 && len < 10_000_000 && self.pos + 4 + len <= self.data.len() {
                    break;
                }
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
