//! Matching engine service
//!
//! Price-time priority matching over per-symbol order books, with balance
//! reservation through the ledger and trade journaling before
//! acknowledgement.
//!
//! **Key invariants:**
//! - Strict FIFO time priority at equal price (the fairness contract)
//! - Execution always at the resting maker order's price
//! - Deterministic matching: same inputs produce the same trades
//! - Market order remainders are cancelled, never rested
//! - Every reservation is either settled or released; no leaked funds

pub mod book;
pub mod matching;
pub mod engine;
pub mod events;
pub mod exchange;

pub use engine::{CancelReport, ExecutionReport, OrderRequest, SymbolEngine};
pub use events::{JournalFault, MemoryJournal, NoopJournal, TradeJournal};
pub use exchange::{now_nanos, Exchange};
pub use matching::FeeSchedule;
