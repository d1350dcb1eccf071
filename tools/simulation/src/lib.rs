//! Deterministic simulation and fault-injection harness
//!
//! Drives the real exchange stack (ledger, matching engine, journal seam)
//! with seeded bots, so a given seed always produces the same trade tape.
//! Fault injection replaces ad-hoc random failures with a seeded journal
//! fault rate, and every run is checked against the system's conservation
//! invariants afterwards.

pub mod bots;
pub mod faults;
pub mod harness;

pub use faults::FlakyJournal;
pub use harness::{SimConfig, SimReport, Simulation};
