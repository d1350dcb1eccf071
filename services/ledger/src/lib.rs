//! Ledger service
//!
//! Exclusive owner of account balance mutation. Every balance is a pair of
//! non-negative decimals (available, reserved) keyed by (account, asset).
//! Placing an order or initiating a withdrawal reserves funds; fills and
//! confirmations settle against the reservation; aborts release it.
//!
//! **Key invariant:** for any sequence of reserve/release/settle calls,
//! available + reserved equals the initial balance plus the sum of settled
//! deltas. Reserved funds are never silently leaked.

pub mod balance;
pub mod store;

pub use balance::Balance;
pub use store::Ledger;
