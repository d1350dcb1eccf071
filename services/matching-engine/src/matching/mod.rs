//! Price-time priority matching logic

pub mod crossing;
pub mod executor;

pub use crossing::crosses;
pub use executor::{FeeSchedule, TradeFactory};
