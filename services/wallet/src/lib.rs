//! Wallet and transfer service
//!
//! Address validation (fail-closed), network fee quoting, deposit address
//! derivation, on-chain withdrawals with reserve/settle/release accounting,
//! and a fiat gateway adapter over an external payment rail.

pub mod address;
pub mod fees;
pub mod fiat;
pub mod transfer;

pub use address::{generate_deposit_address, validate_address};
pub use fees::{FeeOracle, StaticFeeSchedule};
pub use fiat::{FiatGateway, PaymentRail, UnreachableRail};
pub use transfer::{NetworkAdapter, SimulatedNetwork, TransferService};
