//! Types library for the BITZURI exchange backend
//!
//! Provides all core type definitions shared across the backend services,
//! ensuring type safety and deterministic money arithmetic.
//!
//! # Modules
//! - `ids`: Unique identifiers (OrderId, TradeId, AccountId, TransferId, Symbol)
//! - `numeric`: Fixed-point decimal types (Price, Quantity)
//! - `order`: Order lifecycle types
//! - `trade`: Trade (fill) types
//! - `transfer`: On-chain transfer and fiat transaction types
//! - `errors`: Error taxonomy

pub mod ids;
pub mod numeric;
pub mod order;
pub mod trade;
pub mod transfer;
pub mod errors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::trade::*;
    pub use crate::transfer::*;
    pub use crate::errors::*;
}
