//! Unique identifier types for exchange entities
//!
//! All entity IDs use UUID v7, so identifiers sort chronologically and
//! journal replay can rely on creation order.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new id with the current timestamp embedded.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for an order.
    OrderId
}

uuid_id! {
    /// Unique identifier for a trade (fill).
    TradeId
}

uuid_id! {
    /// Unique identifier for an account.
    AccountId
}

uuid_id! {
    /// Unique identifier for an on-chain transfer.
    TransferId
}

uuid_id! {
    /// Unique identifier for a fiat deposit/withdraw transaction.
    FiatTxId
}

/// Trading pair symbol in "BASE/QUOTE" format (e.g. "BTC/USD", "ETH/USDC").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Parse a symbol, rejecting anything that is not `BASE/QUOTE` with
    /// non-empty uppercase-alphanumeric legs.
    pub fn parse(symbol: impl Into<String>) -> Option<Self> {
        let s = symbol.into();
        let mut parts = s.split('/');
        let base = parts.next()?;
        let quote = parts.next()?;
        if parts.next().is_some() || base.is_empty() || quote.is_empty() {
            return None;
        }
        let leg_ok = |leg: &str| leg.chars().all(|c| c.is_ascii_alphanumeric());
        if !leg_ok(base) || !leg_ok(quote) {
            return None;
        }
        Some(Self(s))
    }

    /// Construct from a literal known to be valid.
    ///
    /// # Panics
    /// Panics on malformed input; use [`Symbol::parse`] for untrusted data.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::parse(symbol).expect("symbol must be in BASE/QUOTE format")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The asset being traded (left leg).
    pub fn base(&self) -> &str {
        self.0.split('/').next().unwrap()
    }

    /// The asset it is priced in (right leg).
    pub fn quote(&self) -> &str {
        self.0.split('/').nth(1).unwrap()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
