//! Fixed-point decimal types for prices and quantities
//!
//! Wraps `rust_decimal::Decimal` in validated newtypes so money never travels
//! through floating point. Prices are strictly positive; quantities are
//! non-negative (zero appears as a running remainder, never as an order size).
//!
//! Both types cap their scale at [`MAX_SCALE`] fractional digits, rounding
//! half-up, so repeated arithmetic cannot accumulate precision drift.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use thiserror::Error;

/// Maximum fractional digits carried by prices and quantities.
pub const MAX_SCALE: u32 = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumericError {
    #[error("value must be positive, got {0}")]
    NotPositive(Decimal),

    #[error("value must not be negative, got {0}")]
    Negative(Decimal),

    #[error("not a valid decimal: {0}")]
    Unparseable(String),
}

fn normalize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MAX_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// A strictly positive execution or limit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Validate and construct a price. Zero and negative values are rejected.
    pub fn try_new(value: Decimal) -> Result<Self, NumericError> {
        if value <= Decimal::ZERO {
            return Err(NumericError::NotPositive(value));
        }
        Ok(Self(normalize(value)))
    }

    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_str(s: &str) -> Result<Self, NumericError> {
        let d: Decimal = s
            .parse()
            .map_err(|_| NumericError::Unparseable(s.to_string()))?;
        Self::try_new(d)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative order or fill quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Validate and construct a quantity. Negative values are rejected;
    /// zero is allowed (a fully consumed remainder).
    pub fn try_new(value: Decimal) -> Result<Self, NumericError> {
        if value < Decimal::ZERO {
            return Err(NumericError::Negative(value));
        }
        Ok(Self(normalize(value)))
    }

    pub fn from_str(s: &str) -> Result<Self, NumericError> {
        let d: Decimal = s
            .parse()
            .map_err(|_| NumericError::Unparseable(s.to_string()))?;
        Self::try_new(d)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The smaller of two quantities (match size at a price level).
    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    /// Subtraction clamped at zero. A fill can never drive a remainder
    /// negative, so saturation is the correct behavior here.
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self(Decimal::ZERO)
        } else {
            Self(self.0 - other.0)
        }
    }

    /// Notional value of this quantity at a price, in the quote asset.
    ///
    /// Exact: both operands carry at most [`MAX_SCALE`] fractional digits,
    /// so the product fits in a `Decimal` without rounding. Settlement
    /// accounting relies on this exactness (sums of per-fill notionals
    /// equal the notional of the sum).
    pub fn notional(&self, price: Price) -> Decimal {
        self.0 * price.as_decimal()
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    /// # Panics
    /// Panics if the result would be negative. Use [`Quantity::saturating_sub`]
    /// where a clamped remainder is wanted.
    fn sub(self, rhs: Self) -> Self::Output {
        assert!(rhs.0 <= self.0, "quantity subtraction underflow");
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
