//! Decimal price type for offers
//!
//! Uses rust_decimal for exact arithmetic and ordering. Prices serialize
//! as strings so no precision is lost on the wire.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Offer price, always strictly positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price, returning None unless the value is positive
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value.normalize()))
        } else {
            None
        }
    }

    /// Create a whole-unit price
    ///
    /// # Panics
    /// Panics if `units` is zero
    pub fn from_u64(units: u64) -> Self {
        Self::try_new(Decimal::from(units)).expect("Price must be positive")
    }

    /// Parse a decimal string such as "49.90"
    pub fn parse(s: &str) -> Option<Self> {
        Decimal::from_str(s.trim()).ok().and_then(Self::try_new)
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

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Price::try_new(value)
            .ok_or_else(|| serde::de::Error::custom(format!("price must be positive, got {}", value)))
    }
}
