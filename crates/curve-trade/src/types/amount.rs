//! Newtype wrapper for token amounts scaled to on-chain integer units.
//!
//! A `ScaledAmount` carries its own decimals so values with different
//! precisions (a 6-decimal base asset against an 18-decimal token) are never
//! compared as raw integers by accident.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Serialize, Serializer};

use crate::core::decimal::{from_scaled_integer, pow10, to_scaled_integer};

/// Integer amount equal to `decimal value × 10^decimals`.
#[derive(Clone, Default)]
pub struct ScaledAmount {
    raw: BigUint,
    decimals: u32,
}

impl ScaledAmount {
    pub fn new(raw: BigUint, decimals: u32) -> Self {
        Self { raw, decimals }
    }

    pub fn zero(decimals: u32) -> Self {
        Self::new(BigUint::zero(), decimals)
    }

    /// Parse a decimal string, truncating excess fractional digits.
    /// `None` for "no value" or malformed text.
    pub fn parse(value: &str, decimals: u32) -> Option<Self> {
        to_scaled_integer(value, decimals).map(|raw| Self::new(raw, decimals))
    }

    pub fn raw(&self) -> &BigUint {
        &self.raw
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Re-express at another precision. Shrinking truncates toward zero.
    pub fn rescale(&self, decimals: u32) -> Self {
        let raw = match decimals.cmp(&self.decimals) {
            Ordering::Equal => self.raw.clone(),
            Ordering::Greater => &self.raw * pow10(decimals - self.decimals),
            Ordering::Less => &self.raw / pow10(self.decimals - decimals),
        };
        Self::new(raw, decimals)
    }

    /// `self × numerator / denominator`, rounded down.
    pub fn mul_ratio_floor(&self, numerator: u32, denominator: u32) -> Self {
        if denominator == 0 {
            return Self::zero(self.decimals);
        }
        Self::new(&self.raw * numerator / denominator, self.decimals)
    }

    /// `self × numerator / denominator`, rounded up.
    pub fn mul_ratio_ceil(&self, numerator: u32, denominator: u32) -> Self {
        if denominator == 0 {
            return Self::zero(self.decimals);
        }
        let product = &self.raw * numerator;
        let denominator = BigUint::from(denominator);
        let quotient = &product / &denominator;
        let raw = if (&product % &denominator).is_zero() {
            quotient
        } else {
            quotient + 1u32
        };
        Self::new(raw, self.decimals)
    }

    /// `max(0, self − other)`, expressed at the finer of the two precisions.
    pub fn saturating_sub(&self, other: &Self) -> Self {
        let decimals = self.decimals.max(other.decimals);
        let lhs = self.rescale(decimals);
        let rhs = other.rescale(decimals);
        if lhs.raw <= rhs.raw {
            Self::zero(decimals)
        } else {
            Self::new(lhs.raw - rhs.raw, decimals)
        }
    }

    /// Canonical decimal string without trailing fractional zeros.
    pub fn to_decimal_string(&self) -> String {
        from_scaled_integer(&self.raw, self.decimals)
    }
}

impl PartialEq for ScaledAmount {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScaledAmount {}

impl PartialOrd for ScaledAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScaledAmount {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.decimals == other.decimals {
            return self.raw.cmp(&other.raw);
        }
        let decimals = self.decimals.max(other.decimals);
        self.rescale(decimals).raw.cmp(&other.rescale(decimals).raw)
    }
}

impl fmt::Debug for ScaledAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScaledAmount({} @ {})", self.raw, self.decimals)
    }
}

impl fmt::Display for ScaledAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

/// Serialized as its canonical decimal string.
impl Serialize for ScaledAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}
