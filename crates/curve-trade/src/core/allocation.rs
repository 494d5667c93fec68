//! Fundraising allocation cap and graduation progress.
//!
//! The cap is never used to shrink an amount. A spend above the remaining
//! allocation is reported as [`AllocationCheck::Exceeded`] so the caller can
//! block the trade with the real figure still on screen.

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::PROGRESS_COMPLETE;
use crate::types::ScaledAmount;

/// Base asset still accepted before the curve hits its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationCap {
    pub remaining: String,
}

impl AllocationCap {
    /// `max(0, target − current_raised)`.
    ///
    /// Unreadable figures count as zero, so a broken target closes the cap
    /// instead of opening it.
    pub fn from_progress(target: &str, current_raised: &str, decimals: u32) -> Self {
        let target = parse_or_zero(target, decimals, "target");
        let raised = parse_or_zero(current_raised, decimals, "current_raised");
        Self {
            remaining: target.saturating_sub(&raised).to_decimal_string(),
        }
    }

    pub fn remaining_amount(&self, decimals: u32) -> ScaledAmount {
        parse_or_zero(&self.remaining, decimals, "remaining")
    }
}

/// Result of comparing a required spend against the cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AllocationCheck {
    Within,
    Exceeded { required: String, remaining: String },
    /// The spend is not known yet (no amount or no quote).
    Unknown,
}

impl AllocationCheck {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Exceeded { .. })
    }
}

/// Compare the base asset a buy would spend against the remaining allocation.
pub fn check_allocation(required_spend: &str, cap: &AllocationCap, decimals: u32) -> AllocationCheck {
    let Some(required) = ScaledAmount::parse(required_spend, decimals) else {
        return AllocationCheck::Unknown;
    };
    let remaining = cap.remaining_amount(decimals);
    if required > remaining {
        AllocationCheck::Exceeded {
            required: required.to_decimal_string(),
            remaining: remaining.to_decimal_string(),
        }
    } else {
        AllocationCheck::Within
    }
}

/// Raised / target as a percentage, floored to two places and capped at 100.
pub fn progress_percent(current_raised: &str, target: &str, decimals: u32) -> Decimal {
    let target = parse_or_zero(target, decimals, "target");
    if target.is_zero() {
        return Decimal::ZERO;
    }
    let raised = parse_or_zero(current_raised, decimals, "current_raised");

    let basis_points: BigUint = raised.raw() * 10_000u32 / target.raw();
    let capped = basis_points.to_u64().unwrap_or(u64::MAX).min(10_000);
    Decimal::new(capped as i64, 2).min(PROGRESS_COMPLETE)
}

fn parse_or_zero(value: &str, decimals: u32, field: &'static str) -> ScaledAmount {
    ScaledAmount::parse(value, decimals).unwrap_or_else(|| {
        if !value.is_empty() {
            warn!(field, value, "unreadable allocation figure treated as zero");
        }
        ScaledAmount::zero(decimals)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_remaining_is_target_minus_raised() {
        let cap = AllocationCap::from_progress("1000", "950.5", 18);
        assert_eq!(cap.remaining, "49.5");
    }

    #[test]
    fn test_remaining_never_negative() {
        let cap = AllocationCap::from_progress("1000", "1200", 18);
        assert_eq!(cap.remaining, "0");
    }

    #[test]
    fn test_broken_target_closes_cap() {
        let cap = AllocationCap::from_progress("n/a", "10", 18);
        assert_eq!(cap.remaining, "0");
    }

    #[test]
    fn test_check_blocks_instead_of_clamping() {
        let cap = AllocationCap {
            remaining: "50".into(),
        };
        let check = check_allocation("60", &cap, 18);
        assert_eq!(
            check,
            AllocationCheck::Exceeded {
                required: "60".into(),
                remaining: "50".into(),
            }
        );
        assert!(check.is_blocked());
    }

    #[test]
    fn test_check_within_and_boundary() {
        let cap = AllocationCap {
            remaining: "50".into(),
        };
        assert_eq!(check_allocation("50", &cap, 18), AllocationCheck::Within);
        assert!(check_allocation("50.000000000000000001", &cap, 18).is_blocked());
        assert_eq!(check_allocation("", &cap, 18), AllocationCheck::Unknown);
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent("250", "1000", 18), dec!(25));
        assert_eq!(progress_percent("1", "3", 18), dec!(33.33));
        assert_eq!(progress_percent("1500", "1000", 18), dec!(100));
        assert_eq!(progress_percent("10", "0", 18), Decimal::ZERO);
    }
}
