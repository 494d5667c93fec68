//! Decimal input normalization: keystroke-level string canonicalization.
//!
//! Every function here is pure and synchronous. Amounts travel as canonical
//! decimal strings (no sign, at most one point, bounded fraction) and are
//! only lifted into integers through [`to_scaled_integer`], which never
//! touches floating point.
//!
//! The empty string means "no value", never zero.

use std::cmp::Ordering;

use num_bigint::BigUint;
use num_traits::Zero;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::constants::THOUSANDS_SEPARATOR;

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

/// Accepts the empty string, `"."`, and digits with at most one decimal point.
///
/// Anything else (signs, letters, a second point) is a keystroke the caller
/// must drop rather than repair.
pub fn is_valid_decimal_token(text: &str) -> bool {
    let mut seen_point = false;
    for c in text.chars() {
        match c {
            '0'..='9' => {}
            '.' if !seen_point => seen_point = true,
            _ => return false,
        }
    }
    true
}

/// Truncate a fractional part to `max_decimals` digits. Never rounds.
///
/// `Some(0)` strips every fractional digit while `None` means no limit.
/// The two are deliberately opposite.
pub fn clamp_fractional_digits(fractional: &str, max_decimals: Option<u32>) -> String {
    match max_decimals {
        None => fractional.to_string(),
        Some(max) => fractional.chars().take(max as usize).collect(),
    }
}

/// Remove leading zeros that precede another digit; a lone `"0"` survives.
pub fn strip_leading_zeros(integer: &str) -> String {
    let trimmed = integer.trim_start_matches('0');
    if trimmed.is_empty() && !integer.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Number of digits after the decimal point (0 when there is no point).
pub fn fractional_len(value: &str) -> usize {
    value
        .split_once('.')
        .map(|(_, frac)| frac.len())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Normalization pipeline
// ---------------------------------------------------------------------------

/// Canonicalize raw text into a decimal string.
///
/// Trims, drops thousands separators, drops one leading sign, maps a lone
/// `"."` to `"0."`, strips integer leading zeros and truncates the fraction.
/// Text that still does not fit the decimal grammar yields `""`.
pub fn normalize(raw: &str, max_decimals: Option<u32>) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let without_separators = remove_thousands_separators(trimmed);
    let unsigned = without_separators
        .strip_prefix(|c: char| c == '+' || c == '-')
        .unwrap_or(&without_separators);

    if unsigned.is_empty() {
        return String::new();
    }
    if unsigned == "." {
        return "0.".to_string();
    }
    if !is_valid_decimal_token(unsigned) {
        debug!(raw, "discarding text outside the decimal grammar");
        return String::new();
    }

    match unsigned.split_once('.') {
        None => strip_leading_zeros(unsigned),
        Some((integer, fractional)) => format!(
            "{}.{}",
            strip_leading_zeros(integer),
            clamp_fractional_digits(fractional, max_decimals)
        ),
    }
}

/// Normalize a numeric value handed over by the bound-value owner.
pub fn normalize_decimal(value: Decimal, max_decimals: Option<u32>) -> String {
    normalize(&value.normalize().to_string(), max_decimals)
}

/// Settle a value when the field loses focus: `"."` and `"0."` become `"0"`,
/// any other trailing point is dropped.
pub fn canonicalize_on_blur(value: &str) -> String {
    match value {
        "." | "0." => "0".to_string(),
        other => other.strip_suffix('.').unwrap_or(other).to_string(),
    }
}

// ---------------------------------------------------------------------------
// Display formatting
// ---------------------------------------------------------------------------

/// Group the integer digits in threes. The fractional part is left untouched.
pub fn format_with_thousands_separator(value: &str, enabled: bool) -> String {
    if !enabled || value.is_empty() {
        return value.to_string();
    }

    let (integer, rest) = match value.find('.') {
        Some(idx) => value.split_at(idx),
        None => (value, ""),
    };

    let digits = integer.chars().count();
    let mut grouped = String::with_capacity(value.len() + digits / 3);
    for (idx, c) in integer.chars().enumerate() {
        if idx > 0 && (digits - idx) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(c);
    }
    grouped.push_str(rest);
    grouped
}

pub fn remove_thousands_separators(text: &str) -> String {
    text.chars().filter(|c| *c != THOUSANDS_SEPARATOR).collect()
}

/// Carry a caret across a reformat so it stays behind the same digit.
///
/// Counts the non-separator characters before `old_cursor` in `old_display`
/// and returns the index just past that many non-separator characters in
/// `new_display`, or the end of `new_display` when it runs out.
pub fn remap_cursor_position(old_display: &str, new_display: &str, old_cursor: usize) -> usize {
    let significant = old_display
        .chars()
        .take(old_cursor)
        .filter(|c| *c != THOUSANDS_SEPARATOR)
        .count();
    if significant == 0 {
        return 0;
    }

    let mut seen = 0;
    for (idx, c) in new_display.chars().enumerate() {
        if c != THOUSANDS_SEPARATOR {
            seen += 1;
            if seen == significant {
                return idx + 1;
            }
        }
    }
    new_display.chars().count()
}

// ---------------------------------------------------------------------------
// Integer scaling
// ---------------------------------------------------------------------------

/// `10^decimals` as an arbitrary-precision integer.
pub fn pow10(decimals: u32) -> BigUint {
    BigUint::from(10u32).pow(decimals)
}

/// Scale a decimal string by `10^decimals` using integer arithmetic only.
///
/// Returns `None` for "no value" input (empty, whitespace, a lone point) and
/// for malformed text, which is logged but never raised. Fractional digits
/// beyond `decimals` are truncated.
pub fn to_scaled_integer(value: &str, decimals: u32) -> Option<BigUint> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    if !is_valid_decimal_token(trimmed) {
        warn!(value, decimals, "cannot scale malformed decimal string");
        return None;
    }

    let body = trimmed.strip_suffix('.').unwrap_or(trimmed);
    if trimmed == "0" || body.is_empty() {
        return Some(BigUint::zero());
    }

    let (integer, fractional) = body.split_once('.').unwrap_or((body, ""));
    let mut digits = String::with_capacity(integer.len() + decimals as usize);
    digits.push_str(integer);
    digits.extend(fractional.chars().take(decimals as usize));
    for _ in fractional.len()..decimals as usize {
        digits.push('0');
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Some(BigUint::zero());
    }
    match BigUint::parse_bytes(significant.as_bytes(), 10) {
        Some(scaled) => Some(scaled),
        None => {
            warn!(value, decimals, "decimal string did not parse as an integer");
            None
        }
    }
}

/// Inverse of [`to_scaled_integer`]: render an integer scaled by
/// `10^decimals` as a decimal string without trailing fractional zeros.
pub fn from_scaled_integer(scaled: &BigUint, decimals: u32) -> String {
    let digits = scaled.to_string();
    if decimals == 0 {
        return digits;
    }

    let width = decimals as usize;
    let (integer, fractional) = if digits.len() > width {
        let (int, frac) = digits.split_at(digits.len() - width);
        (int.to_string(), frac.to_string())
    } else {
        ("0".to_string(), format!("{digits:0>width$}"))
    };

    let fractional = fractional.trim_end_matches('0');
    if fractional.is_empty() {
        integer
    } else {
        format!("{integer}.{fractional}")
    }
}

/// Exact comparison of two decimal strings.
///
/// Both sides are scaled to the longer fraction so nothing is truncated.
/// Returns `None` when either side is not a value.
pub fn compare_decimal_strings(a: &str, b: &str) -> Option<Ordering> {
    let scale = fractional_len(a).max(fractional_len(b)) as u32;
    let lhs = to_scaled_integer(a, scale)?;
    let rhs = to_scaled_integer(b, scale)?;
    Some(lhs.cmp(&rhs))
}

/// True when the string holds a value strictly greater than zero.
pub fn is_positive(value: &str) -> bool {
    to_scaled_integer(value, fractional_len(value) as u32).is_some_and(|v| !v.is_zero())
}
