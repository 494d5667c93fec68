use anyhow::{bail, Result};

use super::types::TradeConfig;
use crate::constants::{BPS_DENOMINATOR, MAX_TOKEN_DECIMALS};
use crate::core::decimal::{is_positive, is_valid_decimal_token};

/// Validate invariants that serde alone cannot enforce. Called automatically
/// by [`super::load_config`].
pub fn validate_config(config: &TradeConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    validate_logging_config(config, &mut errors);
    validate_trading_config(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        let msg = format!(
            "Configuration validation failed ({} error{}):\n  - {}",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" },
            errors.join("\n  - ")
        );
        bail!("{msg}");
    }
}

// ---------------------------------------------------------------------------
// Logging config
// ---------------------------------------------------------------------------

fn validate_logging_config(config: &TradeConfig, errors: &mut Vec<String>) {
    let logging = &config.app.logging;

    if logging.log_dir.is_empty() {
        errors.push("app.logging: log_dir is empty".into());
    }
    if logging.file_name.is_empty() {
        errors.push("app.logging: file_name is empty".into());
    }
}

// ---------------------------------------------------------------------------
// Trading config
// ---------------------------------------------------------------------------

fn validate_trading_config(config: &TradeConfig, errors: &mut Vec<String>) {
    let trading = &config.trading;

    for (name, decimals) in [
        ("base_decimals", trading.base_decimals),
        ("token_decimals", trading.token_decimals),
    ] {
        if decimals > MAX_TOKEN_DECIMALS {
            errors.push(format!(
                "trading: {name} ({decimals}) exceeds {MAX_TOKEN_DECIMALS}"
            ));
        }
    }

    if let Some(max) = trading.max_input_decimals {
        if max > MAX_TOKEN_DECIMALS {
            errors.push(format!(
                "trading: max_input_decimals ({max}) exceeds {MAX_TOKEN_DECIMALS}"
            ));
        }
    }

    for amount in &trading.quick_buy_amounts {
        if !is_valid_decimal_token(amount) || !is_positive(amount) {
            errors.push(format!(
                "trading.quick_buy_amounts: {amount:?} is not a positive decimal"
            ));
        }
    }

    for pct in &trading.quick_sell_percentages {
        if !(1..=100).contains(pct) {
            errors.push(format!(
                "trading.quick_sell_percentages: {pct} must be in [1, 100]"
            ));
        }
    }

    if trading.max_slippage_bps >= BPS_DENOMINATOR {
        errors.push(format!(
            "trading: max_slippage_bps ({}) must be < {BPS_DENOMINATOR}",
            trading.max_slippage_bps
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&TradeConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = TradeConfig::default();
        config.trading.token_decimals = 40;
        config.trading.quick_sell_percentages = vec![0, 50, 101];
        config.trading.max_slippage_bps = 10_000;

        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("4 errors"), "got: {err}");
        assert!(err.contains("token_decimals (40)"));
        assert!(err.contains("max_slippage_bps"));
    }

    #[test]
    fn test_rejects_malformed_quick_amount() {
        let mut config = TradeConfig::default();
        config.trading.quick_buy_amounts = vec!["10".into(), "1,000".into(), "0".into()];
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("2 errors"), "got: {err}");
        assert!(err.contains("\"1,000\""));
    }

    #[test]
    fn test_rejects_empty_log_dir() {
        let mut config = TradeConfig::default();
        config.app.logging.log_dir.clear();
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("(1 error)"), "got: {err}");
    }
}
