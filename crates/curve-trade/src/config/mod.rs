pub mod types;
pub mod validate;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Load the config JSON files into a single [`TradeConfig`], then apply
/// environment variable overrides and validate.
///
/// Expected directory layout:
/// ```text
/// config/
///   trading.json
///   app.json       (optional, logging defaults otherwise)
/// ```
///
/// # Environment variable overrides
///
/// | Env Var                          | Config Field                        |
/// |----------------------------------|-------------------------------------|
/// | `TRADE_BASE_DECIMALS`            | `trading.base_decimals`             |
/// | `TRADE_TOKEN_DECIMALS`           | `trading.token_decimals`            |
/// | `TRADE_MAX_INPUT_DECIMALS`       | `trading.max_input_decimals`        |
/// | `TRADE_THOUSANDS_SEPARATOR`      | `trading.thousands_separator`       |
/// | `TRADE_MODE_TOGGLE_DEBOUNCE_MS`  | `trading.mode_toggle_debounce_ms`   |
/// | `TRADE_QUOTE_DEBOUNCE_MS`        | `trading.quote_debounce_ms`         |
/// | `TRADE_MAX_SLIPPAGE_BPS`         | `trading.max_slippage_bps`          |
/// | `TRADE_LOG_DIR`                  | `app.logging.log_dir`               |
pub fn load_config(config_dir: &Path) -> Result<TradeConfig> {
    let read = |name: &str| -> Result<String> {
        let path = config_dir.join(name);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))
    };

    let trading: TradingConfig =
        serde_json::from_str(&read("trading.json")?).context("parsing trading.json")?;

    // App config is optional.
    let app: AppConfig = match read("app.json") {
        Ok(contents) => serde_json::from_str(&contents).context("parsing app.json")?,
        Err(_) => AppConfig::default(),
    };

    let mut config = TradeConfig { app, trading };

    apply_env_overrides(&mut config);
    validate::validate_config(&config)?;

    Ok(config)
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides to the loaded config.
///
/// Only non-empty env vars take effect. Parse failures are skipped (the JSON
/// value remains).
fn apply_env_overrides(config: &mut TradeConfig) {
    // -- Precision -----------------------------------------------------------
    if let Some(val) = env_parse::<u32>("TRADE_BASE_DECIMALS") {
        info!(val, "env override: TRADE_BASE_DECIMALS");
        config.trading.base_decimals = val;
    }

    if let Some(val) = env_parse::<u32>("TRADE_TOKEN_DECIMALS") {
        info!(val, "env override: TRADE_TOKEN_DECIMALS");
        config.trading.token_decimals = val;
    }

    if let Some(val) = env_parse::<u32>("TRADE_MAX_INPUT_DECIMALS") {
        info!(val, "env override: TRADE_MAX_INPUT_DECIMALS");
        config.trading.max_input_decimals = Some(val);
    }

    // -- Field behaviour -----------------------------------------------------
    if let Some(val) = env_bool("TRADE_THOUSANDS_SEPARATOR") {
        info!(val, "env override: TRADE_THOUSANDS_SEPARATOR");
        config.trading.thousands_separator = val;
    }

    if let Some(val) = env_parse::<u64>("TRADE_MODE_TOGGLE_DEBOUNCE_MS") {
        info!(val, "env override: TRADE_MODE_TOGGLE_DEBOUNCE_MS");
        config.trading.mode_toggle_debounce_ms = val;
    }

    if let Some(val) = env_parse::<u64>("TRADE_QUOTE_DEBOUNCE_MS") {
        info!(val, "env override: TRADE_QUOTE_DEBOUNCE_MS");
        config.trading.quote_debounce_ms = val;
    }

    if let Some(val) = env_parse::<u32>("TRADE_MAX_SLIPPAGE_BPS") {
        info!(val, "env override: TRADE_MAX_SLIPPAGE_BPS");
        config.trading.max_slippage_bps = val;
    }

    // -- Logging -------------------------------------------------------------
    if let Some(val) = env_string("TRADE_LOG_DIR") {
        info!("env override: TRADE_LOG_DIR");
        config.app.logging.log_dir = val;
    }
}

/// Read a non-empty env var as a `String`.
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Read a non-empty env var as a bool (`true`, `1`, `yes` → true).
fn env_bool(key: &str) -> Option<bool> {
    env_string(key).map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
}

/// Read a non-empty env var and parse it as `T`.
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}
