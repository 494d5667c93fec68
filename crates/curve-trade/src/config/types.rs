use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_SLIPPAGE_BPS, DEFAULT_MODE_TOGGLE_DEBOUNCE_MS, DEFAULT_QUICK_BUY_AMOUNTS,
    DEFAULT_QUICK_SELL_PERCENTAGES, DEFAULT_QUOTE_DEBOUNCE_MS, DEFAULT_TOKEN_DECIMALS,
};

// ---------------------------------------------------------------------------
// Top-level aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeConfig {
    pub app: AppConfig,
    pub trading: TradingConfig,
}

// ---------------------------------------------------------------------------
// app.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: String,
    /// File name prefix; the rotation suffix is appended to it.
    pub file_name: String,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub default_filter: String,
    pub rotation: LogRotation,
    /// Mirror events to stderr in compact form.
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".into(),
            file_name: "trade.log".into(),
            default_filter: "curve_trade=info,warn".into(),
            rotation: LogRotation::Daily,
            stderr: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    /// One file for the life of the log directory.
    Never,
}

// ---------------------------------------------------------------------------
// trading.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    /// Precision of the reserve asset the curve is priced in.
    pub base_decimals: u32,
    /// Precision of the curve token.
    pub token_decimals: u32,
    /// Fractional digits accepted in the amount field. Never more than the
    /// typed asset's own decimals; `None` = that limit alone.
    pub max_input_decimals: Option<u32>,
    pub thousands_separator: bool,
    /// Presets offered by the quick-amount buttons. Anything else is ignored.
    pub quick_buy_amounts: Vec<String>,
    /// Presets offered by the percentage-of-balance buttons.
    pub quick_sell_percentages: Vec<u32>,
    pub mode_toggle_debounce_ms: u64,
    pub quote_debounce_ms: u64,
    pub max_slippage_bps: u32,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            base_decimals: DEFAULT_TOKEN_DECIMALS,
            token_decimals: DEFAULT_TOKEN_DECIMALS,
            max_input_decimals: None,
            thousands_separator: false,
            quick_buy_amounts: DEFAULT_QUICK_BUY_AMOUNTS.iter().map(|a| a.to_string()).collect(),
            quick_sell_percentages: DEFAULT_QUICK_SELL_PERCENTAGES.to_vec(),
            mode_toggle_debounce_ms: DEFAULT_MODE_TOGGLE_DEBOUNCE_MS,
            quote_debounce_ms: DEFAULT_QUOTE_DEBOUNCE_MS,
            max_slippage_bps: DEFAULT_MAX_SLIPPAGE_BPS,
        }
    }
}
