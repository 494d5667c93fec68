use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Numeric Constants
// ---------------------------------------------------------------------------

/// Default ERC-20 style token precision used when no decimals are supplied.
pub const DEFAULT_TOKEN_DECIMALS: u32 = 18;

/// Upper bound accepted for configured token decimals.
pub const MAX_TOKEN_DECIMALS: u32 = 36;

/// Basis-point denominator (100% = 10 000 bps).
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Fundraising progress at which the curve is considered graduated.
pub const PROGRESS_COMPLETE: Decimal = dec!(100);

/// Separator inserted between integer digit groups when formatting is enabled.
pub const THOUSANDS_SEPARATOR: char = ',';

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Minimum interval between two honoured exact-in/exact-out toggles.
pub const DEFAULT_MODE_TOGGLE_DEBOUNCE_MS: u64 = 300;

/// Input inactivity required before a quote refetch is released.
pub const DEFAULT_QUOTE_DEBOUNCE_MS: u64 = 300;

// ---------------------------------------------------------------------------
// Quick-select presets
// ---------------------------------------------------------------------------

pub const DEFAULT_QUICK_BUY_AMOUNTS: [&str; 4] = ["10", "50", "100", "500"];
pub const DEFAULT_QUICK_SELL_PERCENTAGES: [u32; 4] = [25, 50, 75, 100];

pub const DEFAULT_MAX_SLIPPAGE_BPS: u32 = 50;

// ---------------------------------------------------------------------------
// Button labels
// ---------------------------------------------------------------------------

pub const LABEL_PROCESSING_GRADUATION: &str = "Processing Graduation...";
pub const LABEL_COMPLETED: &str = "Completed";
pub const LABEL_REFRESHING_PRICE: &str = "Refreshing price data...";
pub const LABEL_CONNECT_WALLET: &str = "Connect Wallet";
pub const LABEL_CONFIRMING: &str = "Confirming...";
pub const LABEL_LOADING_BALANCE: &str = "Loading balance...";
pub const LABEL_INSUFFICIENT_BALANCE: &str = "Insufficient balance!";
pub const LABEL_EXCEEDS_ALLOCATION: &str = "Exceeds remaining allocation";
pub const LABEL_BUY: &str = "Buy";
pub const LABEL_SELL: &str = "Sell";

/// Hint shown under the amount field while nothing actionable is entered.
pub const HINT_ENTER_AMOUNT: &str = "Enter an amount to continue";
