use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amount::ScaledAmount;

/// Which side of the trade the user is typing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TradeMode {
    /// The amount field is what the user pays.
    #[default]
    ExactIn,
    /// The amount field is what the user receives.
    ExactOut,
}

impl TradeMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::ExactIn => Self::ExactOut,
            Self::ExactOut => Self::ExactIn,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactIn => "exactIn",
            Self::ExactOut => "exactOut",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    /// Pay base asset, receive curve token.
    #[default]
    Buy,
    /// Pay curve token, receive base asset.
    Sell,
}

impl TradeDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }

    /// The asset this direction spends.
    pub fn spend_asset(&self) -> Asset {
        match self {
            Self::Buy => Asset::Base,
            Self::Sell => Asset::Token,
        }
    }
}

/// The two assets on a bonding curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    /// Reserve asset the curve is priced in.
    Base,
    /// Token issued by the curve.
    Token,
}

/// Assets behind the amount field (`input_asset`) and the computed
/// counter-value (`output_asset`) for one direction/mode pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeSides {
    pub input_asset: Asset,
    pub output_asset: Asset,
}

/// The user's current trade, as typed.
///
/// `amount` is a canonical decimal string; `""` means no intent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub mode: TradeMode,
    pub direction: TradeDirection,
    pub amount: String,
}

impl TradeIntent {
    pub fn is_empty(&self) -> bool {
        self.amount.is_empty()
    }
}

/// Balance as reported by the wallet provider.
///
/// A loading balance is unknown, never zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub balance_formatted: String,
    pub is_loading: bool,
}

impl BalanceSnapshot {
    pub fn loaded(balance: impl Into<String>) -> Self {
        Self {
            balance_formatted: balance.into(),
            is_loading: false,
        }
    }

    pub fn loading() -> Self {
        Self {
            balance_formatted: String::new(),
            is_loading: true,
        }
    }

    /// Scaled balance. `None` while loading; malformed text counts as zero.
    pub fn amount(&self, decimals: u32) -> Option<ScaledAmount> {
        if self.is_loading {
            return None;
        }
        Some(
            ScaledAmount::parse(&self.balance_formatted, decimals)
                .unwrap_or_else(|| ScaledAmount::zero(decimals)),
        )
    }
}

/// Counter-value computed by the quote provider for the current intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Amount of the output asset (exact-in) or required input (exact-out).
    pub counter_amount: String,
    /// Output units per input unit, for display only.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub exchange_rate: Option<Decimal>,
}

/// Request released to the quote provider once input settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub direction: TradeDirection,
    pub mode: TradeMode,
    pub amount: String,
}
