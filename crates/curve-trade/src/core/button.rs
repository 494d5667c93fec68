//! Trade button decision table.
//!
//! Rules are evaluated top to bottom and the first match wins:
//!
//! 1. graduated and finalizing → "Processing Graduation..." (spinner)
//! 2. graduated → "Completed"
//! 3. quote refreshing → "Refreshing price data..."
//! 4. wallet disconnected → "Connect Wallet" (enabled, connects)
//! 5. transaction pending → "Confirming..." or the submitter's status text
//! 6. no positive amount → "Buy" / "Sell" (disabled)
//! 7. spend balance still loading → "Loading balance..."
//! 8. spend balance short → "Insufficient balance!"
//! 9. buy spend above remaining allocation → "Exceeds remaining allocation"
//! 10. otherwise → "Buy" / "Sell" (enabled)
//!
//! All amount comparisons go through [`ScaledAmount`], never floats.

use rust_decimal::Decimal;

use crate::constants::{
    HINT_ENTER_AMOUNT, LABEL_BUY, LABEL_COMPLETED, LABEL_CONFIRMING, LABEL_CONNECT_WALLET,
    LABEL_EXCEEDS_ALLOCATION, LABEL_INSUFFICIENT_BALANCE, LABEL_LOADING_BALANCE,
    LABEL_PROCESSING_GRADUATION, LABEL_REFRESHING_PRICE, LABEL_SELL, PROGRESS_COMPLETE,
};
use crate::core::allocation::{check_allocation, AllocationCap};
use crate::core::decimal::is_positive;
use crate::core::resolver::resolve_sides;
use crate::types::{
    Asset, BalanceSnapshot, ButtonState, ScaledAmount, TradeDirection, TradeMode, TxStatus,
};

/// Everything the decision table looks at, snapshotted by the caller.
#[derive(Debug, Clone)]
pub struct ButtonContext {
    pub progress: Decimal,
    pub is_finalizing: bool,
    pub is_refreshing: bool,
    pub wallet_connected: bool,
    pub tx_status: TxStatus,
    /// Optional submitter-provided label shown while a transaction is pending.
    pub tx_status_text: Option<String>,
    pub direction: TradeDirection,
    pub mode: TradeMode,
    /// Canonical amount typed into the field.
    pub amount: String,
    /// Quote counter-value; the required spend in exact-out mode.
    pub computed_amount: Option<String>,
    pub base_balance: BalanceSnapshot,
    pub token_balance: BalanceSnapshot,
    pub base_decimals: u32,
    pub token_decimals: u32,
    pub allocation: Option<AllocationCap>,
}

impl Default for ButtonContext {
    fn default() -> Self {
        Self {
            progress: Decimal::ZERO,
            is_finalizing: false,
            is_refreshing: false,
            wallet_connected: false,
            tx_status: TxStatus::Idle,
            tx_status_text: None,
            direction: TradeDirection::Buy,
            mode: TradeMode::ExactIn,
            amount: String::new(),
            computed_amount: None,
            base_balance: BalanceSnapshot::loading(),
            token_balance: BalanceSnapshot::loading(),
            base_decimals: crate::constants::DEFAULT_TOKEN_DECIMALS,
            token_decimals: crate::constants::DEFAULT_TOKEN_DECIMALS,
            allocation: None,
        }
    }
}

impl ButtonContext {
    fn decimals_of(&self, asset: Asset) -> u32 {
        match asset {
            Asset::Base => self.base_decimals,
            Asset::Token => self.token_decimals,
        }
    }

    fn balance_of(&self, asset: Asset) -> &BalanceSnapshot {
        match asset {
            Asset::Base => &self.base_balance,
            Asset::Token => &self.token_balance,
        }
    }

    /// What the trade will take out of the wallet, in the spend asset.
    ///
    /// Exact-in spends the typed amount; exact-out spends whatever the quote
    /// says is required. `None` until that figure is known.
    fn required_spend(&self) -> Option<ScaledAmount> {
        let spend_asset = self.direction.spend_asset();
        let decimals = self.decimals_of(spend_asset);
        match self.mode {
            TradeMode::ExactIn => ScaledAmount::parse(&self.amount, decimals),
            TradeMode::ExactOut => self
                .computed_amount
                .as_deref()
                .and_then(|computed| ScaledAmount::parse(computed, decimals)),
        }
    }

    fn action_label(&self) -> &'static str {
        match self.direction {
            TradeDirection::Buy => LABEL_BUY,
            TradeDirection::Sell => LABEL_SELL,
        }
    }
}

pub fn compute_button_state(ctx: &ButtonContext) -> ButtonState {
    let graduated = ctx.progress >= PROGRESS_COMPLETE;

    // 1–2. Curve already filled.
    if graduated && ctx.is_finalizing {
        return ButtonState::busy(LABEL_PROCESSING_GRADUATION);
    }
    if graduated {
        return ButtonState::disabled(LABEL_COMPLETED);
    }

    // 3. Quote data in flight.
    if ctx.is_refreshing {
        return ButtonState::disabled(LABEL_REFRESHING_PRICE);
    }

    // 4. Clicking connects rather than trades.
    if !ctx.wallet_connected {
        return ButtonState::enabled(LABEL_CONNECT_WALLET);
    }

    // 5. Submitter busy.
    if ctx.tx_status.is_pending() {
        let text = ctx.tx_status_text.as_deref().unwrap_or(LABEL_CONFIRMING);
        return ButtonState::busy(text);
    }

    // 6. Nothing to trade.
    let entered_decimals = ctx.decimals_of(resolve_sides(ctx.direction, ctx.mode).input_asset);
    let has_amount = ScaledAmount::parse(&ctx.amount, entered_decimals).is_some_and(|a| !a.is_zero());
    if !has_amount {
        return ButtonState::disabled(ctx.action_label());
    }

    // 7–8. Balance of the asset being spent.
    let spend_asset = ctx.direction.spend_asset();
    let Some(balance) = ctx.balance_of(spend_asset).amount(ctx.decimals_of(spend_asset)) else {
        return ButtonState::disabled(LABEL_LOADING_BALANCE);
    };
    let required = ctx.required_spend();
    let short = balance.is_zero() || required.as_ref().is_some_and(|r| balance < *r);
    if short {
        return ButtonState::disabled(LABEL_INSUFFICIENT_BALANCE);
    }

    // 9. Graduation cap on buys.
    if ctx.direction == TradeDirection::Buy {
        if let (Some(cap), Some(required)) = (&ctx.allocation, &required) {
            let check = check_allocation(
                &required.to_decimal_string(),
                cap,
                ctx.decimals_of(Asset::Base),
            );
            if check.is_blocked() {
                return ButtonState::disabled(LABEL_EXCEEDS_ALLOCATION);
            }
        }
    }

    ButtonState::enabled(ctx.action_label())
}

/// Hint under the amount field while no positive amount is entered.
pub fn input_hint(amount: &str) -> Option<&'static str> {
    if is_positive(amount) {
        None
    } else {
        Some(HINT_ENTER_AMOUNT)
    }
}
