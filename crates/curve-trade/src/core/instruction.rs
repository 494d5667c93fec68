//! Slippage-bounded trade instruction handed to the transaction submitter.

use serde::Serialize;
use tracing::debug;

use crate::constants::BPS_DENOMINATOR;
use crate::types::{Quote, ScaledAmount, TradeDirection, TradeIntent, TradeMode};

/// Worst acceptable fill for the side the user did not fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "amount", rename_all = "camelCase")]
pub enum SlippageBound {
    /// Exact-in: receive at least this much output.
    MinOutput(ScaledAmount),
    /// Exact-out: pay at most this much input.
    MaxInput(ScaledAmount),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeInstruction {
    pub direction: TradeDirection,
    pub mode: TradeMode,
    /// The fixed side, exactly as typed.
    pub amount: ScaledAmount,
    pub bound: SlippageBound,
}

/// Build the on-chain instruction for an intent and its quote.
///
/// `amount_decimals` is the precision of the typed asset, `quote_decimals`
/// that of the quoted counter-value. Returns `None` when either side is not a
/// positive, convertible amount.
pub fn build_instruction(
    intent: &TradeIntent,
    quote: &Quote,
    slippage_bps: u32,
    amount_decimals: u32,
    quote_decimals: u32,
) -> Option<TradeInstruction> {
    let amount = ScaledAmount::parse(&intent.amount, amount_decimals).filter(|a| !a.is_zero())?;
    let quoted = ScaledAmount::parse(&quote.counter_amount, quote_decimals).filter(|q| !q.is_zero());
    let Some(quoted) = quoted else {
        debug!(counter = %quote.counter_amount, "quote not usable for an instruction");
        return None;
    };

    let bound = match intent.mode {
        TradeMode::ExactIn => SlippageBound::MinOutput(
            quoted.mul_ratio_floor(BPS_DENOMINATOR.saturating_sub(slippage_bps), BPS_DENOMINATOR),
        ),
        TradeMode::ExactOut => SlippageBound::MaxInput(
            quoted.mul_ratio_ceil(BPS_DENOMINATOR.saturating_add(slippage_bps), BPS_DENOMINATOR),
        ),
    };

    Some(TradeInstruction {
        direction: intent.direction,
        mode: intent.mode,
        amount,
        bound,
    })
}
