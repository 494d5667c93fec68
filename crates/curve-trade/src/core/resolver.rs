//! Trade amount resolver. Reconciles the typed amount with mode, direction,
//! quick-select presets and the facts supplied by wallet and quote providers.
//!
//! Owns exactly one [`TradeIntent`]. Balances, quotes and caps are read-only
//! snapshots passed in per call; the resolver never stores them.
//!
//! Nothing here returns an error. An amount that cannot be resolved becomes
//! `""` and the button table disables the action.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::TradingConfig;
use crate::core::allocation::{check_allocation, AllocationCap, AllocationCheck};
use crate::core::button::{compute_button_state, ButtonContext};
use crate::core::debounce::QuoteDebouncer;
use crate::core::decimal::{compare_decimal_strings, is_positive, normalize};
use crate::core::instruction::{build_instruction, TradeInstruction};
use crate::types::{
    Asset, BalanceSnapshot, ButtonState, Quote, QuoteRequest, ScaledAmount, TradeDirection,
    TradeIntent, TradeMode, TradeSides, TxStatus,
};

// ---------------------------------------------------------------------------
// Pure helper functions
// ---------------------------------------------------------------------------

/// Assets behind the amount field and the computed counter-value.
///
/// | direction | mode     | input (typed) | output (quoted) |
/// |-----------|----------|---------------|-----------------|
/// | buy       | exactIn  | base          | token           |
/// | buy       | exactOut | token         | base            |
/// | sell      | exactIn  | token         | base            |
/// | sell      | exactOut | base          | token           |
pub fn resolve_sides(direction: TradeDirection, mode: TradeMode) -> TradeSides {
    let spend = direction.spend_asset();
    let receive = match spend {
        Asset::Base => Asset::Token,
        Asset::Token => Asset::Base,
    };
    match mode {
        TradeMode::ExactIn => TradeSides {
            input_asset: spend,
            output_asset: receive,
        },
        TradeMode::ExactOut => TradeSides {
            input_asset: receive,
            output_asset: spend,
        },
    }
}

/// `balance × percentage / 100`, floored at `decimals`.
///
/// Percentages above 100 are treated as 100 so the result never exceeds the
/// balance. Returns `""` when the balance is unreadable.
pub fn quick_percentage_amount(percentage: u32, balance: &str, decimals: u32) -> String {
    match ScaledAmount::parse(balance, decimals) {
        Some(balance) => balance
            .mul_ratio_floor(percentage.min(100), 100)
            .to_decimal_string(),
        None => String::new(),
    }
}

/// The "max" amount for the asset the user is typing, or `None` to leave the
/// field untouched (balance loading or zero).
///
/// The raw balance is returned even when it exceeds the allocation cap; the
/// cap blocks submission separately.
pub fn max_amount(
    direction: TradeDirection,
    mode: TradeMode,
    base_balance: &BalanceSnapshot,
    token_balance: &BalanceSnapshot,
    decimals: u32,
) -> Option<String> {
    let balance = match resolve_sides(direction, mode).input_asset {
        Asset::Base => base_balance,
        Asset::Token => token_balance,
    };
    let amount = balance.amount(decimals)?;
    if amount.is_zero() {
        return None;
    }
    Some(normalize(&amount.to_decimal_string(), Some(decimals)))
}

// ---------------------------------------------------------------------------
// External facts
// ---------------------------------------------------------------------------

/// Snapshot of everything the resolver reads but does not own.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    pub wallet_connected: bool,
    pub base_balance: BalanceSnapshot,
    pub token_balance: BalanceSnapshot,
    pub quote: Option<Quote>,
    pub quote_loading: bool,
    pub progress: rust_decimal::Decimal,
    pub is_finalizing: bool,
    pub allocation: Option<AllocationCap>,
    pub tx_status: TxStatus,
    pub tx_status_text: Option<String>,
}

// ---------------------------------------------------------------------------
// TradeAmountResolver
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct TradeAmountResolver {
    intent: TradeIntent,
    base_decimals: u32,
    token_decimals: u32,
    max_slippage_bps: u32,
    toggle_debounce: Duration,
    last_mode_toggle: Option<Instant>,
    quotes: QuoteDebouncer,
    quick_amounts: Vec<String>,
    quick_percentages: Vec<u32>,
}

impl TradeAmountResolver {
    pub fn new(config: &TradingConfig) -> Self {
        Self {
            intent: TradeIntent::default(),
            base_decimals: config.base_decimals,
            token_decimals: config.token_decimals,
            max_slippage_bps: config.max_slippage_bps,
            toggle_debounce: Duration::from_millis(config.mode_toggle_debounce_ms),
            last_mode_toggle: None,
            quotes: QuoteDebouncer::new(Duration::from_millis(config.quote_debounce_ms)),
            quick_amounts: config.quick_buy_amounts.clone(),
            quick_percentages: config.quick_sell_percentages.clone(),
        }
    }

    pub fn intent(&self) -> &TradeIntent {
        &self.intent
    }

    pub fn sides(&self) -> TradeSides {
        resolve_sides(self.intent.direction, self.intent.mode)
    }

    pub fn decimals_of(&self, asset: Asset) -> u32 {
        match asset {
            Asset::Base => self.base_decimals,
            Asset::Token => self.token_decimals,
        }
    }

    /// Precision of the asset currently typed into the amount field.
    pub fn input_decimals(&self) -> u32 {
        self.decimals_of(self.sides().input_asset)
    }

    // -----------------------------------------------------------------------
    // Amount updates
    // -----------------------------------------------------------------------

    /// Adopt a new amount from the field and schedule a quote refetch.
    pub fn set_amount(&mut self, amount: &str, now: Instant) -> &str {
        self.intent.amount = normalize(amount, Some(self.input_decimals()));
        if is_positive(&self.intent.amount) {
            self.quotes.schedule(
                QuoteRequest {
                    direction: self.intent.direction,
                    mode: self.intent.mode,
                    amount: self.intent.amount.clone(),
                },
                now,
            );
        } else {
            self.quotes.cancel();
        }
        &self.intent.amount
    }

    /// Whether `amount` is one of the configured quick-buy presets.
    /// `"10"` and `"10.0"` name the same preset.
    pub fn is_quick_amount(&self, amount: &str) -> bool {
        self.quick_amounts
            .iter()
            .any(|preset| compare_decimal_strings(preset, amount) == Some(Ordering::Equal))
    }

    pub fn is_quick_percentage(&self, percentage: u32) -> bool {
        self.quick_percentages.contains(&percentage)
    }

    /// Preset "quick buy" button: the literal preset becomes the amount.
    /// Amounts that are not configured presets leave the intent alone.
    pub fn resolve_quick_amount(&mut self, fixed_amount: &str, now: Instant) -> &str {
        if !self.is_quick_amount(fixed_amount) {
            warn!(preset = fixed_amount, "quick amount ignored: not a configured preset");
            return &self.intent.amount;
        }
        debug!(preset = fixed_amount, "quick amount selected");
        self.set_amount(fixed_amount, now)
    }

    /// Percentage-of-balance button. Ignored while the balance is loading or
    /// when the percentage is not a configured preset.
    pub fn resolve_quick_percentage(
        &mut self,
        percentage: u32,
        balance: &BalanceSnapshot,
        now: Instant,
    ) -> &str {
        if !self.is_quick_percentage(percentage) {
            warn!(percentage, "quick percentage ignored: not a configured preset");
            return &self.intent.amount;
        }
        if balance.is_loading {
            debug!(percentage, "quick percentage ignored: balance loading");
            return &self.intent.amount;
        }
        let amount =
            quick_percentage_amount(percentage, &balance.balance_formatted, self.input_decimals());
        self.set_amount(&amount, now)
    }

    /// "Max" button. Leaves the amount alone when the balance is loading or
    /// zero.
    pub fn resolve_max_amount(
        &mut self,
        base_balance: &BalanceSnapshot,
        token_balance: &BalanceSnapshot,
        now: Instant,
    ) -> &str {
        match max_amount(
            self.intent.direction,
            self.intent.mode,
            base_balance,
            token_balance,
            self.input_decimals(),
        ) {
            Some(amount) => self.set_amount(&amount, now),
            None => &self.intent.amount,
        }
    }

    // -----------------------------------------------------------------------
    // Toggles
    // -----------------------------------------------------------------------

    /// Flip exact-in/exact-out and clear the amount.
    ///
    /// Requests within the debounce window of the last honoured toggle are
    /// dropped. Returns whether the toggle took effect.
    pub fn toggle_mode(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_mode_toggle {
            if now.saturating_duration_since(last) < self.toggle_debounce {
                debug!(mode = self.intent.mode.as_str(), "mode toggle ignored: debounce");
                return false;
            }
        }
        self.last_mode_toggle = Some(now);
        self.intent.mode = self.intent.mode.toggled();
        self.clear_amount();
        debug!(mode = self.intent.mode.as_str(), "mode toggled");
        true
    }

    /// Flip buy/sell. Mode returns to exact-in and the amount is cleared.
    pub fn toggle_direction(&mut self) {
        self.intent.direction = self.intent.direction.toggled();
        self.intent.mode = TradeMode::ExactIn;
        self.clear_amount();
        debug!(direction = self.intent.direction.as_str(), "direction toggled");
    }

    /// Fold a submitter status into the intent. Only confirmation resets it.
    pub fn on_tx_status(&mut self, status: TxStatus) {
        if status == TxStatus::Confirmed {
            info!(
                direction = self.intent.direction.as_str(),
                amount = %self.intent.amount,
                "trade confirmed, clearing intent"
            );
            self.clear_amount();
        }
    }

    fn clear_amount(&mut self) {
        self.intent.amount.clear();
        self.quotes.cancel();
    }

    // -----------------------------------------------------------------------
    // Derived state
    // -----------------------------------------------------------------------

    /// Release the pending quote request once input has been quiet long
    /// enough.
    pub fn poll_quote(&mut self, now: Instant) -> Option<QuoteRequest> {
        self.quotes.poll(now)
    }

    pub fn has_pending_quote(&self) -> bool {
        self.quotes.is_pending()
    }

    /// Price data for the current amount is not settled yet: a refetch is
    /// waiting out the debounce or in flight, or an exact-out amount has no
    /// quote to tell what it costs.
    pub fn is_refreshing(&self, market: &MarketSnapshot) -> bool {
        let awaiting_exact_out_quote = self.intent.mode == TradeMode::ExactOut
            && is_positive(&self.intent.amount)
            && market.quote.is_none();
        market.quote_loading || self.has_pending_quote() || awaiting_exact_out_quote
    }

    /// Base asset this intent would spend, if known: the typed amount for
    /// buy/exact-in, the quoted requirement for buy/exact-out.
    pub fn required_base_spend(&self, quote: Option<&Quote>) -> Option<String> {
        match (self.intent.direction, self.intent.mode) {
            (TradeDirection::Buy, TradeMode::ExactIn) => {
                Some(self.intent.amount.clone()).filter(|a| !a.is_empty())
            }
            (TradeDirection::Buy, TradeMode::ExactOut) => quote.map(|q| q.counter_amount.clone()),
            (TradeDirection::Sell, _) => None,
        }
    }

    /// Compare this buy against the remaining allocation. Never edits the
    /// amount.
    pub fn check_allocation(&self, quote: Option<&Quote>, cap: &AllocationCap) -> AllocationCheck {
        match self.required_base_spend(quote) {
            Some(spend) => check_allocation(&spend, cap, self.base_decimals),
            None if self.intent.direction == TradeDirection::Sell => AllocationCheck::Within,
            None => AllocationCheck::Unknown,
        }
    }

    pub fn button_context(&self, market: &MarketSnapshot) -> ButtonContext {
        ButtonContext {
            progress: market.progress,
            is_finalizing: market.is_finalizing,
            is_refreshing: self.is_refreshing(market),
            wallet_connected: market.wallet_connected,
            tx_status: market.tx_status,
            tx_status_text: market.tx_status_text.clone(),
            direction: self.intent.direction,
            mode: self.intent.mode,
            amount: self.intent.amount.clone(),
            computed_amount: market.quote.as_ref().map(|q| q.counter_amount.clone()),
            base_balance: market.base_balance.clone(),
            token_balance: market.token_balance.clone(),
            base_decimals: self.base_decimals,
            token_decimals: self.token_decimals,
            allocation: market.allocation.clone(),
        }
    }

    pub fn button_state(&self, market: &MarketSnapshot) -> ButtonState {
        compute_button_state(&self.button_context(market))
    }

    /// Instruction for the transaction submitter, only when the button would
    /// trade right now.
    pub fn submittable_instruction(&self, market: &MarketSnapshot) -> Option<TradeInstruction> {
        if !market.wallet_connected || self.button_state(market).disabled {
            return None;
        }
        let quote = market.quote.as_ref()?;
        let sides = self.sides();
        build_instruction(
            &self.intent,
            quote,
            self.max_slippage_bps,
            self.decimals_of(sides.input_asset),
            self.decimals_of(sides.output_asset),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instruction::SlippageBound;
    use rust_decimal_macros::dec;

    fn resolver() -> TradeAmountResolver {
        TradeAmountResolver::new(&TradingConfig::default())
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Let the quote debounce run out so the button sees settled input.
    fn settle(r: &mut TradeAmountResolver, now: Instant) {
        r.poll_quote(now + ms(1_000));
    }

    #[test]
    fn test_resolve_sides_table() {
        use Asset::{Base, Token};
        let cases = [
            (TradeDirection::Buy, TradeMode::ExactIn, Base, Token),
            (TradeDirection::Buy, TradeMode::ExactOut, Token, Base),
            (TradeDirection::Sell, TradeMode::ExactIn, Token, Base),
            (TradeDirection::Sell, TradeMode::ExactOut, Base, Token),
        ];
        for (direction, mode, input, output) in cases {
            let sides = resolve_sides(direction, mode);
            assert_eq!(sides.input_asset, input, "{direction:?}/{mode:?}");
            assert_eq!(sides.output_asset, output, "{direction:?}/{mode:?}");
        }
    }

    #[test]
    fn test_quick_percentage_exact_half() {
        assert_eq!(quick_percentage_amount(50, "1000.25", 18), "500.125");
    }

    #[test]
    fn test_quick_percentage_floors() {
        // 1/3 of the smallest unit floors to zero, never rounds up.
        assert_eq!(quick_percentage_amount(33, "0.000000000000000001", 18), "0");
        assert_eq!(quick_percentage_amount(25, "0.000001", 6), "0");
        assert_eq!(quick_percentage_amount(75, "10", 0), "7");
    }

    #[test]
    fn test_quick_percentage_never_exceeds_balance() {
        assert_eq!(quick_percentage_amount(150, "42.5", 18), "42.5");
        assert_eq!(quick_percentage_amount(25, "oops", 18), "");
    }

    #[test]
    fn test_max_amount_picks_typed_asset() {
        let base = BalanceSnapshot::loaded("12.5");
        let token = BalanceSnapshot::loaded("9000");
        let pick = |d, m| max_amount(d, m, &base, &token, 18);
        assert_eq!(pick(TradeDirection::Buy, TradeMode::ExactIn), Some("12.5".into()));
        assert_eq!(pick(TradeDirection::Sell, TradeMode::ExactOut), Some("12.5".into()));
        assert_eq!(pick(TradeDirection::Buy, TradeMode::ExactOut), Some("9000".into()));
        assert_eq!(pick(TradeDirection::Sell, TradeMode::ExactIn), Some("9000".into()));
    }

    #[test]
    fn test_max_amount_leaves_field_for_zero_or_loading() {
        let zero = BalanceSnapshot::loaded("0");
        let loading = BalanceSnapshot::loading();
        assert_eq!(max_amount(TradeDirection::Buy, TradeMode::ExactIn, &zero, &zero, 18), None);
        assert_eq!(
            max_amount(TradeDirection::Buy, TradeMode::ExactIn, &loading, &zero, 18),
            None
        );
    }

    #[test]
    fn test_resolver_max_keeps_previous_amount_on_zero_balance() {
        let now = Instant::now();
        let mut r = resolver();
        r.set_amount("3", now);
        let zero = BalanceSnapshot::loaded("0");
        assert_eq!(r.resolve_max_amount(&zero, &zero, now), "3");
    }

    #[test]
    fn test_quick_amount_ignores_mode() {
        let now = Instant::now();
        let mut r = resolver();
        assert!(r.toggle_mode(now));
        assert_eq!(r.resolve_quick_amount("100", now), "100");
        assert_eq!(r.intent().mode, TradeMode::ExactOut);
    }

    #[test]
    fn test_quick_percentage_on_resolver() {
        let now = Instant::now();
        let mut r = resolver();
        r.toggle_direction();
        let balance = BalanceSnapshot::loaded("1000.25");
        assert_eq!(r.resolve_quick_percentage(50, &balance, now), "500.125");

        // Loading balance leaves the amount as it was.
        assert_eq!(
            r.resolve_quick_percentage(25, &BalanceSnapshot::loading(), now),
            "500.125"
        );
    }

    #[test]
    fn test_toggle_mode_clears_and_debounces() {
        let start = Instant::now();
        let mut r = resolver();
        r.set_amount("5", start);

        assert!(r.toggle_mode(start));
        assert_eq!(r.intent().mode, TradeMode::ExactOut);
        assert!(r.intent().is_empty());
        assert!(!r.has_pending_quote());

        // A double-click inside the window is dropped outright.
        assert!(!r.toggle_mode(start + ms(120)));
        assert_eq!(r.intent().mode, TradeMode::ExactOut);

        assert!(r.toggle_mode(start + ms(300)));
        assert_eq!(r.intent().mode, TradeMode::ExactIn);
    }

    #[test]
    fn test_toggle_direction_resets_mode() {
        let now = Instant::now();
        let mut r = resolver();
        r.toggle_mode(now);
        r.set_amount("7", now);
        r.toggle_direction();
        assert_eq!(r.intent().direction, TradeDirection::Sell);
        assert_eq!(r.intent().mode, TradeMode::ExactIn);
        assert!(r.intent().is_empty());
    }

    #[test]
    fn test_only_confirmation_clears_intent() {
        let now = Instant::now();
        let mut r = resolver();
        r.set_amount("2.5", now);
        for status in [TxStatus::Preparing, TxStatus::Confirming, TxStatus::Failed, TxStatus::Cancelled] {
            r.on_tx_status(status);
            assert_eq!(r.intent().amount, "2.5", "{status:?}");
        }
        r.on_tx_status(TxStatus::Confirmed);
        assert!(r.intent().is_empty());
    }

    #[test]
    fn test_set_amount_debounces_quote() {
        let start = Instant::now();
        let mut r = resolver();
        r.set_amount("1", start);
        r.set_amount("12", start + ms(100));
        assert_eq!(r.poll_quote(start + ms(300)), None);
        let released = r.poll_quote(start + ms(400)).expect("quote after quiet period");
        assert_eq!(released.amount, "12");

        // Clearing the field cancels instead of requesting a quote for "".
        r.set_amount("3", start + ms(500));
        r.set_amount("", start + ms(550));
        assert_eq!(r.poll_quote(start + ms(2_000)), None);
    }

    #[test]
    fn test_unresolvable_amount_becomes_no_intent() {
        let now = Instant::now();
        let mut r = resolver();
        assert_eq!(r.set_amount("12abc", now), "");
    }

    #[test]
    fn test_allocation_blocks_exact_out_buy_without_clamping() {
        let now = Instant::now();
        let mut r = resolver();
        r.toggle_mode(now);
        r.set_amount("2000", now);
        settle(&mut r, now);
        let quote = Quote {
            counter_amount: "60".into(),
            exchange_rate: None,
        };
        let cap = AllocationCap {
            remaining: "50".into(),
        };
        assert!(r.check_allocation(Some(&quote), &cap).is_blocked());
        assert_eq!(r.intent().amount, "2000");

        let market = MarketSnapshot {
            wallet_connected: true,
            base_balance: BalanceSnapshot::loaded("500"),
            token_balance: BalanceSnapshot::loaded("0"),
            quote: Some(quote),
            allocation: Some(cap),
            ..Default::default()
        };
        let state = r.button_state(&market);
        assert!(state.disabled);
        assert_eq!(state.text, "Exceeds remaining allocation");
        assert!(r.submittable_instruction(&market).is_none());
    }

    #[test]
    fn test_allocation_unknown_without_quote() {
        let now = Instant::now();
        let mut r = resolver();
        r.toggle_mode(now);
        r.set_amount("10", now);
        let cap = AllocationCap {
            remaining: "50".into(),
        };
        assert_eq!(r.check_allocation(None, &cap), AllocationCheck::Unknown);
    }

    #[test]
    fn test_insufficient_balance_scenario() {
        let now = Instant::now();
        let mut r = resolver();
        r.set_amount("100", now);
        settle(&mut r, now);
        let market = MarketSnapshot {
            wallet_connected: true,
            base_balance: BalanceSnapshot::loaded("99.999999"),
            token_balance: BalanceSnapshot::loaded("0"),
            ..Default::default()
        };
        let state = r.button_state(&market);
        assert!(state.disabled);
        assert_eq!(state.text, "Insufficient balance!");
    }

    #[test]
    fn test_submittable_instruction_exact_in_buy() {
        let now = Instant::now();
        let mut r = resolver();
        r.set_amount("10", now);
        settle(&mut r, now);
        let market = MarketSnapshot {
            wallet_connected: true,
            base_balance: BalanceSnapshot::loaded("100"),
            token_balance: BalanceSnapshot::loaded("0"),
            quote: Some(Quote {
                counter_amount: "2000".into(),
                exchange_rate: Some(dec!(200)),
            }),
            progress: dec!(40),
            ..Default::default()
        };
        let instruction = r.submittable_instruction(&market).expect("tradeable");
        assert_eq!(instruction.amount.to_string(), "10");
        // Default 50 bps slippage on the quoted output.
        assert_eq!(
            instruction.bound,
            SlippageBound::MinOutput(ScaledAmount::parse("1990", 18).unwrap())
        );
    }

    #[test]
    fn test_button_refreshing_while_quote_debounces() {
        let now = Instant::now();
        let mut r = resolver();
        r.toggle_mode(now);
        r.set_amount("2000", now);
        let market = MarketSnapshot {
            wallet_connected: true,
            base_balance: BalanceSnapshot::loaded("1"),
            token_balance: BalanceSnapshot::loaded("0"),
            allocation: Some(AllocationCap {
                remaining: "50".into(),
            }),
            ..Default::default()
        };

        // Refetch still waiting out the quiet period.
        let state = r.button_state(&market);
        assert!(state.disabled);
        assert_eq!(state.text, "Refreshing price data...");
        assert!(r.submittable_instruction(&market).is_none());

        // Released but unanswered: still no price for an exact-out amount.
        assert!(r.poll_quote(now + ms(300)).is_some());
        assert!(!r.has_pending_quote());
        let state = r.button_state(&market);
        assert!(state.disabled);
        assert_eq!(state.text, "Refreshing price data...");
    }

    #[test]
    fn test_exact_in_without_quote_is_not_refreshing_once_settled() {
        let now = Instant::now();
        let mut r = resolver();
        r.set_amount("5", now);
        assert!(r.is_refreshing(&MarketSnapshot::default()));
        settle(&mut r, now);
        assert!(!r.is_refreshing(&MarketSnapshot::default()));
    }

    #[test]
    fn test_unconfigured_presets_are_ignored() {
        let now = Instant::now();
        let mut r = resolver();
        assert!(r.is_quick_amount("50.0"));
        assert!(!r.is_quick_amount("42"));
        assert_eq!(r.resolve_quick_amount("42", now), "");
        assert!(!r.has_pending_quote());

        r.toggle_direction();
        let balance = BalanceSnapshot::loaded("1000");
        assert_eq!(r.resolve_quick_percentage(33, &balance, now), "");
        assert_eq!(r.resolve_quick_percentage(75, &balance, now), "750");
    }

    #[test]
    fn test_custom_presets_from_config() {
        let now = Instant::now();
        let mut r = TradeAmountResolver::new(&TradingConfig {
            quick_buy_amounts: vec!["0.25".into()],
            quick_sell_percentages: vec![10],
            ..TradingConfig::default()
        });
        assert_eq!(r.resolve_quick_amount("10", now), "");
        assert_eq!(r.resolve_quick_amount("0.25", now), "0.25");
        assert!(r.is_quick_percentage(10));
        assert!(!r.is_quick_percentage(50));
    }
}
