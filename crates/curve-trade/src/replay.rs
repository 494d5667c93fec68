//! Scripted trading session.
//!
//! A [`Scenario`] is a JSON list of UI and provider events. [`Session`] wires
//! one [`DecimalInput`] to one [`TradeAmountResolver`] the way a trading
//! widget would, applies each event and reports the resulting field, intent
//! and button state.

use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::TradingConfig;
use crate::core::allocation::{progress_percent, AllocationCap, AllocationCheck};
use crate::core::button::input_hint;
use crate::core::input_field::{DecimalInput, FieldChange, FieldMode, InputOptions, KeystrokeOutcome};
use crate::core::instruction::TradeInstruction;
use crate::core::resolver::{MarketSnapshot, TradeAmountResolver};
use crate::errors::TradeError;
use crate::types::{
    Asset, BalanceSnapshot, ButtonState, Quote, QuoteRequest, TradeDirection, TradeIntent, TxStatus,
};

// ---------------------------------------------------------------------------
// Scenario file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScenarioStep {
    Focus,
    /// Full field text after a keystroke. Caret defaults to the end.
    Type {
        text: String,
        #[serde(default)]
        cursor: Option<usize>,
    },
    Blur,
    ExternalValue {
        value: Option<String>,
    },
    QuickAmount {
        amount: String,
    },
    QuickPercentage {
        percentage: u32,
    },
    Max,
    ToggleMode,
    ToggleDirection,
    /// `None` marks a balance as still loading.
    Balances {
        base: Option<String>,
        token: Option<String>,
    },
    /// `None` clears the quote.
    Quote {
        counter_amount: Option<String>,
        #[serde(default)]
        exchange_rate: Option<String>,
    },
    Wallet {
        connected: bool,
    },
    Progress {
        raised: String,
        target: String,
        #[serde(default)]
        finalizing: bool,
    },
    TxStatus {
        status: TxStatus,
        #[serde(default)]
        text: Option<String>,
    },
    Advance {
        ms: u64,
    },
}

impl ScenarioStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Type { .. } => "type",
            Self::Blur => "blur",
            Self::ExternalValue { .. } => "external_value",
            Self::QuickAmount { .. } => "quick_amount",
            Self::QuickPercentage { .. } => "quick_percentage",
            Self::Max => "max",
            Self::ToggleMode => "toggle_mode",
            Self::ToggleDirection => "toggle_direction",
            Self::Balances { .. } => "balances",
            Self::Quote { .. } => "quote",
            Self::Wallet { .. } => "wallet",
            Self::Progress { .. } => "progress",
            Self::TxStatus { .. } => "tx_status",
            Self::Advance { .. } => "advance",
        }
    }
}

pub fn load_scenario(path: &Path) -> Result<Scenario, TradeError> {
    let contents = std::fs::read_to_string(path)?;
    parse_scenario(&contents)
}

pub fn parse_scenario(contents: &str) -> Result<Scenario, TradeError> {
    let scenario: Scenario = serde_json::from_str(contents)?;
    if scenario.steps.is_empty() {
        return Err(TradeError::Scenario {
            reason: format!("scenario {:?} has no steps", scenario.name),
        });
    }
    Ok(scenario)
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub event: &'static str,
    pub elapsed_ms: u64,
    /// Keystroke dropped by the field.
    pub rejected: bool,
    /// Toggle dropped by the debounce window.
    pub ignored: bool,
    pub display: String,
    pub cursor: Option<usize>,
    pub editing: bool,
    pub generation: u64,
    pub scaled: Option<String>,
    pub intent: TradeIntent,
    pub button: ButtonState,
    pub hint: Option<&'static str>,
    pub allocation: Option<AllocationCheck>,
    pub quote_request: Option<QuoteRequest>,
    pub instruction: Option<TradeInstruction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub scenario: String,
    pub steps: Vec<StepReport>,
    pub final_intent: TradeIntent,
    pub final_button: ButtonState,
    pub quote_requests: usize,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Session {
    config: TradingConfig,
    field: DecimalInput,
    resolver: TradeAmountResolver,
    market: MarketSnapshot,
    started: Instant,
    now: Instant,
    quote_requests: usize,
}

impl Session {
    pub fn new(config: &TradingConfig) -> Self {
        let resolver = TradeAmountResolver::new(config);
        let field = DecimalInput::new(input_options(config, &resolver));
        let started = Instant::now();
        Self {
            config: config.clone(),
            field,
            resolver,
            market: MarketSnapshot {
                base_balance: BalanceSnapshot::loading(),
                token_balance: BalanceSnapshot::loading(),
                ..MarketSnapshot::default()
            },
            started,
            now: started,
            quote_requests: 0,
        }
    }

    pub fn resolver(&self) -> &TradeAmountResolver {
        &self.resolver
    }

    pub fn field(&self) -> &DecimalInput {
        &self.field
    }

    pub fn market(&self) -> &MarketSnapshot {
        &self.market
    }

    pub fn run(&mut self, scenario: &Scenario) -> Result<ReplaySummary, TradeError> {
        info!(scenario = %scenario.name, steps = scenario.steps.len(), "replaying scenario");
        let steps = scenario
            .steps
            .iter()
            .enumerate()
            .map(|(idx, step)| self.apply(idx, step))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ReplaySummary {
            scenario: scenario.name.clone(),
            steps,
            final_intent: self.resolver.intent().clone(),
            final_button: self.resolver.button_state(&self.market),
            quote_requests: self.quote_requests,
        })
    }

    /// Apply one event and report the state that follows it.
    pub fn apply(&mut self, idx: usize, step: &ScenarioStep) -> Result<StepReport, TradeError> {
        let mut rejected = false;
        let mut ignored = false;
        let mut cursor = None;

        match step {
            ScenarioStep::Focus => self.field.focus(),
            ScenarioStep::Type { text, cursor: caret } => {
                let len = text.chars().count();
                let caret = caret.unwrap_or(len);
                if caret > len {
                    return Err(TradeError::InvalidStep {
                        step: idx,
                        reason: format!("cursor {caret} beyond text of length {len}"),
                    });
                }
                match self.field.handle_input(text, caret) {
                    KeystrokeOutcome::Accepted(change) => {
                        cursor = change.cursor;
                        self.adopt_field_change(change);
                    }
                    KeystrokeOutcome::Rejected => rejected = true,
                }
            }
            ScenarioStep::Blur => {
                if let Some(change) = self.field.blur() {
                    self.adopt_field_change(change);
                }
            }
            ScenarioStep::ExternalValue { value } => {
                self.resolver.set_amount(value.as_deref().unwrap_or(""), self.now);
                self.after_amount_change();
            }
            ScenarioStep::QuickAmount { amount } => {
                if !self.resolver.is_quick_amount(amount) {
                    return Err(TradeError::InvalidStep {
                        step: idx,
                        reason: format!("quick amount {amount:?} is not a configured preset"),
                    });
                }
                self.resolver.resolve_quick_amount(amount, self.now);
                self.after_amount_change();
            }
            ScenarioStep::QuickPercentage { percentage } => {
                if !self.resolver.is_quick_percentage(*percentage) {
                    return Err(TradeError::InvalidStep {
                        step: idx,
                        reason: format!("percentage {percentage} is not a configured preset"),
                    });
                }
                let balance = match self.resolver.sides().input_asset {
                    Asset::Base => self.market.base_balance.clone(),
                    Asset::Token => self.market.token_balance.clone(),
                };
                self.resolver
                    .resolve_quick_percentage(*percentage, &balance, self.now);
                self.after_amount_change();
            }
            ScenarioStep::Max => {
                self.resolver.resolve_max_amount(
                    &self.market.base_balance,
                    &self.market.token_balance,
                    self.now,
                );
                self.after_amount_change();
            }
            ScenarioStep::ToggleMode => {
                ignored = !self.resolver.toggle_mode(self.now);
                if !ignored {
                    self.after_side_change();
                }
            }
            ScenarioStep::ToggleDirection => {
                self.resolver.toggle_direction();
                self.after_side_change();
            }
            ScenarioStep::Balances { base, token } => {
                self.market.base_balance = snapshot(base);
                self.market.token_balance = snapshot(token);
            }
            ScenarioStep::Quote {
                counter_amount,
                exchange_rate,
            } => {
                self.market.quote_loading = false;
                self.market.quote = counter_amount.as_ref().map(|counter| Quote {
                    counter_amount: counter.clone(),
                    exchange_rate: exchange_rate.as_deref().and_then(|r| r.parse().ok()),
                });
            }
            ScenarioStep::Wallet { connected } => self.market.wallet_connected = *connected,
            ScenarioStep::Progress {
                raised,
                target,
                finalizing,
            } => {
                let decimals = self.config.base_decimals;
                self.market.progress = progress_percent(raised, target, decimals);
                self.market.allocation = Some(AllocationCap::from_progress(target, raised, decimals));
                self.market.is_finalizing = *finalizing;
            }
            ScenarioStep::TxStatus { status, text } => {
                self.market.tx_status = *status;
                self.market.tx_status_text = text.clone();
                self.resolver.on_tx_status(*status);
                if *status == TxStatus::Confirmed {
                    self.market.quote = None;
                    self.field.reset();
                }
            }
            ScenarioStep::Advance { ms } => self.now += Duration::from_millis(*ms),
        }

        let quote_request = self.resolver.poll_quote(self.now);
        if let Some(request) = &quote_request {
            debug!(amount = %request.amount, "quote request released");
            self.quote_requests += 1;
            self.market.quote_loading = true;
        }

        Ok(self.report(idx, step, rejected, ignored, cursor, quote_request))
    }

    fn adopt_field_change(&mut self, change: FieldChange) {
        self.resolver
            .set_amount(change.value.as_deref().unwrap_or(""), self.now);
        self.after_amount_change();
    }

    /// A new amount invalidates the quote for the old one.
    fn after_amount_change(&mut self) {
        self.market.quote = None;
        self.market.quote_loading = false;
        self.sync_field();
    }

    /// Mode or direction changed: the typed asset and its precision may
    /// have changed too, and the cleared amount must leave the field even
    /// mid-edit.
    fn after_side_change(&mut self) {
        self.field
            .set_options(input_options(&self.config, &self.resolver));
        self.market.quote = None;
        self.market.quote_loading = false;
        self.field.reset();
    }

    fn sync_field(&mut self) {
        let amount = self.resolver.intent().amount.clone();
        self.field.set_external_value(Some(&amount));
    }

    fn report(
        &self,
        idx: usize,
        step: &ScenarioStep,
        rejected: bool,
        ignored: bool,
        cursor: Option<usize>,
        quote_request: Option<QuoteRequest>,
    ) -> StepReport {
        let intent = self.resolver.intent().clone();
        let allocation = match (&self.market.allocation, intent.direction) {
            (Some(cap), TradeDirection::Buy) => {
                Some(self.resolver.check_allocation(self.market.quote.as_ref(), cap))
            }
            _ => None,
        };
        StepReport {
            step: idx,
            event: step.name(),
            elapsed_ms: self.now.duration_since(self.started).as_millis() as u64,
            rejected,
            ignored,
            display: self.field.display_text(),
            cursor,
            editing: self.field.mode() == FieldMode::Editing,
            generation: self.field.generation(),
            scaled: self.field.scaled_value().map(|v| v.to_string()),
            hint: input_hint(&intent.amount),
            button: self.resolver.button_state(&self.market),
            instruction: self.resolver.submittable_instruction(&self.market),
            allocation,
            quote_request,
            intent,
        }
    }
}

/// Field options for the asset currently typed. Keystrokes never carry more
/// fractional digits than that asset has.
fn input_options(config: &TradingConfig, resolver: &TradeAmountResolver) -> InputOptions {
    let decimals = resolver.input_decimals();
    InputOptions {
        max_decimals: Some(config.max_input_decimals.map_or(decimals, |max| max.min(decimals))),
        token_decimals: decimals,
        thousands_separator: config.thousands_separator,
    }
}

fn snapshot(balance: &Option<String>) -> BalanceSnapshot {
    match balance {
        Some(value) => BalanceSnapshot::loaded(value.clone()),
        None => BalanceSnapshot::loading(),
    }
}
