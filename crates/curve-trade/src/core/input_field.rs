//! Live decimal text field: the keystroke state machine over
//! [`crate::core::decimal`].
//!
//! ```text
//!   Idle ──focus / first keystroke──▶ Editing
//!   Idle ◀──────────blur───────────── Editing
//! ```
//!
//! `Idle` shows the bound value owner's value. `Editing` shows the buffered
//! keystroke text. Every change the owner should hear about comes back as a
//! [`FieldChange`], including where the caret belongs after reformatting.

use num_bigint::BigUint;
use rust_decimal::Decimal;
use tracing::debug;

use crate::constants::DEFAULT_TOKEN_DECIMALS;
use crate::core::decimal::{
    canonicalize_on_blur, format_with_thousands_separator, fractional_len, is_valid_decimal_token,
    normalize, normalize_decimal, remap_cursor_position, remove_thousands_separators,
    to_scaled_integer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputOptions {
    /// Fractional digits accepted from the keyboard. `None` = no limit.
    pub max_decimals: Option<u32>,
    /// Scale used for the integer value handed to the owner.
    pub token_decimals: u32,
    pub thousands_separator: bool,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            max_decimals: Some(DEFAULT_TOKEN_DECIMALS),
            token_decimals: DEFAULT_TOKEN_DECIMALS,
            thousands_separator: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    Idle,
    Editing,
}

/// Transient display state owned by one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub raw_user_input: Option<String>,
    pub is_user_editing: bool,
    pub cursor_position: Option<usize>,
}

/// What the bound value owner receives after an accepted edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// Canonical string, `None` when the field is empty.
    pub value: Option<String>,
    /// `value × 10^token_decimals`, `None` when not convertible.
    pub scaled: Option<BigUint>,
    pub display: String,
    /// Caret index the UI should apply to `display`.
    pub cursor: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeystrokeOutcome {
    Accepted(FieldChange),
    /// Keystroke ignored; the previous display stays.
    Rejected,
}

#[derive(Debug, Clone)]
pub struct DecimalInput {
    options: InputOptions,
    display: DisplayState,
    external: String,
    generation: u64,
}

impl DecimalInput {
    pub fn new(options: InputOptions) -> Self {
        Self {
            options,
            display: DisplayState::default(),
            external: String::new(),
            generation: 0,
        }
    }

    pub fn options(&self) -> InputOptions {
        self.options
    }

    /// Switch precision, e.g. when the typed asset changes with the mode.
    pub fn set_options(&mut self, options: InputOptions) {
        self.options = options;
    }

    pub fn mode(&self) -> FieldMode {
        if self.display.is_user_editing {
            FieldMode::Editing
        } else {
            FieldMode::Idle
        }
    }

    pub fn display_state(&self) -> &DisplayState {
        &self.display
    }

    /// Bumped whenever stale buffered text is discarded by an external reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn external_value(&self) -> &str {
        &self.external
    }

    /// Text the field shows right now.
    pub fn display_text(&self) -> String {
        match (&self.display.raw_user_input, self.display.is_user_editing) {
            (Some(raw), true) => raw.clone(),
            _ => self.format(&self.external),
        }
    }

    pub fn focus(&mut self) {
        if self.display.is_user_editing {
            return;
        }
        self.display.is_user_editing = true;
        self.display.raw_user_input = Some(self.format(&self.external));
        self.display.cursor_position = None;
    }

    /// Process the field's full text after a keystroke, with the caret where
    /// the keystroke left it.
    pub fn handle_input(&mut self, text: &str, cursor: usize) -> KeystrokeOutcome {
        self.focus();

        let stripped = if self.options.thousands_separator {
            remove_thousands_separators(text)
        } else {
            text.to_string()
        };
        if !is_valid_decimal_token(&stripped) {
            debug!(text, "keystroke rejected: not a decimal");
            return KeystrokeOutcome::Rejected;
        }
        if let Some(max) = self.options.max_decimals {
            if fractional_len(&stripped) > max as usize {
                debug!(text, max_decimals = max, "keystroke rejected: too many decimals");
                return KeystrokeOutcome::Rejected;
            }
        }

        let canonical = normalize(&stripped, self.options.max_decimals);
        let display = self.format(&canonical);
        let caret = if cursor >= text.chars().count() {
            display.chars().count()
        } else {
            remap_cursor_position(text, &display, cursor)
        };

        self.display.raw_user_input = Some(display.clone());
        self.display.cursor_position = Some(caret);
        KeystrokeOutcome::Accepted(self.change(canonical, display, Some(caret)))
    }

    /// Leave `Editing`. Returns a change only when settling the text altered
    /// the value (`"0."` → `"0"`, `"12."` → `"12"`).
    pub fn blur(&mut self) -> Option<FieldChange> {
        if !self.display.is_user_editing {
            return None;
        }
        let buffered = self
            .display
            .raw_user_input
            .take()
            .map(|raw| normalize(&remove_thousands_separators(&raw), self.options.max_decimals))
            .unwrap_or_default();
        self.display = DisplayState::default();

        let settled = canonicalize_on_blur(&buffered);
        if settled == buffered {
            return None;
        }
        let display = self.format(&settled);
        Some(self.change(settled, display, None))
    }

    /// Adopt the owner's value. A drop from non-empty to empty while idle
    /// clears any buffered text and bumps the generation.
    pub fn set_external_value(&mut self, value: Option<&str>) {
        let next = value
            .map(|v| normalize(v, self.options.max_decimals))
            .unwrap_or_default();

        if !self.display.is_user_editing && !self.external.is_empty() && next.is_empty() {
            self.generation += 1;
            self.display = DisplayState::default();
            debug!(generation = self.generation, "field reset by owner");
        }
        self.external = next;
    }

    /// Owner-forced clear, e.g. after a mode toggle or a confirmed trade.
    /// Unlike [`Self::set_external_value`] this also discards text buffered
    /// while editing; focus is kept.
    pub fn reset(&mut self) {
        let buffered = self
            .display
            .raw_user_input
            .as_deref()
            .is_some_and(|raw| !raw.is_empty());
        if buffered || !self.external.is_empty() {
            self.generation += 1;
            debug!(generation = self.generation, "field cleared by owner");
        }
        self.external.clear();
        self.display = if self.display.is_user_editing {
            DisplayState {
                raw_user_input: Some(String::new()),
                is_user_editing: true,
                cursor_position: Some(0),
            }
        } else {
            DisplayState::default()
        };
    }

    /// Adopt a numeric value from the owner.
    pub fn set_external_number(&mut self, value: Decimal) {
        let normalized = normalize_decimal(value, self.options.max_decimals);
        self.set_external_value(Some(&normalized));
    }

    /// Integer form of the value currently shown.
    pub fn scaled_value(&self) -> Option<BigUint> {
        let shown = remove_thousands_separators(&self.display_text());
        to_scaled_integer(&shown, self.options.token_decimals)
    }

    fn format(&self, canonical: &str) -> String {
        format_with_thousands_separator(canonical, self.options.thousands_separator)
    }

    fn change(&self, canonical: String, display: String, cursor: Option<usize>) -> FieldChange {
        let scaled = to_scaled_integer(&canonical, self.options.token_decimals);
        FieldChange {
            value: Some(canonical).filter(|c| !c.is_empty()),
            scaled,
            display,
            cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn field() -> DecimalInput {
        DecimalInput::new(InputOptions::default())
    }

    fn grouped() -> DecimalInput {
        DecimalInput::new(InputOptions {
            thousands_separator: true,
            ..InputOptions::default()
        })
    }

    fn accepted(outcome: KeystrokeOutcome) -> FieldChange {
        match outcome {
            KeystrokeOutcome::Accepted(change) => change,
            KeystrokeOutcome::Rejected => panic!("keystroke unexpectedly rejected"),
        }
    }

    #[test]
    fn test_typing_zero_point_five() {
        let mut f = field();
        let values: Vec<_> = ["0", "0.", "0.5"]
            .iter()
            .map(|text| accepted(f.handle_input(text, text.len())))
            .collect();
        assert_eq!(values[0].value.as_deref(), Some("0"));
        assert_eq!(values[1].value.as_deref(), Some("0."));
        assert_eq!(values[2].value.as_deref(), Some("0.5"));
        assert_eq!(
            values[2].scaled,
            Some(BigUint::from(500_000_000_000_000_000u64))
        );
    }

    #[test]
    fn test_first_keystroke_enters_editing() {
        let mut f = field();
        assert_eq!(f.mode(), FieldMode::Idle);
        f.handle_input("7", 1);
        assert_eq!(f.mode(), FieldMode::Editing);
        f.blur();
        assert_eq!(f.mode(), FieldMode::Idle);
    }

    #[test]
    fn test_rejected_keystrokes_keep_display() {
        let mut f = field();
        f.handle_input("1.5", 3);
        for bad in ["1.5.", "1.5a", "-1.5", "1 5"] {
            assert_eq!(f.handle_input(bad, bad.len()), KeystrokeOutcome::Rejected);
            assert_eq!(f.display_text(), "1.5");
        }
    }

    #[test]
    fn test_rejects_excess_decimals() {
        let mut f = DecimalInput::new(InputOptions {
            max_decimals: Some(2),
            ..InputOptions::default()
        });
        accepted(f.handle_input("1.25", 4));
        assert_eq!(f.handle_input("1.255", 5), KeystrokeOutcome::Rejected);
        assert_eq!(f.display_text(), "1.25");
    }

    #[test]
    fn test_lone_point_becomes_zero_point() {
        let mut f = field();
        let change = accepted(f.handle_input(".", 1));
        assert_eq!(change.value.as_deref(), Some("0."));
        assert_eq!(change.display, "0.");
        assert_eq!(change.cursor, Some(2));
    }

    #[test]
    fn test_clearing_reports_no_value() {
        let mut f = field();
        f.handle_input("4", 1);
        let change = accepted(f.handle_input("", 0));
        assert_eq!(change.value, None);
        assert_eq!(change.scaled, None);
    }

    #[test]
    fn test_blur_settles_trailing_point() {
        let mut f = field();
        f.handle_input("0.", 2);
        let change = f.blur().expect("blur changes 0.");
        assert_eq!(change.value.as_deref(), Some("0"));

        f.handle_input("12.", 3);
        assert_eq!(f.blur().and_then(|c| c.value).as_deref(), Some("12"));

        f.handle_input("12.5", 4);
        assert_eq!(f.blur(), None);
    }

    #[test]
    fn test_thousands_separator_display_and_caret() {
        let mut f = grouped();
        accepted(f.handle_input("1234", 4));
        assert_eq!(f.display_text(), "1,234");

        // Insert '5' after the leading '1' of "1,234": caret stays after it.
        let change = accepted(f.handle_input("15,234", 2));
        assert_eq!(change.display, "15,234");
        assert_eq!(change.value.as_deref(), Some("15234"));
        assert_eq!(change.cursor, Some(2));
    }

    #[test]
    fn test_separator_fraction_untouched() {
        let mut f = grouped();
        let change = accepted(f.handle_input("1234567.891", 11));
        assert_eq!(change.display, "1,234,567.891");
        assert_eq!(change.cursor, Some(13));
    }

    #[test]
    fn test_external_reset_while_idle_bumps_generation() {
        let mut f = field();
        f.set_external_value(Some("25"));
        assert_eq!(f.display_text(), "25");
        f.set_external_value(None);
        assert_eq!(f.generation(), 1);
        assert_eq!(f.display_text(), "");
    }

    #[test]
    fn test_external_reset_ignored_while_editing() {
        let mut f = field();
        f.set_external_value(Some("25"));
        f.handle_input("255", 3);
        f.set_external_value(Some(""));
        assert_eq!(f.generation(), 0);
        assert_eq!(f.display_text(), "255");
    }

    #[test]
    fn test_owner_reset_clears_buffer_while_editing() {
        let mut f = field();
        f.handle_input("25", 2);
        f.reset();
        assert_eq!(f.mode(), FieldMode::Editing);
        assert_eq!(f.display_text(), "");
        assert_eq!(f.generation(), 1);
        assert_eq!(f.scaled_value(), None);

        // Typing continues from the cleared buffer.
        let change = accepted(f.handle_input("3", 1));
        assert_eq!(change.value.as_deref(), Some("3"));
    }

    #[test]
    fn test_owner_reset_of_empty_field_keeps_generation() {
        let mut f = field();
        f.reset();
        assert_eq!(f.generation(), 0);
        assert_eq!(f.mode(), FieldMode::Idle);
    }

    #[test]
    fn test_external_number() {
        let mut f = field();
        f.set_external_number(dec!(1.500));
        assert_eq!(f.external_value(), "1.5");
        assert_eq!(f.scaled_value(), Some(BigUint::from(1_500_000_000_000_000_000u64)));
    }

    #[test]
    fn test_focus_buffers_external_value() {
        let mut f = grouped();
        f.set_external_value(Some("9876"));
        f.focus();
        assert_eq!(f.display_state().raw_user_input.as_deref(), Some("9,876"));
    }
}
