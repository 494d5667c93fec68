use serde::{Deserialize, Serialize};

/// Status reported back by the transaction submitter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    #[default]
    Idle,
    Preparing,
    Confirming,
    Confirmed,
    Failed,
    Cancelled,
}

impl TxStatus {
    /// A transaction is being built or is waiting on the chain.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Preparing | Self::Confirming)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Preparing => "preparing",
            Self::Confirming => "confirming",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Rendered state of the trade button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonState {
    pub text: String,
    pub disabled: bool,
    pub show_spinner: bool,
}

impl ButtonState {
    pub fn enabled(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            disabled: false,
            show_spinner: false,
        }
    }

    pub fn disabled(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            disabled: true,
            show_spinner: false,
        }
    }

    pub fn busy(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            disabled: true,
            show_spinner: true,
        }
    }
}
