use thiserror::Error;

/// Typed errors for the fallible edges of the crate.
///
/// The amount-normalization and trade-resolution core never returns these:
/// it reports failure through sentinels (`None`, empty strings, disabled
/// button states). Configuration goes through `anyhow`, so only scenario
/// replay produces a `TradeError`.
#[derive(Error, Debug)]
pub enum TradeError {
    // -- Replay -------------------------------------------------------------
    #[error("scenario error: {reason}")]
    Scenario { reason: String },

    #[error("scenario step {step} rejected: {reason}")]
    InvalidStep { step: usize, reason: String },

    // -- Forwarded errors ---------------------------------------------------
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
