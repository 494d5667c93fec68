pub mod amount;
pub mod status;
pub mod trade;

pub use amount::ScaledAmount;
pub use status::{ButtonState, TxStatus};
pub use trade::{
    Asset, BalanceSnapshot, Quote, QuoteRequest, TradeDirection, TradeIntent, TradeMode,
    TradeSides,
};
