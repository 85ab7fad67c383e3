pub mod error;
pub mod messages;

pub use error::{Result, WireError};
pub use messages::{decode_trade, encode_candle, CandleMessage, TradeMessage};
