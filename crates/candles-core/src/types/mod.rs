mod candle;
mod trade;

pub use candle::{Candle, LateTrade};
pub use trade::Trade;
