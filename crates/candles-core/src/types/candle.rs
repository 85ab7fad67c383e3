use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::Trade;

/// Finalized OHLCV record for one symbol and one window.
///
/// Produced exactly once per non-empty finalized window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Market symbol, e.g. "BTCUSDT"
    pub symbol: String,
    /// Window length label, e.g. "1m", "5m"
    pub interval: String,
    /// Window start
    pub open_time: DateTime<FixedOffset>,
    /// Window end (start + length - 1ms)
    pub close_time: DateTime<FixedOffset>,
    /// Price of the earliest trade in the window
    pub open: f64,
    /// Highest traded price
    pub high: f64,
    /// Lowest traded price
    pub low: f64,
    /// Price of the latest trade in the window
    pub close: f64,
    /// Total traded quantity
    pub volume: f64,
    /// Number of trades folded in
    pub trade_count: u64,
}

/// A trade that arrived behind the watermark, together with the window it
/// would have belonged to.
///
/// Late trades never mutate window state; they are reported through this
/// record so the consumer can log, discard, or dead-letter them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LateTrade {
    /// The rejected trade
    pub trade: Trade,
    /// Start of the window the trade would have landed in
    pub window_start: DateTime<FixedOffset>,
    /// End of that window
    pub window_end: DateTime<FixedOffset>,
}
