use candles_core::{Candle, Trade};
use chrono::{DateTime, FixedOffset};

/// OHLCV accumulator scoped to exactly one window instance.
///
/// Folds an unordered sequence of trades belonging to this window. Open and
/// close follow the earliest and latest trade timestamps, not arrival order,
/// so out-of-order delivery inside the window does not skew the candle. On
/// an exact earliest/latest timestamp tie the first trade applied keeps
/// open/close.
#[derive(Debug, Clone)]
pub struct WindowAccumulator {
    open_time: DateTime<FixedOffset>,
    close_time: DateTime<FixedOffset>,
    open: Option<f64>,
    high: f64,
    low: f64,
    close: Option<f64>,
    volume: f64,
    trade_count: u64,
    earliest_ts: Option<DateTime<FixedOffset>>,
    latest_ts: Option<DateTime<FixedOffset>>,
}

impl WindowAccumulator {
    pub fn new(open_time: DateTime<FixedOffset>, close_time: DateTime<FixedOffset>) -> Self {
        Self {
            open_time,
            close_time,
            open: None,
            high: f64::NEG_INFINITY,
            low: f64::INFINITY,
            close: None,
            volume: 0.0,
            trade_count: 0,
            earliest_ts: None,
            latest_ts: None,
        }
    }

    pub fn open_time(&self) -> DateTime<FixedOffset> {
        self.open_time
    }

    pub fn close_time(&self) -> DateTime<FixedOffset> {
        self.close_time
    }

    /// Fold one trade in. The caller guarantees the trade belongs to this
    /// window; there is no membership check here.
    pub fn add(&mut self, trade: &Trade) {
        let ts = trade.timestamp;

        // Strictly earlier timestamps take over the open; equal ones don't.
        if self.earliest_ts.map_or(true, |first| ts < first) {
            self.earliest_ts = Some(ts);
            self.open = Some(trade.price);
        }

        // Symmetric rule for the close with strictly later timestamps.
        if self.latest_ts.map_or(true, |last| ts > last) {
            self.latest_ts = Some(ts);
            self.close = Some(trade.price);
        }

        self.high = self.high.max(trade.price);
        self.low = self.low.min(trade.price);
        self.volume += trade.quantity;
        self.trade_count += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.trade_count == 0
    }

    /// Build the finalized candle.
    ///
    /// Unset open/close and untouched high/low sentinels collapse to 0.0.
    /// That branch is only reachable for empty windows, which the store
    /// never finalizes into visible candles.
    pub fn finalize(&self, symbol: &str, interval: &str) -> Candle {
        Candle {
            symbol: symbol.to_string(),
            interval: interval.to_string(),
            open_time: self.open_time,
            close_time: self.close_time,
            open: self.open.unwrap_or(0.0),
            high: if self.high.is_finite() { self.high } else { 0.0 },
            low: if self.low.is_finite() { self.low } else { 0.0 },
            close: self.close.unwrap_or(0.0),
            volume: self.volume,
            trade_count: self.trade_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn minute_acc() -> WindowAccumulator {
        let start = ts("2026-01-26T10:30:00Z");
        WindowAccumulator::new(start, start + Duration::minutes(1) - Duration::milliseconds(1))
    }

    fn trade(price: f64, quantity: f64, when: &str) -> Trade {
        Trade::new("BTCUSDT", price, quantity, ts(when))
    }

    #[test]
    fn test_single_trade() {
        let mut acc = minute_acc();
        acc.add(&trade(50_000.0, 0.1, "2026-01-26T10:30:15Z"));

        let candle = acc.finalize("BTCUSDT", "1m");
        assert_eq!(candle.open, 50_000.0);
        assert_eq!(candle.high, 50_000.0);
        assert_eq!(candle.low, 50_000.0);
        assert_eq!(candle.close, 50_000.0);
        assert_eq!(candle.volume, 0.1);
        assert_eq!(candle.trade_count, 1);
    }

    #[test]
    fn test_multiple_trades_ohlcv() {
        let mut acc = minute_acc();
        acc.add(&trade(50_000.0, 0.1, "2026-01-26T10:30:10Z"));
        acc.add(&trade(50_200.0, 0.2, "2026-01-26T10:30:20Z"));
        acc.add(&trade(49_800.0, 0.3, "2026-01-26T10:30:30Z"));
        acc.add(&trade(50_100.0, 0.4, "2026-01-26T10:30:50Z"));

        let candle = acc.finalize("BTCUSDT", "1m");
        assert_eq!(candle.open, 50_000.0);
        assert_eq!(candle.high, 50_200.0);
        assert_eq!(candle.low, 49_800.0);
        assert_eq!(candle.close, 50_100.0);
        assert!((candle.volume - 1.0).abs() < 1e-9);
        assert_eq!(candle.trade_count, 4);
    }

    #[test]
    fn test_out_of_order_trades() {
        let mut acc = minute_acc();
        // Arrival order: middle, first, last.
        acc.add(&trade(49_800.0, 0.1, "2026-01-26T10:30:30Z"));
        acc.add(&trade(50_000.0, 0.2, "2026-01-26T10:30:10Z"));
        acc.add(&trade(50_100.0, 0.3, "2026-01-26T10:30:50Z"));

        let candle = acc.finalize("BTCUSDT", "1m");
        assert_eq!(candle.open, 50_000.0);
        assert_eq!(candle.close, 50_100.0);
    }

    #[test]
    fn test_equal_timestamp_first_applied_wins() {
        let mut acc = minute_acc();
        acc.add(&trade(50_000.0, 0.1, "2026-01-26T10:30:10Z"));
        acc.add(&trade(49_900.0, 0.1, "2026-01-26T10:30:10Z"));

        let candle = acc.finalize("BTCUSDT", "1m");
        // Same timestamp: the first trade keeps both open and close.
        assert_eq!(candle.open, 50_000.0);
        assert_eq!(candle.close, 50_000.0);
        assert_eq!(candle.low, 49_900.0);
        assert_eq!(candle.trade_count, 2);
    }

    #[test]
    fn test_is_empty() {
        let mut acc = minute_acc();
        assert!(acc.is_empty());
        acc.add(&trade(50_000.0, 0.1, "2026-01-26T10:30:15Z"));
        assert!(!acc.is_empty());
    }

    #[test]
    fn test_empty_finalize_defaults_to_zero() {
        let candle = minute_acc().finalize("BTCUSDT", "1m");
        assert_eq!(candle.open, 0.0);
        assert_eq!(candle.high, 0.0);
        assert_eq!(candle.low, 0.0);
        assert_eq!(candle.close, 0.0);
        assert_eq!(candle.volume, 0.0);
        assert_eq!(candle.trade_count, 0);
    }
}
