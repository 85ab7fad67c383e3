use std::collections::BTreeMap;

use candles_core::{Candle, LateTrade, Trade};
use chrono::{DateTime, Duration, FixedOffset};
use tracing::debug;

use crate::accumulator::WindowAccumulator;
use crate::interval::interval_label;
use crate::window::{window_end, window_start};

/// Window lifecycle and watermark policy for one symbol.
///
/// Owns every open accumulator for the symbol, tracks the watermark, and
/// classifies incoming trades as on-time or late. The store is the exclusive
/// owner of its accumulators; nothing holds a reference into `open_windows`
/// from outside.
pub struct WindowStore {
    symbol: String,
    window_length: Duration,
    watermark_delay: Duration,
    interval: String,
    /// Open windows keyed by window start (epoch milliseconds). BTreeMap
    /// iteration yields windows in ascending open_time, which gives the
    /// emission-order guarantee without a separate sort.
    open_windows: BTreeMap<i64, WindowAccumulator>,
    /// Trades timestamped before this instant are late. Monotonically
    /// non-decreasing once set.
    watermark: Option<DateTime<FixedOffset>>,
}

impl WindowStore {
    pub fn new(
        symbol: impl Into<String>,
        window_length: Duration,
        watermark_delay: Duration,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval_label(window_length),
            window_length,
            watermark_delay,
            open_windows: BTreeMap::new(),
            watermark: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn watermark(&self) -> Option<DateTime<FixedOffset>> {
        self.watermark
    }

    pub fn open_window_count(&self) -> usize {
        self.open_windows.len()
    }

    /// Route one trade into its window.
    ///
    /// Returns the late record when the trade falls behind the watermark;
    /// late trades never touch an accumulator and the store performs no
    /// retroactive correction of already-emitted candles.
    pub fn add(&mut self, trade: Trade) -> Option<LateTrade> {
        let start = window_start(trade.timestamp, self.window_length);

        if let Some(watermark) = self.watermark {
            if trade.timestamp < watermark {
                debug!(
                    symbol = %self.symbol,
                    timestamp = %trade.timestamp,
                    watermark = %watermark,
                    "Late trade rejected"
                );
                let window_end = window_end(start, self.window_length);
                return Some(LateTrade {
                    trade,
                    window_start: start,
                    window_end,
                });
            }
        }

        let end = window_end(start, self.window_length);
        self.open_windows
            .entry(start.timestamp_millis())
            .or_insert_with(|| WindowAccumulator::new(start, end))
            .add(&trade);

        None
    }

    /// Advance the watermark to `reference - watermark_delay` and close every
    /// window that ended behind it.
    ///
    /// A candidate at or behind the current watermark is a silent no-op
    /// returning no candles; the watermark never regresses. Returned candles
    /// are in ascending open_time order. Empty windows are evicted without
    /// producing a candle.
    pub fn advance_watermark(&mut self, reference: DateTime<FixedOffset>) -> Vec<Candle> {
        let candidate = reference - self.watermark_delay;
        if let Some(current) = self.watermark {
            if candidate <= current {
                return Vec::new();
            }
        }
        self.watermark = Some(candidate);

        // Collect eligible keys first, then evict; keys come back in
        // ascending order from the BTreeMap.
        let expired: Vec<i64> = self
            .open_windows
            .iter()
            .filter(|(_, acc)| acc.close_time() < candidate)
            .map(|(start_ms, _)| *start_ms)
            .collect();

        let mut candles = Vec::new();
        for start_ms in expired {
            if let Some(acc) = self.open_windows.remove(&start_ms) {
                if !acc.is_empty() {
                    candles.push(acc.finalize(&self.symbol, &self.interval));
                }
            }
        }

        if !candles.is_empty() {
            debug!(
                symbol = %self.symbol,
                count = candles.len(),
                watermark = %candidate,
                "Closed windows behind watermark"
            );
        }

        candles
    }

    /// Force-finalize every remaining open window regardless of watermark.
    ///
    /// Empty windows are dropped, the map is cleared, and the watermark is
    /// left unchanged. Intended for stream-end draining.
    pub fn flush(&mut self) -> Vec<Candle> {
        let open_windows = std::mem::take(&mut self.open_windows);
        open_windows
            .into_values()
            .filter(|acc| !acc.is_empty())
            .map(|acc| acc.finalize(&self.symbol, &self.interval))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn trade(price: f64, quantity: f64, when: &str) -> Trade {
        Trade::new("BTCUSDT", price, quantity, ts(when))
    }

    fn minute_store() -> WindowStore {
        WindowStore::new("BTCUSDT", Duration::minutes(1), Duration::seconds(5))
    }

    #[test]
    fn test_on_time_trade_is_accepted() {
        let mut store = minute_store();
        assert!(store.add(trade(50_000.0, 0.1, "2026-01-26T10:00:10Z")).is_none());
        assert_eq!(store.open_window_count(), 1);
    }

    #[test]
    fn test_late_trade_is_classified_and_ignored() {
        let mut store = minute_store();
        // Watermark becomes 10:02:01.
        store.add(trade(50_000.0, 0.1, "2026-01-26T10:02:06Z"));
        store.advance_watermark(ts("2026-01-26T10:02:06Z"));
        assert_eq!(store.watermark(), Some(ts("2026-01-26T10:02:01Z")));

        let windows_before = store.open_window_count();
        let late = store.add(trade(49_000.0, 0.5, "2026-01-26T10:01:30Z"));

        let late = late.expect("trade behind watermark must be late");
        assert_eq!(late.trade.price, 49_000.0);
        assert_eq!(late.window_start, ts("2026-01-26T10:01:00Z"));
        assert_eq!(late.window_end, ts("2026-01-26T10:01:59.999Z"));
        // No accumulator was created or mutated.
        assert_eq!(store.open_window_count(), windows_before);
    }

    #[test]
    fn test_trade_at_watermark_is_not_late() {
        let mut store = minute_store();
        store.advance_watermark(ts("2026-01-26T10:02:06Z"));

        // Exactly at the watermark: accepted.
        let at_mark = trade(50_000.0, 0.1, "2026-01-26T10:02:01Z");
        assert!(store.add(at_mark).is_none());
    }

    #[test]
    fn test_watermark_never_regresses() {
        let mut store = minute_store();
        store.advance_watermark(ts("2026-01-26T10:02:06Z"));
        let watermark = store.watermark();

        // Earlier reference: no-op, no candles, watermark unchanged.
        assert!(store.advance_watermark(ts("2026-01-26T10:01:00Z")).is_empty());
        assert!(store.advance_watermark(ts("2026-01-26T10:02:06Z")).is_empty());
        assert_eq!(store.watermark(), watermark);
    }

    #[test]
    fn test_advance_closes_eligible_windows_in_order() {
        let mut store = minute_store();
        // One trade per minute, added out of order.
        store.add(trade(50_200.0, 0.3, "2026-01-26T10:02:30Z"));
        store.add(trade(50_000.0, 0.1, "2026-01-26T10:00:30Z"));
        store.add(trade(50_100.0, 0.2, "2026-01-26T10:01:30Z"));

        let candles = store.advance_watermark(ts("2026-01-26T10:03:06Z"));
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0].open_time, ts("2026-01-26T10:00:00Z"));
        assert_eq!(candles[1].open_time, ts("2026-01-26T10:01:00Z"));
        assert_eq!(candles[2].open_time, ts("2026-01-26T10:02:00Z"));
        assert_eq!(store.open_window_count(), 0);
    }

    #[test]
    fn test_window_straddling_watermark_stays_open() {
        let mut store = minute_store();
        store.add(trade(50_000.0, 0.1, "2026-01-26T10:00:30Z"));
        store.add(trade(50_100.0, 0.1, "2026-01-26T10:01:02Z"));

        // Watermark 10:00:58: the 10:00 window (ends 10:00:59.999) is not
        // yet eligible.
        let candles = store.advance_watermark(ts("2026-01-26T10:01:03Z"));
        assert!(candles.is_empty());
        assert_eq!(store.open_window_count(), 2);
    }

    #[test]
    fn test_interval_label_applied_to_candles() {
        let mut store = WindowStore::new("BTCUSDT", Duration::minutes(5), Duration::seconds(5));
        store.add(trade(50_000.0, 0.1, "2026-01-26T10:03:20Z"));

        let candles = store.flush();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].interval, "5m");
        assert_eq!(candles[0].open_time, ts("2026-01-26T10:00:00Z"));
    }

    #[test]
    fn test_flush_drains_all_windows_sorted() {
        let mut store = minute_store();
        store.add(trade(50_100.0, 0.2, "2026-01-26T10:05:30Z"));
        store.add(trade(50_000.0, 0.1, "2026-01-26T10:00:30Z"));
        let watermark_before = store.watermark();

        let candles = store.flush();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open_time, ts("2026-01-26T10:00:00Z"));
        assert_eq!(candles[1].open_time, ts("2026-01-26T10:05:00Z"));
        assert_eq!(store.open_window_count(), 0);
        assert_eq!(store.watermark(), watermark_before);

        // Nothing left to flush.
        assert!(store.flush().is_empty());
    }
}
