use std::collections::HashMap;

use candles_core::{EngineConfig, Trade};
use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::sink::CandleSink;
use crate::store::WindowStore;

/// Multiplexes trades across per-symbol window stores and dispatches
/// finalized candles and late trades to the sink.
///
/// Stores are created lazily on first sight of a symbol and live for the
/// lifetime of the router; there is no eviction of idle symbols, so with
/// unbounded key cardinality the embedder must bound the universe of
/// symbols it feeds in.
pub struct StreamRouter<S: CandleSink> {
    config: EngineConfig,
    stores: HashMap<String, WindowStore>,
    sink: S,
}

impl<S: CandleSink> StreamRouter<S> {
    pub fn new(config: EngineConfig, sink: S) -> Self {
        Self {
            config,
            stores: HashMap::new(),
            sink,
        }
    }

    pub fn symbol_count(&self) -> usize {
        self.stores.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Process one trade end to end.
    ///
    /// Routes the trade to its symbol's store; a late trade goes to the
    /// sink's late hook and never advances the watermark in the same call.
    /// Otherwise the store's watermark advances with the trade's own
    /// timestamp and every candle it closed is dispatched in order.
    pub fn process(&mut self, trade: Trade) {
        let reference = trade.timestamp;
        let store = self.store_for(&trade.symbol);

        if let Some(late) = store.add(trade) {
            self.sink.on_late(late);
            return;
        }

        let candles = store.advance_watermark(reference);
        for candle in candles {
            self.sink.on_candle(candle);
        }
    }

    /// Advance the watermark of every known store against an external
    /// reference clock, dispatching all resulting candles.
    pub fn advance_watermark(&mut self, reference: DateTime<FixedOffset>) {
        for store in self.stores.values_mut() {
            for candle in store.advance_watermark(reference) {
                self.sink.on_candle(candle);
            }
        }
    }

    /// Drain every store, dispatching all remaining candles. Terminal
    /// operation before shutdown.
    pub fn flush(&mut self) {
        for store in self.stores.values_mut() {
            for candle in store.flush() {
                self.sink.on_candle(candle);
            }
        }
    }

    fn store_for(&mut self, symbol: &str) -> &mut WindowStore {
        self.stores.entry(symbol.to_string()).or_insert_with(|| {
            debug!(symbol = %symbol, "Creating window store for new symbol");
            WindowStore::new(symbol, self.config.window_length, self.config.watermark_delay)
        })
    }
}
