use candles_core::{Candle, LateTrade};

/// Consumer seam for engine output.
///
/// The candle handler is required; the late handler defaults to dropping the
/// event, so embedders opt in to a dead-letter path explicitly.
pub trait CandleSink {
    /// Called once per finalized candle, in emission order.
    fn on_candle(&mut self, candle: Candle);

    /// Called for every trade rejected as late. Default: drop.
    fn on_late(&mut self, late: LateTrade) {
        let _ = late;
    }
}

/// Collects output into vectors.
///
/// Useful for draining a bounded stream in one pass, and as the assertion
/// target in tests.
#[derive(Debug, Default)]
pub struct VecSink {
    pub candles: Vec<Candle>,
    pub late: Vec<LateTrade>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CandleSink for VecSink {
    fn on_candle(&mut self, candle: Candle) {
        self.candles.push(candle);
    }

    fn on_late(&mut self, late: LateTrade) {
        self.late.push(late);
    }
}

/// Fans every event out to several sinks in registration order.
#[derive(Default)]
pub struct CompositeSink {
    sinks: Vec<Box<dyn CandleSink>>,
}

impl CompositeSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(&mut self, sink: Box<dyn CandleSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl CandleSink for CompositeSink {
    fn on_candle(&mut self, candle: Candle) {
        for sink in &mut self.sinks {
            sink.on_candle(candle.clone());
        }
    }

    fn on_late(&mut self, late: LateTrade) {
        for sink in &mut self.sinks {
            sink.on_late(late.clone());
        }
    }
}
