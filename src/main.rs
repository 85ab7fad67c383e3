use std::io::{self, BufRead, Write};

use candles_core::{Candle, EngineConfig, LateTrade};
use candles_engine::{interval_label, CandleSink, StreamRouter};
use candles_wire::{decode_trade, encode_candle};
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Writes finalized candles to stdout as JSON lines and logs late trades.
struct StdoutSink {
    out: io::Stdout,
    candles: u64,
    late: u64,
}

impl StdoutSink {
    fn new() -> Self {
        Self {
            out: io::stdout(),
            candles: 0,
            late: 0,
        }
    }
}

impl CandleSink for StdoutSink {
    fn on_candle(&mut self, candle: Candle) {
        match encode_candle(&candle) {
            Ok(json) => {
                if let Err(e) = writeln!(self.out, "{}", json) {
                    error!(error = %e, "Failed to write candle to stdout");
                } else {
                    self.candles += 1;
                }
            }
            Err(e) => error!(error = %e, symbol = %candle.symbol, "Failed to encode candle"),
        }
    }

    fn on_late(&mut self, late: LateTrade) {
        self.late += 1;
        warn!(
            symbol = %late.trade.symbol,
            timestamp = %late.trade.timestamp,
            window_start = %late.window_start,
            "Late trade dropped"
        );
    }
}

fn main() -> anyhow::Result<()> {
    // Load .env file (ignore if not found)
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the candle stream.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .init();

    let config = EngineConfig::from_env();
    info!(
        interval = %interval_label(config.window_length),
        watermark_delay_secs = config.watermark_delay.num_seconds(),
        "Candle streamer starting"
    );

    let mut router = StreamRouter::new(config, StdoutSink::new());

    let stdin = io::stdin();
    let mut parse_errors = 0u64;
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match decode_trade(line) {
            Ok(trade) => router.process(trade),
            Err(e) => {
                parse_errors += 1;
                warn!(error = %e, "Skipping malformed trade");
            }
        }
    }

    // Stream ended: drain every window still open.
    router.flush();

    let symbols = router.symbol_count();
    let sink = router.into_sink();
    info!(
        symbols = symbols,
        candles = sink.candles,
        late_trades = sink.late,
        parse_errors = parse_errors,
        "Candle streamer finished"
    );
    Ok(())
}
