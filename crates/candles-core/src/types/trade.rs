use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A single executed trade as handed over by the ingestion boundary.
///
/// Immutable once constructed. Trades are NOT assumed to arrive in
/// timestamp order; the engine handles reordering via watermarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Market symbol, e.g. "BTCUSDT"
    pub symbol: String,
    /// Execution price
    pub price: f64,
    /// Executed quantity in base units
    pub quantity: f64,
    /// Event time, offset-aware
    pub timestamp: DateTime<FixedOffset>,
}

impl Trade {
    pub fn new(
        symbol: impl Into<String>,
        price: f64,
        quantity: f64,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            quantity,
            timestamp,
        }
    }
}
