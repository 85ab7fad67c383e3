use candles_core::{Candle, Trade};
use chrono::DateTime;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WireError};

/// Accept a JSON number or a numeric string; exchange feeds disagree on
/// which one they send for price and quantity.
fn de_f64<'de, D>(d: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    struct F64Visitor;
    impl<'de> Visitor<'de> for F64Visitor {
        type Value = f64;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number or numeric string")
        }

        fn visit_f64<E>(self, v: f64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as f64)
        }

        fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as f64)
        }

        fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            v.parse::<f64>().map_err(|_| E::custom("bad f64"))
        }
    }

    d.deserialize_any(F64Visitor)
}

/// Wire-format trade record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeMessage {
    pub symbol: String,
    #[serde(deserialize_with = "de_f64")]
    pub price: f64,
    #[serde(deserialize_with = "de_f64")]
    pub quantity: f64,
    /// ISO-8601; a trailing `Z` means UTC (+00:00)
    pub timestamp: String,
}

impl TradeMessage {
    /// Convert to a core trade, parsing the timestamp. The parsed offset is
    /// preserved on the trade.
    pub fn into_trade(self) -> Result<Trade> {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|e| WireError::Timestamp(format!("{}: {}", self.timestamp, e)))?;

        Ok(Trade {
            symbol: self.symbol,
            price: self.price,
            quantity: self.quantity,
            timestamp,
        })
    }
}

impl From<&Trade> for TradeMessage {
    fn from(trade: &Trade) -> Self {
        Self {
            symbol: trade.symbol.clone(),
            price: trade.price,
            quantity: trade.quantity,
            timestamp: trade.timestamp.to_rfc3339(),
        }
    }
}

/// Wire-format candle record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandleMessage {
    pub symbol: String,
    pub interval: String,
    pub open_time: String,
    pub close_time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub trade_count: u64,
}

impl From<&Candle> for CandleMessage {
    fn from(candle: &Candle) -> Self {
        Self {
            symbol: candle.symbol.clone(),
            interval: candle.interval.clone(),
            open_time: candle.open_time.to_rfc3339(),
            close_time: candle.close_time.to_rfc3339(),
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
            trade_count: candle.trade_count,
        }
    }
}

/// Decode one JSON trade payload into a core trade.
pub fn decode_trade(payload: &str) -> Result<Trade> {
    let message: TradeMessage = serde_json::from_str(payload)?;
    message.into_trade()
}

/// Encode a finalized candle as a JSON payload.
pub fn encode_candle(candle: &Candle) -> Result<String> {
    Ok(serde_json::to_string(&CandleMessage::from(candle))?)
}
