pub mod config;
pub mod types;

pub use config::EngineConfig;
pub use types::{Candle, LateTrade, Trade};
