use chrono::Duration;
use std::env;

/// Engine configuration: window sizing and lateness tolerance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tumbling window length (default: 1 minute)
    pub window_length: Duration,
    /// How far the watermark trails the reference instant (default: 5 seconds)
    pub watermark_delay: Duration,
}

impl EngineConfig {
    pub fn new(window_length: Duration, watermark_delay: Duration) -> Self {
        Self {
            window_length,
            watermark_delay,
        }
    }

    /// Load configuration from environment variables, falling back to the
    /// defaults (1 minute windows, 5 second watermark delay).
    pub fn from_env() -> Self {
        let window_secs = env::var("WINDOW_LENGTH_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        let delay_secs = env::var("WATERMARK_DELAY_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Self {
            window_length: Duration::seconds(window_secs),
            watermark_delay: Duration::seconds(delay_secs),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
