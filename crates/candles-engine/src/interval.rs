use chrono::Duration;

/// Human-readable label for a window length: "30s", "1m", "4h", "1d".
///
/// Truncating division in each bracket; the label drops any sub-unit
/// remainder (a 90 second window labels as "1m") but aggregation always uses
/// the exact length.
pub fn interval_label(window_length: Duration) -> String {
    let secs = window_length.num_seconds();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    }
}
