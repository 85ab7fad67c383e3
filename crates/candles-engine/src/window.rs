use chrono::{DateTime, Duration, FixedOffset};

/// Start of the tumbling window containing `ts`.
///
/// Floor-divides the epoch offset (milliseconds) by the window length, so
/// windows of the same length tile the timeline identically for every
/// caller. The result keeps the timestamp's UTC offset.
pub fn window_start(ts: DateTime<FixedOffset>, length: Duration) -> DateTime<FixedOffset> {
    let length_ms = length.num_milliseconds().max(1);
    let ts_ms = ts.timestamp_millis();
    let start_ms = ts_ms.div_euclid(length_ms) * length_ms;

    // Boundaries are millisecond-resolution; strip sub-millisecond nanos too.
    let sub_ms_nanos = i64::from(ts.timestamp_subsec_nanos() % 1_000_000);
    ts - Duration::milliseconds(ts_ms - start_ms) - Duration::nanoseconds(sub_ms_nanos)
}

/// End of the window beginning at `start`: one millisecond before the next
/// window opens, so adjacent windows are contiguous without a shared instant.
pub fn window_end(start: DateTime<FixedOffset>, length: Duration) -> DateTime<FixedOffset> {
    start + length - Duration::milliseconds(1)
}
