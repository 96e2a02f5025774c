use std::time::Duration;

use chrono::{DateTime, Utc};

/// Human readable duration, e.g. `1h 0m 5s`. Whole seconds only; once a
/// larger unit is present every smaller one is printed too. Durations under
/// one second render as an empty string.
pub fn format_duration(duration: Duration) -> String {
    let mut secs = duration.as_secs();
    let mut result = String::new();

    if secs >= 1 {
        result = format!("{}s", secs % 60);
    }

    secs /= 60;
    if secs >= 1 {
        result = format!("{}m {}", secs % 60, result);
    }

    secs /= 60;
    if secs >= 1 {
        result = format!("{}h {}", secs % 24, result);
    }

    secs /= 24;
    if secs >= 1 {
        result = format!("{}d {}", secs % 365, result);
    }

    secs /= 365;
    if secs >= 1 {
        result = format!("{}y {}", secs, result);
    }

    result
}

/// `2024-01-31 18:04:05 UTC`
pub fn format_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Current unix time in milliseconds.
pub fn current_epoch_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
