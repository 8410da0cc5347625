pub mod format;

use std::time::{SystemTime, UNIX_EPOCH};

/// Unix seconds as f64, the timestamp unit used across persisted state.
pub fn now_ts() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
