//! Destination key resolution.

use std::time::{SystemTime, UNIX_EPOCH};

/// Literal token replaced with the current Unix time in seconds.
pub const UNIX_TIMESTAMP_TOKEN: &str = "%unix_timestamp%";

/// Source of wall-clock time, so key resolution can be pinned in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Replace every occurrence of [`UNIX_TIMESTAMP_TOKEN`] in `raw` with `now`
/// as whole seconds since the epoch, rounded to the nearest second.
///
/// Keys without the token are returned unchanged. Times before the epoch
/// resolve to `0`.
pub fn resolve_key(raw: &str, now: SystemTime) -> String {
    if !raw.contains(UNIX_TIMESTAMP_TOKEN) {
        return raw.to_owned();
    }
    raw.replace(UNIX_TIMESTAMP_TOKEN, &unix_seconds(now).to_string())
}

fn unix_seconds(now: SystemTime) -> u64 {
    now.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() + u64::from(elapsed.subsec_millis() >= 500))
        .unwrap_or(0)
}
