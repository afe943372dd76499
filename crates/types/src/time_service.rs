use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Registry clock providing monotonic microsecond precision.
///
/// Wraps the system clock so that consecutive calls never observe the same
/// or a smaller timestamp, even across wall-clock regressions. Upload times
/// and audit timestamps both come from here.
pub struct StoriumTime {
    /// Last emitted monotonic time in microseconds.
    last_time_us: u64,
}

impl StoriumTime {
    /// Initialize the clock service.
    pub fn init() {
        let now_us = system_time_us();

        let mut time_service = STORIUM_TIME.write();
        time_service.last_time_us = now_us;
    }

    /// Get current registry time in microseconds.
    pub fn now_us() -> u64 {
        let mut time_service = STORIUM_TIME.write();
        let mut target = system_time_us();

        if target <= time_service.last_time_us {
            target = time_service.last_time_us.saturating_add(1);
        }

        time_service.last_time_us = target;
        target
    }
}

static STORIUM_TIME: Lazy<RwLock<StoriumTime>> =
    Lazy::new(|| RwLock::new(StoriumTime { last_time_us: 0 }));

fn system_time_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Initialize the registry clock.
pub fn storium_time_init() {
    StoriumTime::init();
}

/// Current registry time in microseconds.
pub fn storium_time_now() -> u64 {
    StoriumTime::now_us()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_is_monotonic() {
        let mut previous = storium_time_now();
        for _ in 0..1000 {
            let next = storium_time_now();
            assert!(next > previous, "clock must be strictly increasing");
            previous = next;
        }
    }

    #[test]
    fn time_tracks_system_clock() {
        let now = storium_time_now();
        let system = system_time_us();
        // Within a second of each other under normal conditions.
        assert!(now.abs_diff(system) < 1_000_000);
    }
}
