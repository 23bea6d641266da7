//! Host time adapter.
//!
//! Monotonic scan timing from `std::time::Instant` and the local
//! wall-clock time of day from `chrono`, used to seed the engine's
//! day clock at start.

use std::time::Instant;

use chrono::{Local, Timelike};

pub struct HostClock {
    start: Instant,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds since the adapter was created (monotonic).
    pub fn uptime_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }

    /// Current local hour-of-day (0–23).
    pub fn current_hour(&self) -> u8 {
        Local::now().hour() as u8
    }

    /// Milliseconds since local midnight.
    pub fn ms_of_day(&self) -> u32 {
        let now = Local::now();
        now.num_seconds_from_midnight() * 1000 + now.timestamp_subsec_millis().min(999)
    }
}
