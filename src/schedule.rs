//! Night window and the cycle-counted day clock.
//!
//! The controller has no RTC of its own.  [`DayClock`] is synced from an
//! outside source (host wall clock at start, or a `ClockHour` register
//! write from the logger) and then advances by the scan period, so the
//! scan never waits on a clock.

use log::info;

const MS_PER_HOUR: u32 = 3_600_000;
const MS_PER_DAY: u32 = 24 * MS_PER_HOUR;

// ═══════════════════════════════════════════════════════════════
//  Night window
// ═══════════════════════════════════════════════════════════════

/// Time-of-day window for night setback of the heating circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightWindow {
    /// Start hour (0-23 inclusive).  E.g. 22 = 10 PM.
    pub start_hour: u8,
    /// End hour (0-23, exclusive).  E.g. 6 = 6 AM.
    pub end_hour: u8,
}

impl NightWindow {
    /// Check if the given hour is within the window.  `start == end` is an
    /// empty window.
    pub fn contains(&self, hour: u8) -> bool {
        if self.start_hour <= self.end_hour {
            // e.g., 1..5
            hour >= self.start_hour && hour < self.end_hour
        } else {
            // e.g., 22..6 (wraps around midnight)
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Day clock
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayClock {
    /// Milliseconds since local midnight; `None` until first sync.
    ms_of_day: Option<u32>,
}

impl DayClock {
    pub const fn unsynced() -> Self {
        Self { ms_of_day: None }
    }

    /// Set the clock to the start of `hour`.  Values above 23 are ignored.
    pub fn sync_hour(&mut self, hour: u8) {
        if hour > 23 {
            return;
        }
        if self.hour() != Some(hour) {
            info!("DayClock: synced to {:02}:00", hour);
        }
        self.ms_of_day = Some(u32::from(hour) * MS_PER_HOUR);
    }

    /// Set the clock to an exact time of day.
    pub fn sync_ms(&mut self, ms_of_day: u32) {
        self.ms_of_day = Some(ms_of_day % MS_PER_DAY);
    }

    pub fn advance(&mut self, elapsed_ms: u32) {
        if let Some(ms) = self.ms_of_day.as_mut() {
            *ms = (*ms + elapsed_ms % MS_PER_DAY) % MS_PER_DAY;
        }
    }

    pub fn hour(&self) -> Option<u8> {
        self.ms_of_day.map(|ms| (ms / MS_PER_HOUR) as u8)
    }

    /// Unsynced clocks are never in the window.
    pub fn in_window(&self, window: NightWindow) -> bool {
        self.hour().is_some_and(|h| window.contains(h))
    }
}
