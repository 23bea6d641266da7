//! Runtime diagnostics: uptime, scan timing, load and fault counters.
//!
//! Everything here is observational; the scan never branches on it.  The
//! block is published as eight register words:
//!
//! ```text
//!  0..1  uptime seconds (cycle-counted, low word first)
//!  2     validation faults      3  load % of the cycle period
//!  4..6  scan time min/max/mean (µs)   7  sensor faults
//! ```

use core::time::Duration;

use crate::registers::map::split_u32;

pub const DIAG_WORDS: usize = 8;

/// Scan duration statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleStats {
    samples: u64,
    total_us: u64,
    min_us: u32,
    max_us: u32,
    last_us: u32,
}

impl CycleStats {
    pub fn record(&mut self, scan: Duration) {
        let us = u32::try_from(scan.as_micros()).unwrap_or(u32::MAX);
        if self.samples == 0 || us < self.min_us {
            self.min_us = us;
        }
        self.max_us = self.max_us.max(us);
        self.last_us = us;
        self.samples += 1;
        self.total_us = self.total_us.saturating_add(u64::from(us));
    }

    pub fn min_us(&self) -> u32 {
        self.min_us
    }

    pub fn max_us(&self) -> u32 {
        self.max_us
    }

    pub fn mean_us(&self) -> u32 {
        if self.samples == 0 {
            0
        } else {
            (self.total_us / self.samples) as u32
        }
    }

    /// Share of the cycle period used by the last scan, 0–100.
    pub fn load_percent(&self, period_ms: u32) -> u16 {
        if period_ms == 0 {
            return 0;
        }
        let pct = u64::from(self.last_us) * 100 / (u64::from(period_ms) * 1000);
        pct.min(100) as u16
    }
}

/// Aggregated diagnostics of one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Diagnostics {
    pub uptime_ms: u64,
    pub cycles: u64,
    pub validation_faults: u32,
    pub sensor_faults: u32,
    pub stats: CycleStats,
}

fn sat16(v: u32) -> u16 {
    v.min(u32::from(u16::MAX)) as u16
}

impl Diagnostics {
    pub fn uptime_secs(&self) -> u32 {
        (self.uptime_ms / 1000).min(u64::from(u32::MAX)) as u32
    }

    pub fn words(&self, period_ms: u32) -> [u16; DIAG_WORDS] {
        let [up_lo, up_hi] = split_u32(self.uptime_secs());
        [
            up_lo,
            up_hi,
            sat16(self.validation_faults),
            self.stats.load_percent(period_ms),
            sat16(self.stats.min_us()),
            sat16(self.stats.max_us()),
            sat16(self.stats.mean_us()),
            sat16(self.sensor_faults),
        ]
    }
}
