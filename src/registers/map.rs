//! Register map: addresses, units and the per-cycle register image.
//!
//! ```text
//!  512            physical output byte (%QB0)        mapper-owned
//!  12320..12351   measurement block  (32 words)      read-only*
//!  12384..12399   setpoint block     (16 words)      writable
//!  12416..12423   diagnostics block  (8 words)       read-only
//! ```
//!
//! *A zero written to a pump's runtime low word or start-count word is
//! the targeted counter reset; nothing else in the block accepts writes.
//!
//! 32-bit values are two words, low word first.  Temperatures are °C×100
//! as two's-complement words; [`NO_DATA`] marks a sensor without a valid
//! sample.

use crate::diagnostics::DIAG_WORDS;
use crate::plant::{PumpId, ReasonCode, SensorId};
use crate::setpoints::SETPOINT_WORDS;

use super::status::StatusWord;

pub const OUTPUT_ADDR: u16 = 512;
pub const MEASURE_BASE: u16 = 12_320;
pub const MEASURE_WORDS: usize = 32;
pub const SETPOINT_BASE: u16 = 12_384;
pub const DIAG_BASE: u16 = 12_416;

/// Placeholder for a temperature that has never been sampled.
pub const NO_DATA: u16 = 0x8000;
/// Hour word while the day clock is unsynced.
pub const HOUR_UNKNOWN: u16 = 0xFFFF;

// ── Measurement block offsets ─────────────────────────────────

pub const M_RAW: usize = 0;
pub const M_DIGITAL: usize = 8;
pub const M_HOUR: usize = 9;
pub const M_STATUS: usize = 10;
pub const M_DELTA_HOT_WATER: usize = 11;
pub const M_TEMPS: usize = 12;
pub const M_RUNTIME: usize = 19;
pub const M_STARTS: usize = 25;
pub const M_REASONS: usize = 28;
pub const M_OUTPUTS: usize = 31;

/// Sensors published as °C×100 starting at [`M_TEMPS`].
pub const TEMP_SENSORS: [SensorId; 7] = [
    SensorId::Boiler,
    SensorId::HotWater,
    SensorId::Flow,
    SensorId::Outdoor,
    SensorId::Indoor,
    SensorId::Return,
    SensorId::Solar,
];

/// Where an address lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Measurement(usize),
    Setpoint(usize),
    Diagnostics(usize),
    Output,
}

pub fn locate(address: u16) -> Option<Region> {
    let within = |base: u16, len: usize| {
        address
            .checked_sub(base)
            .map(usize::from)
            .filter(|off| *off < len)
    };
    if address == OUTPUT_ADDR {
        return Some(Region::Output);
    }
    if let Some(off) = within(MEASURE_BASE, MEASURE_WORDS) {
        return Some(Region::Measurement(off));
    }
    if let Some(off) = within(SETPOINT_BASE, SETPOINT_WORDS) {
        return Some(Region::Setpoint(off));
    }
    within(DIAG_BASE, DIAG_WORDS).map(Region::Diagnostics)
}

pub const fn runtime_offset(pump: PumpId) -> usize {
    M_RUNTIME + 2 * pump.index()
}

pub const fn starts_offset(pump: PumpId) -> usize {
    M_STARTS + pump.index()
}

pub const fn reason_offset(pump: PumpId) -> usize {
    M_REASONS + pump.index()
}

/// Pump whose counters a zero-write at this measurement offset resets.
pub fn reset_target(offset: usize) -> Option<PumpId> {
    PumpId::ALL
        .into_iter()
        .find(|p| offset == runtime_offset(*p) || offset == starts_offset(*p))
}

/// Address of a measurement-block word.
pub const fn measure_addr(offset: usize) -> u16 {
    MEASURE_BASE + offset as u16
}

/// Encode a centi-degree value, saturating into the signed word range.
pub fn temp_word(value: Option<i32>) -> u16 {
    match value {
        // i16::MIN is reserved for "no data".
        Some(v) => v.clamp(-i32::from(i16::MAX), i32::from(i16::MAX)) as i16 as u16,
        None => NO_DATA,
    }
}

pub fn split_u32(v: u32) -> [u16; 2] {
    [v as u16, (v >> 16) as u16]
}

pub fn join_u32(lo: u16, hi: u16) -> u32 {
    u32::from(lo) | (u32::from(hi) << 16)
}

// ═══════════════════════════════════════════════════════════════
//  Register image
// ═══════════════════════════════════════════════════════════════

/// Everything external clients can read, latched once per scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterImage {
    /// Number of the scan that produced this image (0 = none yet).
    pub sequence: u32,
    pub measurement: [u16; MEASURE_WORDS],
    pub setpoints: [u16; SETPOINT_WORDS],
    pub diagnostics: [u16; DIAG_WORDS],
    pub outputs: u16,
}

impl RegisterImage {
    pub const fn empty() -> Self {
        Self {
            sequence: 0,
            measurement: [0; MEASURE_WORDS],
            setpoints: [0; SETPOINT_WORDS],
            diagnostics: [0; DIAG_WORDS],
            outputs: 0,
        }
    }

    pub fn read(&self, address: u16) -> Option<u16> {
        Some(match locate(address)? {
            Region::Measurement(off) => self.measurement[off],
            Region::Setpoint(off) => self.setpoints[off],
            Region::Diagnostics(off) => self.diagnostics[off],
            Region::Output => self.outputs,
        })
    }

    pub fn status(&self) -> StatusWord {
        StatusWord::from_word(self.measurement[M_STATUS])
    }

    pub fn reason(&self, pump: PumpId) -> Option<ReasonCode> {
        ReasonCode::from_code(self.measurement[reason_offset(pump)] as u8)
    }

    pub fn runtime_centi_hours(&self, pump: PumpId) -> u32 {
        let off = runtime_offset(pump);
        join_u32(self.measurement[off], self.measurement[off + 1])
    }

    pub fn starts(&self, pump: PumpId) -> u16 {
        self.measurement[starts_offset(pump)]
    }

    /// Published temperature of a sensor, `None` for [`NO_DATA`] or an
    /// unpublished sensor.
    pub fn temperature(&self, sensor: SensorId) -> Option<i32> {
        let idx = TEMP_SENSORS.iter().position(|s| *s == sensor)?;
        let word = self.measurement[M_TEMPS + idx];
        (word != NO_DATA).then_some(i32::from(word as i16))
    }

    pub fn uptime_secs(&self) -> u32 {
        join_u32(self.diagnostics[0], self.diagnostics[1])
    }
}

impl Default for RegisterImage {
    fn default() -> Self {
        Self::empty()
    }
}
