//! Raw ADC → temperature conversion curves.
//!
//! The analog terminals deliver 16-bit counts.  Each sensor family has a
//! linearised curve fitted against the installed probes and a plausible raw
//! window; anything outside that window is a broken or shorted probe.

use core::ops::RangeInclusive;

use crate::error::SensorFault;
use crate::plant::{Centi, SensorId};

/// Conversion family of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorCurve {
    /// PT1000 on the RTD terminal: `(raw − 7134) / 25`.
    Pt1000,
    /// Boiler-type NTC: `(40536 − raw) / 303.1`.
    NtcBoiler,
    /// Collector NTC: `(raw − 26402) / 60`.
    NtcSolar,
    /// Level transmitter: raw counts pass through unchanged.
    Level,
}

const PT1000_OFFSET: f32 = 7134.0;
const PT1000_COUNTS_PER_DEG: f32 = 25.0;

const NTC_BOILER_OFFSET: f32 = 40536.0;
const NTC_BOILER_COUNTS_PER_DEG: f32 = 303.1;

const NTC_SOLAR_OFFSET: f32 = 26402.0;
const NTC_SOLAR_COUNTS_PER_DEG: f32 = 60.0;

impl SensorCurve {
    /// The curve of each installed sensor.
    pub const fn for_sensor(sensor: SensorId) -> Self {
        match sensor {
            SensorId::Flow
            | SensorId::Outdoor
            | SensorId::Indoor
            | SensorId::Boiler
            | SensorId::Return => Self::Pt1000,
            SensorId::HotWater => Self::NtcBoiler,
            SensorId::Solar => Self::NtcSolar,
            SensorId::OilTank => Self::Level,
        }
    }

    /// Physically plausible raw window.
    pub const fn plausible(self) -> RangeInclusive<u16> {
        match self {
            Self::Pt1000 => 4000..=25_000,
            Self::NtcBoiler => 4000..=45_000,
            Self::NtcSolar => 4000..=40_000,
            Self::Level => 0..=u16::MAX,
        }
    }

    /// Convert a raw count to centi-degrees (counts for [`Level`](Self::Level)).
    pub fn calibrate(self, raw: u16) -> Result<Centi, SensorFault> {
        if !self.plausible().contains(&raw) {
            return Err(SensorFault::OutOfRange);
        }
        let r = f32::from(raw);
        let degrees = match self {
            Self::Pt1000 => (r - PT1000_OFFSET) / PT1000_COUNTS_PER_DEG,
            Self::NtcBoiler => (NTC_BOILER_OFFSET - r) / NTC_BOILER_COUNTS_PER_DEG,
            Self::NtcSolar => (r - NTC_SOLAR_OFFSET) / NTC_SOLAR_COUNTS_PER_DEG,
            Self::Level => return Ok(Centi::from(raw)),
        };
        Ok((degrees * 100.0).round() as Centi)
    }

    /// Inverse of [`calibrate`](Self::calibrate): the raw count a probe
    /// shows at `value`.  Used by the plant simulator and tests.
    pub fn raw_for(self, value: Centi) -> u16 {
        let deg = value as f32 / 100.0;
        let raw = match self {
            Self::Pt1000 => PT1000_OFFSET + deg * PT1000_COUNTS_PER_DEG,
            Self::NtcBoiler => NTC_BOILER_OFFSET - deg * NTC_BOILER_COUNTS_PER_DEG,
            Self::NtcSolar => NTC_SOLAR_OFFSET + deg * NTC_SOLAR_COUNTS_PER_DEG,
            Self::Level => value as f32,
        };
        raw.round().clamp(0.0, f32::from(u16::MAX)) as u16
    }
}
