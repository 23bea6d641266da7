//! Sensor acquisition: curves, the mux scheduler and the aggregating
//! [`SensorHub`].
//!
//! The hub owns one last-known-good cell per logical sensor.  Each scan it
//! latches the channels that are due (direct channels every cycle, muxed
//! channels at the end of their phase dwell) and leaves every other cell
//! untouched, so downstream logic always sees the last settled value of
//! a probe that is currently off the shared channel.

pub mod curve;
pub mod mux;

use heapless::Vec;

use crate::error::SensorFault;
use crate::pins::{ANALOG_CHANNELS, DIGITAL_INPUT_MASK};
use crate::plant::{Centi, MuxPhase, SensorId};
use curve::SensorCurve;
use mux::{MuxScheduler, PhaseTick};

/// How a physical analog channel is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelWiring {
    Direct(SensorId),
    Muxed { a: SensorId, b: SensorId },
}

impl ChannelWiring {
    pub fn sensor_for(self, phase: MuxPhase) -> SensorId {
        match (self, phase) {
            (Self::Direct(s), _) | (Self::Muxed { a: s, .. }, MuxPhase::A) => s,
            (Self::Muxed { b, .. }, MuxPhase::B) => b,
        }
    }
}

/// Raw input image read once at the start of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawInputs {
    pub analog: [u16; ANALOG_CHANNELS],
    pub digital: u16,
}

/// One latched measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSample {
    pub sensor: SensorId,
    pub channel: usize,
    /// `None` for a direct channel.
    pub phase: Option<MuxPhase>,
    pub raw: u16,
    pub calibrated: Result<Centi, SensorFault>,
}

impl SensorSample {
    pub fn is_valid(&self) -> bool {
        self.calibrated.is_ok()
    }
}

/// Last-known-good cell of one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct HeldValue {
    wired: bool,
    captured: bool,
    /// Raw count of the last latch, valid or not.
    raw: u16,
    value: Option<Centi>,
    faulted: bool,
}

/// Held values of every sensor as seen by the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorSet {
    cells: [HeldValue; SensorId::COUNT],
    digital: u16,
}

impl SensorSet {
    /// Last valid calibrated value, or `None` before the first valid latch.
    pub fn value(&self, sensor: SensorId) -> Option<Centi> {
        self.cells[sensor.index()].value
    }

    pub fn require(&self, sensor: SensorId) -> Result<Centi, SensorFault> {
        self.value(sensor).ok_or(SensorFault::NotSampled)
    }

    pub fn raw(&self, sensor: SensorId) -> u16 {
        self.cells[sensor.index()].raw
    }

    pub fn digital(&self) -> u16 {
        self.digital
    }

    /// Bitmask of sensors whose most recent latch was implausible.
    pub fn fault_mask(&self) -> u8 {
        SensorId::ALL
            .iter()
            .filter(|s| self.cells[s.index()].faulted)
            .fold(0, |m, s| m | s.mask())
    }

    /// Every wired sensor has been latched at least once.
    pub fn data_ready(&self) -> bool {
        self.cells.iter().filter(|c| c.wired).all(|c| c.captured)
    }

    /// Test and simulation seam: place a value directly into a cell.
    pub fn with_value(mut self, sensor: SensorId, value: Centi) -> Self {
        let cell = &mut self.cells[sensor.index()];
        cell.wired = true;
        cell.captured = true;
        cell.raw = SensorCurve::for_sensor(sensor).raw_for(value);
        cell.value = Some(value);
        cell.faulted = false;
        self
    }
}

/// What one acquisition step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireReport {
    pub tick: PhaseTick,
    pub samples: Vec<SensorSample, ANALOG_CHANNELS>,
}

impl AcquireReport {
    pub fn invalid_count(&self) -> usize {
        self.samples.iter().filter(|s| !s.is_valid()).count()
    }
}

/// Aggregates every analog channel and produces the held [`SensorSet`].
pub struct SensorHub {
    wiring: [ChannelWiring; ANALOG_CHANNELS],
    mux: MuxScheduler,
    set: SensorSet,
}

impl SensorHub {
    pub fn new(wiring: [ChannelWiring; ANALOG_CHANNELS], dwell_a_ms: u32, dwell_b_ms: u32) -> Self {
        let mut set = SensorSet::default();
        for w in wiring {
            match w {
                ChannelWiring::Direct(s) => set.cells[s.index()].wired = true,
                ChannelWiring::Muxed { a, b } => {
                    set.cells[a.index()].wired = true;
                    set.cells[b.index()].wired = true;
                }
            }
        }
        Self {
            wiring,
            mux: MuxScheduler::new(dwell_a_ms, dwell_b_ms),
            set,
        }
    }

    /// Latch the channels due this cycle and advance the mux timer.
    ///
    /// An implausible reading marks its sensor faulted and leaves the held
    /// value alone; the next plausible latch clears the fault.
    pub fn acquire(&mut self, raw: &RawInputs, period_ms: u32) -> AcquireReport {
        let tick = self.mux.step(period_ms);
        let mut samples = Vec::new();
        let table = self.wiring;

        for (channel, wiring) in table.into_iter().enumerate() {
            let phase = match wiring {
                ChannelWiring::Direct(_) => None,
                ChannelWiring::Muxed { .. } if tick.settled => Some(tick.selected),
                ChannelWiring::Muxed { .. } => continue,
            };
            let sensor = wiring.sensor_for(tick.selected);
            let raw_value = raw.analog[channel];
            let sample = SensorSample {
                sensor,
                channel,
                phase,
                raw: raw_value,
                calibrated: SensorCurve::for_sensor(sensor).calibrate(raw_value),
            };
            self.latch(&sample);
            samples.push(sample).ok();
        }

        self.set.digital = raw.digital & DIGITAL_INPUT_MASK;
        AcquireReport { tick, samples }
    }

    fn latch(&mut self, sample: &SensorSample) {
        let cell = &mut self.set.cells[sample.sensor.index()];
        cell.captured = true;
        cell.raw = sample.raw;
        match sample.calibrated {
            Ok(v) => {
                cell.value = Some(v);
                cell.faulted = false;
            }
            Err(_) => cell.faulted = true,
        }
    }

    pub fn sensors(&self) -> &SensorSet {
        &self.set
    }

    /// Phase to drive on the mux select outputs until the next scan.
    pub fn phase(&self) -> MuxPhase {
        self.mux.phase()
    }
}
