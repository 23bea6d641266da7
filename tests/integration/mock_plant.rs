//! Mock field I/O and event sink for integration tests.
//!
//! `MockPlant` serves fixed temperatures as raw counts, honours the mux
//! select outputs the engine drives, and records every output byte so
//! tests can assert on the full output history.

use heatctl::app::events::AppEvent;
use heatctl::app::ports::{EventSink, InputPort, OutputPort};
use heatctl::app::service::ControlEngine;
use heatctl::config::PlantConfig;
use heatctl::drivers::outputs::OutputMapper;
use heatctl::error::OutputFault;
use heatctl::pins::{ANALOG_CHANNELS, ANALOG_WIRING, OUTPUT_TABLE};
use heatctl::plant::{Centi, MuxPhase, PumpState, SensorId};
use heatctl::registers::RegisterGateway;
use heatctl::sensors::RawInputs;
use heatctl::sensors::curve::SensorCurve;

// ── MockPlant ─────────────────────────────────────────────────

pub struct MockPlant {
    temps: [Centi; SensorId::COUNT],
    broken: u8,
    pub digital: u16,
    pub writes: Vec<u8>,
    pub fail_writes: bool,
    mapper: OutputMapper,
}

#[allow(dead_code)]
impl MockPlant {
    /// Mild plant: no ΔT demand, no frost.
    pub fn new() -> Self {
        let mut temps = [2000; SensorId::COUNT];
        temps[SensorId::Outdoor.index()] = 1000;
        temps[SensorId::Boiler.index()] = 5000;
        temps[SensorId::HotWater.index()] = 5000;
        temps[SensorId::Return.index()] = 5000;
        temps[SensorId::OilTank.index()] = 500;
        Self {
            temps,
            broken: 0,
            digital: 0,
            writes: Vec::new(),
            fail_writes: false,
            mapper: OutputMapper::new(OUTPUT_TABLE),
        }
    }

    pub fn set(&mut self, sensor: SensorId, value: Centi) -> &mut Self {
        self.temps[sensor.index()] = value;
        self
    }

    pub fn break_sensor(&mut self, sensor: SensorId) {
        self.broken |= sensor.mask();
    }

    pub fn repair_sensor(&mut self, sensor: SensorId) {
        self.broken &= !sensor.mask();
    }

    pub fn last_write(&self) -> Option<u8> {
        self.writes.last().copied()
    }

    /// Pump states as the relays see them.
    pub fn pumps(&self) -> [PumpState; 3] {
        self.last_write()
            .map_or([PumpState::Off; 3], |b| self.mapper.decode(b))
    }

    fn selected_phase(&self) -> MuxPhase {
        self.last_write()
            .map_or(MuxPhase::A, |b| self.mapper.decode_phase(b))
    }
}

impl InputPort for MockPlant {
    fn read_inputs(&mut self) -> RawInputs {
        let phase = self.selected_phase();
        let mut analog = [0u16; ANALOG_CHANNELS];
        for (slot, wiring) in analog.iter_mut().zip(ANALOG_WIRING) {
            let sensor = wiring.sensor_for(phase);
            *slot = if self.broken & sensor.mask() != 0 {
                0
            } else {
                SensorCurve::for_sensor(sensor).raw_for(self.temps[sensor.index()])
            };
        }
        RawInputs {
            analog,
            digital: self.digital,
        }
    }
}

impl OutputPort for MockPlant {
    fn write_outputs(&mut self, image: u8) -> Result<(), OutputFault> {
        if self.fail_writes {
            return Err(OutputFault::WriteFailed);
        }
        self.writes.push(image);
        Ok(())
    }
}

// ── Event collector ───────────────────────────────────────────

#[derive(Default)]
pub struct CollectSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for CollectSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

#[allow(dead_code)]
impl CollectSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// Engine, plant, gateway and sink wired together.  Mux dwell is one
/// scan per phase, so two scans latch every sensor.
pub struct Rig {
    pub engine: ControlEngine,
    pub plant: MockPlant,
    pub gateway: RegisterGateway,
    pub sink: CollectSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::with_config(fast_config())
    }

    pub fn with_config(config: PlantConfig) -> Self {
        let mut rig = Self {
            engine: ControlEngine::new(config),
            plant: MockPlant::new(),
            gateway: RegisterGateway::new(),
            sink: CollectSink::default(),
        };
        rig.engine.start(&mut rig.sink);
        rig
    }

    pub fn scan(&mut self) {
        self.engine
            .scan(&mut self.plant, &self.gateway, &mut self.sink);
    }

    pub fn scans(&mut self, n: usize) {
        for _ in 0..n {
            self.scan();
        }
    }

    /// Enough scans to latch both mux phases.
    pub fn settle(&mut self) {
        self.scans(2);
    }
}

pub fn fast_config() -> PlantConfig {
    PlantConfig {
        mux_dwell_a_ms: 1000,
        mux_dwell_b_ms: 1000,
        ..PlantConfig::default()
    }
}
