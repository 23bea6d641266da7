//! Simulated plant.
//!
//! A coarse thermal model of boiler, hot-water tank and heating circuit
//! behind the same terminal interface as the real controller: it serves
//! raw ADC counts through [`InputPort`] and reacts to the physical output
//! byte written through [`OutputPort`].  The mux relay is simulated too,
//! so a muxed channel only carries the probe its select outputs choose.
//!
//! Good enough to watch pumps switch and counters grow on a desk; not a
//! model of any real boiler.

use log::debug;

use crate::app::ports::{InputPort, OutputPort};
use crate::drivers::outputs::OutputMapper;
use crate::error::OutputFault;
use crate::pins::{ANALOG_CHANNELS, ANALOG_WIRING, OUTPUT_TABLE};
use crate::plant::{Centi, MuxPhase, PumpId, PumpState, SensorId, centi};
use crate::sensors::RawInputs;
use crate::sensors::curve::SensorCurve;

const BURNER_ON_BELOW: f32 = 62.0;
const BURNER_OFF_ABOVE: f32 = 78.0;

pub struct SimulatedPlant {
    temps: [f32; SensorId::COUNT],
    broken: u8,
    burner_on: bool,
    digital: u16,
    mapper: OutputMapper,
    outputs: u8,
    dt_secs: f32,
}

impl SimulatedPlant {
    /// Plant at rest: everything near room temperature, boiler cold.
    pub fn new(period_ms: u32) -> Self {
        let mut temps = [20.0; SensorId::COUNT];
        temps[SensorId::Outdoor.index()] = 4.0;
        temps[SensorId::Boiler.index()] = 45.0;
        temps[SensorId::HotWater.index()] = 40.0;
        temps[SensorId::Solar.index()] = 15.0;
        // Level sensor: raw counts, roughly 70 % full.
        temps[SensorId::OilTank.index()] = 460.0;
        Self {
            temps,
            broken: 0,
            burner_on: false,
            digital: 0,
            mapper: OutputMapper::new(OUTPUT_TABLE),
            outputs: 0,
            dt_secs: period_ms as f32 / 1000.0,
        }
    }

    pub fn set_temperature(&mut self, sensor: SensorId, value: Centi) {
        self.temps[sensor.index()] = value as f32 / 100.0;
    }

    pub fn temperature(&self, sensor: SensorId) -> Centi {
        centi(self.temps[sensor.index()])
    }

    /// Make a probe read as an open circuit until repaired.
    pub fn break_sensor(&mut self, sensor: SensorId) {
        self.broken |= sensor.mask();
    }

    pub fn repair_sensor(&mut self, sensor: SensorId) {
        self.broken &= !sensor.mask();
    }

    pub fn set_digital(&mut self, word: u16) {
        self.digital = word;
    }

    /// Last output byte received.
    pub fn outputs(&self) -> u8 {
        self.outputs
    }

    pub fn pumps(&self) -> [PumpState; 3] {
        self.mapper.decode(self.outputs)
    }

    fn raw(&self, sensor: SensorId) -> u16 {
        if self.broken & sensor.mask() != 0 {
            return 0;
        }
        let value = if sensor == SensorId::OilTank {
            self.temps[sensor.index()].round() as Centi
        } else {
            self.temperature(sensor)
        };
        SensorCurve::for_sensor(sensor).raw_for(value)
    }

    fn phase(&self) -> MuxPhase {
        self.mapper.decode_phase(self.outputs)
    }

    /// Advance the thermal model by one scan.
    fn step(&mut self) {
        let dt = self.dt_secs;
        let pumps = self.pumps();
        let on = |p: PumpId| pumps[p.index()].is_on();
        let t = |s: SensorId| self.temps[s.index()];

        let mut boiler = t(SensorId::Boiler);
        let mut tank = t(SensorId::HotWater);
        let mut flow = t(SensorId::Flow);
        let mut ret = t(SensorId::Return);
        let mut indoor = t(SensorId::Indoor);
        let outdoor = t(SensorId::Outdoor);
        let mut oil = t(SensorId::OilTank);

        if boiler < BURNER_ON_BELOW {
            self.burner_on = true;
        } else if boiler > BURNER_OFF_ABOVE {
            self.burner_on = false;
        }
        if self.burner_on {
            boiler += 0.08 * dt;
            oil = (oil - 0.0005 * dt).max(0.0);
        }
        boiler -= (boiler - indoor) * 0.0004 * dt;

        if on(PumpId::HotWater) {
            let q = (boiler - tank) * 0.01 * dt;
            tank += q * 0.5;
            boiler -= q * 0.3;
        }
        tank -= 0.002 * dt;

        if on(PumpId::Heating) {
            flow += (boiler - 0.5 - flow) * 0.05 * dt;
            ret += (flow - 12.0 - ret) * 0.02 * dt;
            boiler -= (flow - ret).max(0.0) * 0.002 * dt;
            indoor += (flow - indoor) * 0.00005 * dt;
        } else {
            flow += (indoor - flow) * 0.005 * dt;
            ret += (indoor - ret) * 0.005 * dt;
        }
        indoor -= (indoor - outdoor) * 0.00002 * dt;

        let temps = &mut self.temps;
        temps[SensorId::Boiler.index()] = boiler;
        temps[SensorId::HotWater.index()] = tank;
        temps[SensorId::Flow.index()] = flow;
        temps[SensorId::Return.index()] = ret;
        temps[SensorId::Indoor.index()] = indoor;
        temps[SensorId::OilTank.index()] = oil;
    }
}

impl InputPort for SimulatedPlant {
    fn read_inputs(&mut self) -> RawInputs {
        let phase = self.phase();
        let mut analog = [0u16; ANALOG_CHANNELS];
        for (slot, wiring) in analog.iter_mut().zip(ANALOG_WIRING) {
            *slot = self.raw(wiring.sensor_for(phase));
        }
        RawInputs {
            analog,
            digital: self.digital,
        }
    }
}

impl OutputPort for SimulatedPlant {
    fn write_outputs(&mut self, image: u8) -> Result<(), OutputFault> {
        if image != self.outputs {
            debug!("Sim: outputs 0b{:08b} -> 0b{:08b}", self.outputs, image);
        }
        self.outputs = image;
        self.step();
        Ok(())
    }
}
