//! Control engine: the hexagonal core.
//!
//! [`ControlEngine`] owns every piece of plant state (held sensor values,
//! setpoints, day clock, runtime counters, fault supervisor) and runs one
//! complete scan per call to [`scan`](ControlEngine::scan).  All I/O flows
//! through port traits injected at call sites.
//!
//! ```text
//!   InputPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │         ControlEngine         │
//!  OutputPort ◀── │ acquire · decide · track · map│
//!                 └──────────────────────────────┘
//!                        ▲ staged writes   │ published image
//!                        └── RegisterGateway ◀┘
//! ```
//!
//! A scan is strictly ordered: apply staged writes, read inputs, acquire,
//! supervise, decide, count, write outputs, publish.  Nothing inside a
//! scan blocks on a client.

use log::{debug, info, warn};

use crate::config::PlantConfig;
use crate::control::arbitration::AuxTankInput;
use crate::control::{DecisionEngine, DecisionInputs, Decisions, Policy};
use crate::diagnostics::Diagnostics;
use crate::drivers::outputs::OutputMapper;
use crate::error::{self, ValidationFault};
use crate::pins::{ANALOG_WIRING, OUTPUT_TABLE};
use crate::plant::{PumpId, SensorId};
use crate::registers::gateway::STAGING_DEPTH;
use crate::registers::map::{
    self, HOUR_UNKNOWN, M_DELTA_HOT_WATER, M_DIGITAL, M_HOUR, M_OUTPUTS, M_RAW, M_STATUS,
    M_TEMPS, NO_DATA, Region, RegisterImage, TEMP_SENSORS,
};
use crate::registers::{RegisterGateway, StatusWord};
use crate::runtime::RuntimeTracker;
use crate::safety::FaultSupervisor;
use crate::schedule::{DayClock, NightWindow};
use crate::sensors::{SensorHub, SensorSet};
use crate::setpoints::{PersistedSetpoints, SetpointKey, SetpointStore};

use super::commands::{ClientId, RegisterWrite};
use super::events::{AppEvent, TelemetryData};
use super::ports::{ConfigError, EventSink, InputPort, OutputPort, StoragePort};

/// Storage namespace and key of the retained setpoints.
pub const STORAGE_NAMESPACE: &str = "heatctl";
pub const SETPOINTS_KEY: &str = "setpoints";

// ───────────────────────────────────────────────────────────────
// ControlEngine
// ───────────────────────────────────────────────────────────────

pub struct ControlEngine {
    config: PlantConfig,
    hub: SensorHub,
    setpoints: SetpointStore,
    clock: DayClock,
    aux: AuxTankInput,
    engine: DecisionEngine,
    decisions: Decisions,
    runtime: RuntimeTracker,
    mapper: OutputMapper,
    supervisor: FaultSupervisor,
    diag: Diagnostics,
    night: bool,
    output_image: u8,
    restored: bool,
    setpoints_dirty: bool,
    dirty_since_ms: u64,
    last_telemetry_ms: u64,
}

impl ControlEngine {
    /// Construct the engine with default setpoints and an unsynced clock.
    ///
    /// The configuration is expected to be validated already.
    pub fn new(config: PlantConfig) -> Self {
        let hub = SensorHub::new(ANALOG_WIRING, config.mux_dwell_a_ms, config.mux_dwell_b_ms);
        let engine = DecisionEngine::new(Policy {
            frost_overrides_force_off: config.frost_overrides_force_off,
        });
        Self {
            hub,
            setpoints: SetpointStore::new(),
            clock: DayClock::unsynced(),
            aux: AuxTankInput::new(),
            engine,
            decisions: Decisions::default(),
            runtime: RuntimeTracker::new(),
            mapper: OutputMapper::new(OUTPUT_TABLE),
            supervisor: FaultSupervisor::new(),
            diag: Diagnostics::default(),
            night: false,
            output_image: 0,
            restored: false,
            setpoints_dirty: false,
            dirty_since_ms: 0,
            last_telemetry_ms: 0,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            restored: self.restored,
        });
        info!(
            "ControlEngine started (period {} ms, setpoints {})",
            self.config.cycle_period_ms,
            if self.restored { "restored" } else { "default" }
        );
    }

    /// Load retained setpoints.  Returns `true` if a stored set was applied;
    /// a missing or unreadable blob leaves the defaults in place.
    pub fn restore_setpoints(&mut self, storage: &impl StoragePort) -> bool {
        match load_persisted(storage) {
            Ok(saved) => {
                self.setpoints = SetpointStore::restored(&saved);
                self.restored = true;
                info!("Setpoints restored from storage");
                true
            }
            Err(ConfigError::NotFound) => {
                info!("No stored setpoints, using defaults");
                false
            }
            Err(e) => {
                warn!("Stored setpoints unusable ({}), using defaults", e);
                false
            }
        }
    }

    pub fn sync_clock_hour(&mut self, hour: u8) {
        self.clock.sync_hour(hour);
    }

    pub fn sync_clock_ms(&mut self, ms_of_day: u32) {
        self.clock.sync_ms(ms_of_day);
    }

    // ── Per-scan orchestration ────────────────────────────────

    /// Run one complete scan and publish its register image.
    ///
    /// The `io` parameter satisfies **both** [`InputPort`] and
    /// [`OutputPort`], keeping the field I/O behind one exclusive borrow.
    pub fn scan(
        &mut self,
        io: &mut (impl InputPort + OutputPort),
        gateway: &RegisterGateway,
        sink: &mut impl EventSink,
    ) -> Decisions {
        let period = self.config.cycle_period_ms;
        self.diag.cycles += 1;
        self.diag.uptime_ms += u64::from(period);
        self.clock.advance(period);

        // 1. Staged writes, bounded so a flooding client cannot stall the scan
        for _ in 0..STAGING_DEPTH {
            let Some(write) = gateway.take_staged() else {
                break;
            };
            self.apply_staged(write, gateway, sink);
        }

        // 2. Inputs
        let raw = io.read_inputs();
        let report = self.hub.acquire(&raw, period);

        // 3. Night window and aux availability
        let window = NightWindow {
            start_hour: self.setpoints.read(SetpointKey::NightStart) as u8,
            end_hour: self.setpoints.read(SetpointKey::NightEnd) as u8,
        };
        self.night = self.clock.in_window(window);

        let now = self.diag.uptime_ms;
        let stale_after = u64::from(self.config.aux_stale_after_secs) * 1000;
        let aux = self.aux.available(now, stale_after);

        // 4. Fault supervision (edges only)
        let edges = self.supervisor.evaluate(
            self.hub.sensors().fault_mask(),
            report.invalid_count(),
            aux,
        );
        for sensor in SensorId::ALL {
            if edges.raised & sensor.mask() != 0 {
                sink.emit(&AppEvent::SensorFault(sensor));
            }
            if edges.cleared & sensor.mask() != 0 {
                sink.emit(&AppEvent::SensorRecovered(sensor));
            }
        }
        if let Some(available) = edges.aux_changed {
            sink.emit(&AppEvent::AuxAvailability(available));
        }

        // 5. Decide
        let previous = self.decisions;
        let inputs = DecisionInputs {
            sensors: self.hub.sensors(),
            setpoints: &self.setpoints,
            night: self.night,
            aux_tank: aux.ok(),
            previous: previous.states(),
        };
        let decisions = self.engine.decide_all(&inputs);
        self.decisions = decisions;

        // 6. Count
        self.runtime.observe(decisions.states(), period);

        // 7. Outputs
        self.output_image = self.mapper.encode(decisions.states(), self.hub.phase());
        if let Err(e) = io.write_outputs(self.output_image) {
            debug!("Output write failed ({}), retrying next scan", e);
        }

        for pump in PumpId::ALL {
            let (before, after) = (previous.get(pump), decisions.get(pump));
            if before.state != after.state {
                sink.emit(&AppEvent::PumpChanged {
                    pump,
                    from: before.state,
                    to: after.state,
                    reason: after.reason,
                });
            }
        }

        // 8. Publish
        gateway.publish(self.compose_image(gateway));

        let interval = u64::from(self.config.telemetry_interval_secs) * 1000;
        if now.saturating_sub(self.last_telemetry_ms) >= interval {
            self.last_telemetry_ms = now;
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }

        decisions
    }

    /// Record how long the last scan took.  Reported from the next image on.
    pub fn note_scan_duration(&mut self, elapsed: core::time::Duration) {
        self.diag.stats.record(elapsed);
    }

    // ── Staged writes ─────────────────────────────────────────

    fn apply_staged(
        &mut self,
        write: RegisterWrite,
        gateway: &RegisterGateway,
        sink: &mut impl EventSink,
    ) {
        if let Err(fault) = self.apply_write(write, sink) {
            let total = gateway.record_fault();
            warn!(
                "Write from {} to {} rejected: {} ({} total)",
                write.client, write.address, fault, total
            );
            sink.emit(&AppEvent::WriteRejected {
                client: write.client,
                address: write.address,
                fault,
            });
        }
    }

    fn apply_write(
        &mut self,
        write: RegisterWrite,
        sink: &mut impl EventSink,
    ) -> Result<(), ValidationFault> {
        match map::locate(write.address) {
            Some(Region::Setpoint(offset)) => {
                let key = SetpointKey::from_offset(offset)?;
                if key.is_aux_owned() != (write.client == ClientId::AuxGateway) {
                    return Err(ValidationFault::Unauthorized);
                }
                self.setpoints.write_word(key, write.value)?;
                let value = self.setpoints.read(key);
                match key {
                    SetpointKey::ClockHour => self.clock.sync_hour(value as u8),
                    SetpointKey::AuxTankTemp => self.aux.record(value, self.diag.uptime_ms),
                    k if k.is_persisted() => self.mark_setpoints_dirty(),
                    _ => {}
                }
                debug!("{} set {:?} = {}", write.client, key, value);
                Ok(())
            }
            Some(Region::Measurement(offset)) => {
                let pump = map::reset_target(offset).ok_or(ValidationFault::ReadOnly)?;
                if write.value != 0 {
                    return Err(ValidationFault::OutOfRange);
                }
                if write.client == ClientId::AuxGateway {
                    return Err(ValidationFault::Unauthorized);
                }
                self.runtime.reset(pump);
                sink.emit(&AppEvent::CountersReset {
                    pump,
                    client: write.client,
                });
                Ok(())
            }
            Some(Region::Diagnostics(_) | Region::Output) => Err(ValidationFault::ReadOnly),
            None => Err(ValidationFault::UnknownAddress),
        }
    }

    // ── Register image ────────────────────────────────────────

    fn compose_image(&mut self, gateway: &RegisterGateway) -> RegisterImage {
        let sensors = self.hub.sensors();
        let states = self.decisions.states();
        let hour = self.clock.hour().map_or(HOUR_UNKNOWN, u16::from);

        let mut img = RegisterImage::empty();
        img.sequence = self.diag.cycles as u32;

        let m = &mut img.measurement;
        for sensor in SensorId::ALL {
            m[M_RAW + sensor.index()] = sensors.raw(sensor);
        }
        m[M_DIGITAL] = sensors.digital();
        m[M_HOUR] = hour;
        m[M_STATUS] = StatusWord::compose(
            states,
            self.night,
            self.hub.phase(),
            sensors.data_ready(),
            self.supervisor.sensor_faults() != 0,
        )
        .word();
        m[M_DELTA_HOT_WATER] = match (
            sensors.value(SensorId::Boiler),
            sensors.value(SensorId::HotWater),
        ) {
            (Some(b), Some(h)) => map::temp_word(Some(b - h)),
            _ => NO_DATA,
        };
        for (i, sensor) in TEMP_SENSORS.iter().enumerate() {
            m[M_TEMPS + i] = map::temp_word(sensors.value(*sensor));
        }
        for pump in PumpId::ALL {
            let counter = self.runtime.counter(pump);
            let off = map::runtime_offset(pump);
            m[off..off + 2].copy_from_slice(&map::split_u32(counter.centi_hours()));
            m[map::starts_offset(pump)] = counter.starts().min(u32::from(u16::MAX)) as u16;
            m[map::reason_offset(pump)] = u16::from(self.decisions.get(pump).reason.code());
        }
        m[M_OUTPUTS] = u16::from(self.output_image);

        img.setpoints = self.setpoints.words();
        img.setpoints[SetpointKey::ClockHour.offset()] = hour;

        self.diag.validation_faults = gateway.fault_count();
        self.diag.sensor_faults = self.supervisor.fault_events();
        img.diagnostics = self.diag.words(self.config.cycle_period_ms);

        img.outputs = u16::from(self.output_image);
        img
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn build_telemetry(&self) -> TelemetryData {
        let sensors = self.hub.sensors();
        TelemetryData {
            cycle: self.diag.cycles,
            boiler: sensors.value(SensorId::Boiler),
            hot_water: sensors.value(SensorId::HotWater),
            outdoor: sensors.value(SensorId::Outdoor),
            return_temp: sensors.value(SensorId::Return),
            pumps: self.decisions.states(),
            reasons: self.decisions.pumps.map(|d| d.reason),
            night: self.night,
            aux_available: self.supervisor.aux_available(),
            sensor_faults: self.supervisor.sensor_faults(),
            runtime_hours: PumpId::ALL.map(|p| self.runtime.counter(p).hours()),
        }
    }

    pub fn config(&self) -> &PlantConfig {
        &self.config
    }

    pub fn decisions(&self) -> &Decisions {
        &self.decisions
    }

    pub fn sensors(&self) -> &SensorSet {
        self.hub.sensors()
    }

    pub fn setpoints(&self) -> &SetpointStore {
        &self.setpoints
    }

    pub fn runtime(&self) -> &RuntimeTracker {
        &self.runtime
    }

    pub fn clock(&self) -> &DayClock {
        &self.clock
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    pub fn is_night(&self) -> bool {
        self.night
    }

    /// Scans executed since construction.
    pub fn cycle_count(&self) -> u64 {
        self.diag.cycles
    }

    // ── Setpoint persistence ──────────────────────────────────

    fn mark_setpoints_dirty(&mut self) {
        if !self.setpoints_dirty {
            self.setpoints_dirty = true;
            self.dirty_since_ms = self.diag.uptime_ms;
        }
    }

    /// Save the retained setpoints once they have been stable for the
    /// configured delay.  Returns `true` if they were saved.
    pub fn auto_save_if_needed(&mut self, storage: &mut impl StoragePort) -> bool {
        if !self.setpoints_dirty {
            return false;
        }
        let since = self.diag.uptime_ms.saturating_sub(self.dirty_since_ms);
        if since < u64::from(self.config.setpoint_save_delay_secs) * 1000 {
            return false;
        }
        match save_persisted(storage, &self.setpoints.persisted()) {
            Ok(()) => {
                self.setpoints_dirty = false;
                info!("Setpoints auto-saved");
                true
            }
            Err(e) => {
                warn!("Setpoint auto-save failed: {}", e);
                false
            }
        }
    }

    /// Save immediately if dirty (call before shutdown).  Returns whether a
    /// save happened; on failure the setpoints stay dirty.
    pub fn force_save_if_dirty(&mut self, storage: &mut impl StoragePort) -> error::Result<bool> {
        if !self.setpoints_dirty {
            return Ok(false);
        }
        save_persisted(storage, &self.setpoints.persisted())?;
        self.setpoints_dirty = false;
        info!("Setpoints force-saved before shutdown");
        Ok(true)
    }

    pub fn is_setpoints_dirty(&self) -> bool {
        self.setpoints_dirty
    }
}

fn load_persisted(storage: &impl StoragePort) -> Result<PersistedSetpoints, ConfigError> {
    let mut buf = [0u8; 128];
    let len = storage.read(STORAGE_NAMESPACE, SETPOINTS_KEY, &mut buf)?;
    postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)
}

fn save_persisted(
    storage: &mut impl StoragePort,
    saved: &PersistedSetpoints,
) -> Result<(), ConfigError> {
    let bytes = postcard::to_allocvec(saved).map_err(|_| ConfigError::Corrupted)?;
    storage.write(STORAGE_NAMESPACE, SETPOINTS_KEY, &bytes)?;
    Ok(())
}
