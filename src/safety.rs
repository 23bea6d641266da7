//! Fault supervisor.
//!
//! Runs every scan after acquisition.  It tracks two things:
//!
//! - the per-sensor fault bitmask (bit = [`SensorId::mask`]), and
//! - whether the auxiliary heat-pump tank value is currently usable.
//!
//! Both are level conditions re-evaluated each scan, but only their
//! edges are logged and reported, so a stuck probe produces one line
//! when it breaks and one when it recovers instead of one per cycle.
//!
//! Faults never stop the scan.  The decision engine already treats a
//! faulted sensor as "held value" and a missing aux value as "no
//! arbitration"; this module only makes those conditions visible.

use log::{error, info, warn};

use crate::error::StalenessFault;
use crate::plant::SensorId;

/// Edges produced by one [`FaultSupervisor::evaluate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaultEdges {
    /// Sensors that went faulted this scan.
    pub raised: u8,
    /// Sensors that recovered this scan.
    pub cleared: u8,
    /// `Some(available)` when aux availability flipped.
    pub aux_changed: Option<bool>,
}

impl FaultEdges {
    pub fn is_empty(&self) -> bool {
        self.raised == 0 && self.cleared == 0 && self.aux_changed.is_none()
    }
}

pub struct FaultSupervisor {
    sensor_faults: u8,
    aux_available: bool,
    /// Implausible latches since start.
    fault_events: u32,
}

impl FaultSupervisor {
    pub fn new() -> Self {
        Self {
            sensor_faults: 0,
            aux_available: false,
            fault_events: 0,
        }
    }

    /// Evaluate the latest fault mask and aux availability.
    ///
    /// `invalid_latches` is the number of implausible samples taken this
    /// scan; it feeds the diagnostics counter whether or not it changes
    /// the mask.
    pub fn evaluate(
        &mut self,
        fault_mask: u8,
        invalid_latches: usize,
        aux: Result<i32, StalenessFault>,
    ) -> FaultEdges {
        self.fault_events = self
            .fault_events
            .saturating_add(u32::try_from(invalid_latches).unwrap_or(u32::MAX));

        let mut edges = FaultEdges::default();
        for sensor in SensorId::ALL {
            match self.eval_fault(sensor, fault_mask & sensor.mask() != 0) {
                Some(true) => edges.raised |= sensor.mask(),
                Some(false) => edges.cleared |= sensor.mask(),
                None => {}
            }
        }

        let available = aux.is_ok();
        if available != self.aux_available {
            match aux {
                Ok(v) => info!("AUX AVAILABLE: tank {}.{:02} °C", v / 100, (v % 100).abs()),
                Err(e) => warn!("AUX UNAVAILABLE: {e}"),
            }
            self.aux_available = available;
            edges.aux_changed = Some(available);
        }
        edges
    }

    pub fn sensor_faults(&self) -> u8 {
        self.sensor_faults
    }

    pub fn has_sensor_fault(&self, sensor: SensorId) -> bool {
        self.sensor_faults & sensor.mask() != 0
    }

    pub fn aux_available(&self) -> bool {
        self.aux_available
    }

    pub fn fault_events(&self) -> u32 {
        self.fault_events
    }

    // ── Internal ──────────────────────────────────────────────────

    /// Set or clear a sensor bit.  Returns the edge, if any.
    fn eval_fault(&mut self, sensor: SensorId, condition: bool) -> Option<bool> {
        let was = self.sensor_faults & sensor.mask() != 0;
        if condition {
            self.sensor_faults |= sensor.mask();
            if !was {
                error!("SENSOR FAULT SET: {sensor}");
                return Some(true);
            }
        } else {
            self.sensor_faults &= !sensor.mask();
            if was {
                info!("SENSOR FAULT CLEARED: {sensor}");
                return Some(false);
            }
        }
        None
    }
}

impl Default for FaultSupervisor {
    fn default() -> Self {
        Self::new()
    }
}
