//! Outbound application events.
//!
//! The [`ControlEngine`](super::service::ControlEngine) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them.

use crate::app::commands::ClientId;
use crate::error::ValidationFault;
use crate::plant::{Centi, PumpId, PumpState, ReasonCode, SensorId};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The engine has started (carries the restored setpoint origin).
    Started { restored: bool },

    /// A pump's logical state changed this scan.
    PumpChanged {
        pump: PumpId,
        from: PumpState,
        to: PumpState,
        reason: ReasonCode,
    },

    /// A sensor's latest latch was implausible.
    SensorFault(SensorId),

    /// A faulted sensor produced a plausible latch again.
    SensorRecovered(SensorId),

    /// The auxiliary tank value became usable (`true`) or unusable.
    AuxAvailability(bool),

    /// A staged write failed validation when applied.
    WriteRejected {
        client: ClientId,
        address: u16,
        fault: ValidationFault,
    },

    /// A pump's runtime and start counters were zeroed.
    CountersReset { pump: PumpId, client: ClientId },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub cycle: u64,
    pub boiler: Option<Centi>,
    pub hot_water: Option<Centi>,
    pub outdoor: Option<Centi>,
    pub return_temp: Option<Centi>,
    pub pumps: [PumpState; 3],
    pub reasons: [ReasonCode; 3],
    pub night: bool,
    pub aux_available: bool,
    pub sensor_faults: u8,
    pub runtime_hours: [f64; 3],
}
