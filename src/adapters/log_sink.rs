//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each application event as one
//! `PREFIX | key=value` line through the `log` facade.  On the host the
//! binary's subscriber picks these up.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::plant::{Centi, PumpId, PumpState};

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

struct Temp(Option<Centi>);

impl core::fmt::Display for Temp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            Some(v) => {
                let sign = if v < 0 { "-" } else { "" };
                write!(f, "{}{}.{:02}\u{00b0}C", sign, v.abs() / 100, v.abs() % 100)
            }
            None => f.write_str("--"),
        }
    }
}

fn on_off(state: PumpState) -> &'static str {
    if state.is_on() { "ON" } else { "OFF" }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { restored } => {
                info!(
                    "START | setpoints={}",
                    if *restored { "restored" } else { "default" }
                );
            }
            AppEvent::PumpChanged {
                pump,
                from,
                to,
                reason,
            } => {
                info!(
                    "PUMP | {} {} -> {} | reason={} (0x{:02x})",
                    pump,
                    on_off(*from),
                    on_off(*to),
                    reason,
                    reason.code()
                );
            }
            AppEvent::SensorFault(sensor) => {
                warn!("SENSOR | {} faulted, holding last value", sensor);
            }
            AppEvent::SensorRecovered(sensor) => {
                info!("SENSOR | {} recovered", sensor);
            }
            AppEvent::AuxAvailability(available) => {
                info!(
                    "AUX | tank value {}",
                    if *available { "available" } else { "unavailable" }
                );
            }
            AppEvent::WriteRejected {
                client,
                address,
                fault,
            } => {
                warn!("WRITE | client={} addr={} rejected: {}", client, address, fault);
            }
            AppEvent::CountersReset { pump, client } => {
                info!("RESET | {} counters zeroed by {}", pump, client);
            }
            AppEvent::Telemetry(t) => {
                let pump = |p: PumpId| on_off(t.pumps[p.index()]);
                info!(
                    "TELEM | cycle={} | boiler={} ww={} out={} ret={} | \
                     WW={} HK={} BR={} | night={} aux={} | faults=0b{:08b} | \
                     hours={:.2}/{:.2}/{:.2}",
                    t.cycle,
                    Temp(t.boiler),
                    Temp(t.hot_water),
                    Temp(t.outdoor),
                    Temp(t.return_temp),
                    pump(PumpId::HotWater),
                    pump(PumpId::Heating),
                    pump(PumpId::Well),
                    t.night,
                    t.aux_available,
                    t.sensor_faults,
                    t.runtime_hours[0],
                    t.runtime_hours[1],
                    t.runtime_hours[2],
                );
            }
        }
    }
}
