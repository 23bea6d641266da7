//! Fuzz target: register writes through the gateway and engine.
//!
//! Interprets the input as a stream of 6-byte records
//! `[client, addr_lo, addr_hi, value_lo, value_hi, scans]` and drives each
//! write through `RegisterGateway::submit` followed by a few engine scans.
//! Asserts that nothing panics and that every published image stays
//! internally consistent: pump status bits agree with reason codes, and
//! every persisted setpoint word stays inside its range.
//!
//! cargo fuzz run fuzz_register_writes

#![no_main]

use heatctl::adapters::sim::SimulatedPlant;
use heatctl::app::commands::{ClientId, RegisterWrite};
use heatctl::app::events::AppEvent;
use heatctl::app::ports::EventSink;
use heatctl::app::service::ControlEngine;
use heatctl::config::PlantConfig;
use heatctl::plant::PumpId;
use heatctl::registers::RegisterGateway;
use heatctl::setpoints::SetpointKey;
use libfuzzer_sys::fuzz_target;

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

const CLIENTS: [ClientId; 3] = [ClientId::Operator, ClientId::Maintenance, ClientId::AuxGateway];

fuzz_target!(|data: &[u8]| {
    let config = PlantConfig {
        mux_dwell_a_ms: 1000,
        mux_dwell_b_ms: 2000,
        ..PlantConfig::default()
    };
    let mut engine = ControlEngine::new(config);
    let mut plant = SimulatedPlant::new(1000);
    let gateway = RegisterGateway::new();
    let mut sink = Discard;

    for rec in data.chunks_exact(6) {
        let client = CLIENTS[usize::from(rec[0]) % CLIENTS.len()];
        let address = u16::from_le_bytes([rec[1], rec[2]]);
        let value = u16::from_le_bytes([rec[3], rec[4]]);
        let _ = gateway.submit(RegisterWrite::new(client, address, value));

        for _ in 0..=(rec[5] % 4) {
            engine.scan(&mut plant, &gateway, &mut sink);
        }

        let img = gateway.snapshot();
        for pump in PumpId::ALL {
            let reason = img.reason(pump).expect("published reason code is defined");
            assert_eq!(
                img.status().pump_active(pump),
                reason.implied_state().is_on(),
                "status bit and reason disagree for {pump}"
            );
        }
        for key in SetpointKey::ALL.into_iter().filter(|k| k.is_persisted()) {
            let v = key.decode(img.setpoints[key.offset()]);
            assert!(key.range().contains(&v), "{key:?} = {v} escaped its range");
        }
    }
});
