//! Integration tests for the scan pipeline: acquisition → decision →
//! runtime → outputs → published image.

use super::mock_plant::Rig;

use heatctl::app::commands::ClientId;
use heatctl::app::events::AppEvent;
use heatctl::plant::{PumpId, PumpState, ReasonCode, SensorId};
use heatctl::registers::StatusWord;
use heatctl::registers::map::{HOUR_UNKNOWN, M_DIGITAL, M_HOUR, M_TEMPS, NO_DATA};

// ── Outputs ───────────────────────────────────────────────────

#[test]
fn idle_pumps_drive_active_low_relays_high() {
    let mut rig = Rig::new();
    rig.settle();
    // WW and HK idle (bits 1 and 2 high), well running (bit 3 high),
    // mux back on phase A (bit 0).
    assert_eq!(rig.plant.last_write(), Some(0b0000_1111));
    assert_eq!(rig.gateway.snapshot().outputs, 0b0000_1111);
}

#[test]
fn mux_select_alternates_between_phases() {
    let mut rig = Rig::new();
    rig.scans(4);
    let selects: Vec<u8> = rig.plant.writes.iter().map(|b| b & 0b1_0001).collect();
    assert_eq!(selects, vec![0b1_0000, 0b0_0001, 0b1_0000, 0b0_0001]);
}

#[test]
fn output_failure_does_not_stop_the_scan() {
    let mut rig = Rig::new();
    rig.plant.fail_writes = true;
    rig.settle();
    assert!(rig.plant.writes.is_empty());
    assert_eq!(rig.gateway.snapshot().sequence, 2);
    assert_eq!(
        rig.engine.decisions().get(PumpId::Well).reason,
        ReasonCode::ContinuousRun
    );
}

// ── Acquisition ───────────────────────────────────────────────

#[test]
fn data_ready_after_both_phases_latched() {
    let mut rig = Rig::new();
    rig.scan();
    let img = rig.gateway.snapshot();
    assert!(!img.status().has(StatusWord::DATA_READY));
    assert_eq!(img.temperature(SensorId::HotWater), None);
    assert_eq!(img.measurement[M_TEMPS + 1], NO_DATA);

    rig.scan();
    let img = rig.gateway.snapshot();
    assert!(img.status().has(StatusWord::DATA_READY));
    assert_eq!(img.temperature(SensorId::HotWater), Some(5000));
    assert_eq!(img.temperature(SensorId::Outdoor), Some(1000));
}

#[test]
fn digital_inputs_are_published_masked() {
    let mut rig = Rig::new();
    rig.plant.digital = 0xABCD;
    rig.scan();
    assert_eq!(rig.gateway.snapshot().measurement[M_DIGITAL], 0x00CD);
}

#[test]
fn broken_probe_holds_last_value_and_flags_error() {
    let mut rig = Rig::new();
    rig.plant.set(SensorId::Boiler, 7000);
    rig.settle();

    rig.plant.break_sensor(SensorId::Boiler);
    rig.scans(2);
    let img = rig.gateway.snapshot();
    assert!(img.status().has(StatusWord::SENSOR_ERROR));
    assert_eq!(img.temperature(SensorId::Boiler), Some(7000));
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::SensorFault(SensorId::Boiler))),
        1
    );

    rig.scans(2);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::SensorFault(SensorId::Boiler))),
        1,
        "fault edge reported once"
    );

    rig.plant.repair_sensor(SensorId::Boiler);
    rig.scans(2);
    assert!(!rig.gateway.snapshot().status().has(StatusWord::SENSOR_ERROR));
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::SensorRecovered(SensorId::Boiler))),
        1
    );
}

#[test]
fn sensor_fault_counter_reaches_diagnostics() {
    let mut rig = Rig::new();
    rig.plant.break_sensor(SensorId::Flow);
    rig.scans(4);
    // Flow is latched on scans 1 and 3.
    assert_eq!(rig.gateway.snapshot().diagnostics[7], 2);
}

// ── Runtime ───────────────────────────────────────────────────

#[test]
fn runtime_and_starts_accumulate() {
    let mut rig = Rig::new();
    rig.scans(72);
    let img = rig.gateway.snapshot();
    // 72 s of well pump running = 0.02 h.
    assert_eq!(img.runtime_centi_hours(PumpId::Well), 2);
    assert_eq!(img.starts(PumpId::Well), 1);
    assert_eq!(img.runtime_centi_hours(PumpId::Heating), 0);
    assert_eq!(img.starts(PumpId::Heating), 0);
}

#[test]
fn reset_zeroes_one_pump_only() {
    let mut rig = Rig::new();
    rig.plant.set(SensorId::Boiler, 6500).set(SensorId::HotWater, 6000);
    rig.scans(40);
    let before = rig.gateway.snapshot();
    assert_eq!(before.starts(PumpId::HotWater), 1);

    rig.gateway
        .request_reset(ClientId::Maintenance, PumpId::Well)
        .unwrap();
    rig.scan();
    let after = rig.gateway.snapshot();
    assert_eq!(after.runtime_centi_hours(PumpId::Well), 0);
    assert_eq!(after.starts(PumpId::Well), 0);
    assert_eq!(after.starts(PumpId::HotWater), 1);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::CountersReset { pump: PumpId::Well, client: ClientId::Maintenance }
        )),
        1
    );
}

#[test]
fn aux_gateway_cannot_reset_counters() {
    let mut rig = Rig::new();
    rig.scans(40);
    rig.gateway
        .request_reset(ClientId::AuxGateway, PumpId::Well)
        .unwrap();
    rig.scan();
    assert_eq!(rig.gateway.snapshot().runtime_centi_hours(PumpId::Well), 1);
    assert_eq!(rig.gateway.fault_count(), 1);
}

// ── Events ────────────────────────────────────────────────────

#[test]
fn pump_changes_are_reported_once() {
    let mut rig = Rig::new();
    rig.plant
        .set(SensorId::Boiler, 6500)
        .set(SensorId::HotWater, 6000)
        .set(SensorId::Return, 6500);
    rig.scans(5);
    let changes: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::PumpChanged { pump, to, reason, .. } => Some((*pump, *to, *reason)),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![
            (PumpId::Well, PumpState::On, ReasonCode::ContinuousRun),
            (PumpId::HotWater, PumpState::On, ReasonCode::DeltaTExceeded),
        ]
    );
    assert!(matches!(rig.sink.events[0], AppEvent::Started { restored: false }));
}

// ── Clock and diagnostics ─────────────────────────────────────

#[test]
fn hour_word_tracks_day_clock() {
    let mut rig = Rig::new();
    rig.scan();
    assert_eq!(rig.gateway.snapshot().measurement[M_HOUR], HOUR_UNKNOWN);

    rig.engine.sync_clock_ms(3_600_000 * 5 - 1500);
    rig.scan();
    assert_eq!(rig.gateway.snapshot().measurement[M_HOUR], 4);
    rig.scan();
    assert_eq!(rig.gateway.snapshot().measurement[M_HOUR], 5);
}

#[test]
fn uptime_and_sequence_are_cycle_counted() {
    let mut rig = Rig::new();
    rig.scans(30);
    let img = rig.gateway.snapshot();
    assert_eq!(img.sequence, 30);
    assert_eq!(img.uptime_secs(), 30);
}

#[test]
fn scan_timing_is_published_from_next_image() {
    let mut rig = Rig::new();
    rig.scan();
    rig.engine
        .note_scan_duration(std::time::Duration::from_micros(250_000));
    rig.scan();
    let d = rig.gateway.snapshot().diagnostics;
    assert_eq!(d[3], 25);
    // 250 ms saturates the microsecond words.
    assert_eq!((d[4], d[5], d[6]), (u16::MAX, u16::MAX, u16::MAX));
}
