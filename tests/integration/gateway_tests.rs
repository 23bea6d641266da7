//! Register gateway behaviour as seen by external clients: staged writes,
//! consistent snapshots, refused writes.

use super::mock_plant::Rig;

use heatctl::app::commands::{ClientId, RegisterWrite};
use heatctl::error::ValidationFault;
use heatctl::plant::{PumpId, SensorId};
use heatctl::registers::gateway::STAGING_DEPTH;
use heatctl::registers::map::{DIAG_BASE, MEASURE_BASE, M_STATUS, OUTPUT_ADDR, SETPOINT_BASE};
use heatctl::registers::GatewayError;
use heatctl::setpoints::SetpointKey;

fn addr(key: SetpointKey) -> u16 {
    SETPOINT_BASE + key.offset() as u16
}

fn operator(key: SetpointKey, value: u16) -> RegisterWrite {
    RegisterWrite::new(ClientId::Operator, addr(key), value)
}

// ── Staging ───────────────────────────────────────────────────

#[test]
fn writes_become_visible_on_next_scan() {
    let mut rig = Rig::new();
    rig.scan();
    assert_eq!(rig.gateway.read(addr(SetpointKey::BoilerTarget)), Some(6000));

    rig.gateway.submit(operator(SetpointKey::BoilerTarget, 7000)).unwrap();
    assert_eq!(rig.gateway.pending(), 1);
    assert_eq!(
        rig.gateway.read(addr(SetpointKey::BoilerTarget)),
        Some(6000),
        "not applied before the scan"
    );

    rig.scan();
    assert_eq!(rig.gateway.pending(), 0);
    assert_eq!(rig.gateway.read(addr(SetpointKey::BoilerTarget)), Some(7000));
    assert_eq!(rig.engine.setpoints().read(SetpointKey::BoilerTarget), 7000);
}

#[test]
fn full_queue_reports_busy() {
    let rig = Rig::new();
    for _ in 0..STAGING_DEPTH {
        rig.gateway.submit(operator(SetpointKey::DeltaTOn, 300)).unwrap();
    }
    assert_eq!(
        rig.gateway.submit(operator(SetpointKey::DeltaTOn, 300)),
        Err(GatewayError::Busy)
    );
    assert_eq!(rig.gateway.fault_count(), 0, "busy is not a validation fault");
}

#[test]
fn full_queue_drains_in_one_scan_in_order() {
    let mut rig = Rig::new();
    for value in 0..STAGING_DEPTH as u16 {
        rig.gateway.submit(operator(SetpointKey::DeltaTOn, 100 + value)).unwrap();
    }
    rig.scan();
    assert_eq!(rig.gateway.pending(), 0);
    assert_eq!(
        rig.engine.setpoints().read(SetpointKey::DeltaTOn),
        100 + STAGING_DEPTH as i32 - 1,
        "last write wins"
    );
}

// ── Refused writes ────────────────────────────────────────────

#[test]
fn measurement_and_diagnostics_are_read_only() {
    let rig = Rig::new();
    for address in [MEASURE_BASE + M_STATUS as u16, DIAG_BASE, OUTPUT_ADDR] {
        assert_eq!(
            rig.gateway
                .submit(RegisterWrite::new(ClientId::Operator, address, 1)),
            Err(GatewayError::Rejected(ValidationFault::ReadOnly)),
            "address {address}"
        );
    }
    assert_eq!(
        rig.gateway.submit(RegisterWrite::new(ClientId::Operator, 7, 1)),
        Err(GatewayError::Rejected(ValidationFault::UnknownAddress))
    );
    assert_eq!(rig.gateway.fault_count(), 4);
    assert_eq!(rig.gateway.pending(), 0);
}

#[test]
fn out_of_range_write_keeps_prior_value_and_is_counted() {
    let mut rig = Rig::new();
    rig.gateway.submit(operator(SetpointKey::BoilerTarget, 9500)).unwrap();
    rig.scan();

    let img = rig.gateway.snapshot();
    assert_eq!(img.read(addr(SetpointKey::BoilerTarget)), Some(6000));
    assert_eq!(rig.gateway.fault_count(), 1);
    assert_eq!(img.diagnostics[2], 1);
}

#[test]
fn reserved_words_read_zero_and_refuse_writes() {
    let mut rig = Rig::new();
    let reserved = SETPOINT_BASE + 10;
    rig.gateway
        .submit(RegisterWrite::new(ClientId::Operator, reserved, 5))
        .unwrap();
    rig.scan();
    assert_eq!(rig.gateway.read(reserved), Some(0));
    assert_eq!(rig.gateway.fault_count(), 1);
}

#[test]
fn only_aux_gateway_writes_aux_tank_temperature() {
    let mut rig = Rig::new();
    rig.gateway.submit(operator(SetpointKey::AuxTankTemp, 5000)).unwrap();
    rig.gateway
        .submit(RegisterWrite::new(
            ClientId::AuxGateway,
            addr(SetpointKey::BoilerTarget),
            7000,
        ))
        .unwrap();
    rig.scan();
    assert_eq!(rig.gateway.fault_count(), 2);
    assert_eq!(rig.engine.setpoints().read(SetpointKey::AuxTankTemp), 0);
    assert_eq!(rig.engine.setpoints().read(SetpointKey::BoilerTarget), 6000);
}

#[test]
fn non_zero_counter_write_is_refused() {
    let mut rig = Rig::new();
    rig.scans(40);
    let runtime_addr = MEASURE_BASE
        + heatctl::registers::map::runtime_offset(PumpId::Well) as u16;
    rig.gateway
        .submit(RegisterWrite::new(ClientId::Maintenance, runtime_addr, 7))
        .unwrap();
    rig.scan();
    assert_eq!(rig.gateway.snapshot().runtime_centi_hours(PumpId::Well), 1);
    assert_eq!(rig.gateway.fault_count(), 1);
}

// ── Encoding ──────────────────────────────────────────────────

#[test]
fn negative_frost_threshold_round_trips_as_twos_complement() {
    let mut rig = Rig::new();
    rig.gateway
        .submit(operator(SetpointKey::FrostThreshold, (-1500i16) as u16))
        .unwrap();
    rig.scan();
    assert_eq!(rig.engine.setpoints().read(SetpointKey::FrostThreshold), -1500);
    assert_eq!(
        rig.gateway.read(addr(SetpointKey::FrostThreshold)),
        Some(0xFA24)
    );
}

#[test]
fn read_block_returns_consecutive_words() {
    let mut rig = Rig::new();
    rig.settle();
    let block = rig.gateway.read_block(SETPOINT_BASE, 4).unwrap();
    assert_eq!(block.as_slice(), &[6000, 6500, 200, 0]);

    assert_eq!(
        rig.gateway.read_block(OUTPUT_ADDR, 2),
        Err(GatewayError::Rejected(ValidationFault::UnknownAddress))
    );
}

// ── Concurrency ───────────────────────────────────────────────

#[test]
fn concurrent_reader_never_sees_a_torn_image() {
    let mut rig = Rig::new();
    rig.plant
        .set(SensorId::Boiler, 6500)
        .set(SensorId::HotWater, 6000)
        .set(SensorId::Return, 5000);
    let Rig { engine, plant, gateway, sink } = &mut rig;
    let gateway = &*gateway;

    std::thread::scope(|s| {
        let reader = s.spawn(|| {
            let mut seen = 0u32;
            let mut last_seq = 0;
            while last_seq < 200 {
                let img = gateway.snapshot();
                assert!(img.sequence >= last_seq, "sequence went backwards");
                last_seq = img.sequence;
                if img.sequence == 0 {
                    continue;
                }
                let status = img.status();
                for pump in PumpId::ALL {
                    let reason = img.reason(pump).expect("valid reason code");
                    assert_eq!(
                        status.pump_active(pump),
                        reason.implied_state().is_on(),
                        "scan {} {pump}",
                        img.sequence
                    );
                }
                seen += 1;
            }
            seen
        });

        for i in 0..200u16 {
            let mode = i % 3;
            let _ = gateway.submit(operator(SetpointKey::OverrideHeating, mode));
            let _ = gateway.submit(operator(SetpointKey::OverrideHotWater, 2 - mode));
            engine.scan(&mut *plant, gateway, &mut *sink);
        }
        assert!(reader.join().unwrap() > 0);
    });
}
