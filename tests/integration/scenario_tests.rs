//! End-to-end decision scenarios: plant temperatures in, pump states,
//! reason codes and relay outputs out.

use super::mock_plant::{Rig, fast_config};

use heatctl::app::commands::{ClientId, RegisterWrite};
use heatctl::app::events::AppEvent;
use heatctl::plant::{PumpId, PumpState, ReasonCode, SensorId};
use heatctl::registers::StatusWord;
use heatctl::registers::map::SETPOINT_BASE;
use heatctl::setpoints::SetpointKey;

fn setpoint_addr(key: SetpointKey) -> u16 {
    SETPOINT_BASE + key.offset() as u16
}

fn assert_pump(rig: &Rig, pump: PumpId, state: PumpState, reason: ReasonCode) {
    let d = rig.engine.decisions().get(pump);
    assert_eq!((d.state, d.reason), (state, reason), "{pump} decision");

    let img = rig.gateway.snapshot();
    assert_eq!(img.reason(pump), Some(reason), "{pump} published reason");
    assert_eq!(img.status().pump_active(pump), state.is_on(), "{pump} status bit");
    assert_eq!(rig.plant.pumps()[pump.index()], state, "{pump} relay");
}

// ── Hot-water ΔT ──────────────────────────────────────────────

#[test]
fn hot_water_runs_when_delta_t_exceeded() {
    let mut rig = Rig::new();
    rig.plant.set(SensorId::Boiler, 6500).set(SensorId::HotWater, 6000);
    rig.settle();
    assert_pump(&rig, PumpId::HotWater, PumpState::On, ReasonCode::DeltaTExceeded);
}

#[test]
fn hot_water_idle_below_delta_t() {
    let mut rig = Rig::new();
    rig.plant.set(SensorId::Boiler, 6500).set(SensorId::HotWater, 6400);
    rig.settle();
    assert_pump(&rig, PumpId::HotWater, PumpState::Off, ReasonCode::NoDemand);
}

#[test]
fn hot_water_stops_at_tank_limit() {
    let mut rig = Rig::new();
    rig.plant.set(SensorId::Boiler, 8000).set(SensorId::HotWater, 6600);
    rig.settle();
    assert_pump(&rig, PumpId::HotWater, PumpState::Off, ReasonCode::SafetyLimit);
}

// ── Frost ─────────────────────────────────────────────────────

#[test]
fn frost_runs_heating_without_delta_t() {
    let mut rig = Rig::new();
    rig.plant
        .set(SensorId::Outdoor, -600)
        .set(SensorId::Boiler, 5000)
        .set(SensorId::Return, 5000);
    rig.settle();
    assert_pump(&rig, PumpId::Heating, PumpState::On, ReasonCode::FrostProtection);
}

#[test]
fn force_off_beats_frost_by_default() {
    let mut rig = Rig::new();
    rig.plant.set(SensorId::Outdoor, -600);
    rig.gateway
        .submit(RegisterWrite::new(
            ClientId::Operator,
            setpoint_addr(SetpointKey::OverrideHeating),
            2,
        ))
        .unwrap();
    rig.settle();
    assert_pump(&rig, PumpId::Heating, PumpState::Off, ReasonCode::OverrideOff);
}

#[test]
fn frost_can_be_configured_to_beat_force_off() {
    let mut rig = Rig::with_config(heatctl::config::PlantConfig {
        frost_overrides_force_off: true,
        ..fast_config()
    });
    rig.plant.set(SensorId::Outdoor, -600);
    rig.gateway
        .submit(RegisterWrite::new(
            ClientId::Operator,
            setpoint_addr(SetpointKey::OverrideHeating),
            2,
        ))
        .unwrap();
    rig.settle();
    assert_pump(&rig, PumpId::Heating, PumpState::On, ReasonCode::FrostProtection);
}

// ── Night ─────────────────────────────────────────────────────

#[test]
fn night_stops_heating_but_not_hot_water() {
    let mut rig = Rig::new();
    rig.plant
        .set(SensorId::Boiler, 6500)
        .set(SensorId::HotWater, 6000)
        .set(SensorId::Return, 5000);
    rig.gateway
        .submit(RegisterWrite::new(
            ClientId::Operator,
            setpoint_addr(SetpointKey::ClockHour),
            23,
        ))
        .unwrap();
    rig.settle();

    assert_pump(&rig, PumpId::Heating, PumpState::Off, ReasonCode::NightMode);
    assert_pump(&rig, PumpId::HotWater, PumpState::On, ReasonCode::DeltaTExceeded);
    assert!(rig.gateway.snapshot().status().has(StatusWord::NIGHT_MODE));
}

#[test]
fn hot_water_at_night_still_follows_delta_t() {
    let mut rig = Rig::new();
    rig.engine.sync_clock_hour(2);
    rig.plant.set(SensorId::Boiler, 6500).set(SensorId::HotWater, 6400);
    rig.settle();
    assert_pump(&rig, PumpId::HotWater, PumpState::Off, ReasonCode::NoDemand);
}

#[test]
fn frost_beats_night() {
    let mut rig = Rig::new();
    rig.engine.sync_clock_hour(23);
    rig.plant.set(SensorId::Outdoor, -600);
    rig.settle();
    assert_pump(&rig, PumpId::Heating, PumpState::On, ReasonCode::FrostProtection);
}

#[test]
fn equal_night_bounds_disable_night_mode() {
    let mut rig = Rig::new();
    rig.engine.sync_clock_hour(23);
    for (key, value) in [(SetpointKey::NightStart, 3), (SetpointKey::NightEnd, 3)] {
        rig.gateway
            .submit(RegisterWrite::new(ClientId::Operator, setpoint_addr(key), value))
            .unwrap();
    }
    rig.plant.set(SensorId::Boiler, 6500).set(SensorId::Return, 5000);
    rig.settle();
    assert_pump(&rig, PumpId::Heating, PumpState::On, ReasonCode::DeltaTExceeded);
    assert!(!rig.engine.is_night());
}

// ── Auxiliary arbitration ─────────────────────────────────────

fn aux_write(rig: &Rig, value: i16) {
    rig.gateway
        .submit(RegisterWrite::new(
            ClientId::AuxGateway,
            setpoint_addr(SetpointKey::AuxTankTemp),
            value as u16,
        ))
        .unwrap();
}

#[test]
fn unset_aux_leaves_heating_to_local_rules() {
    let mut rig = Rig::new();
    rig.plant.set(SensorId::Boiler, 5500).set(SensorId::Return, 4000);
    rig.settle();
    assert_pump(&rig, PumpId::Heating, PumpState::On, ReasonCode::DeltaTExceeded);

    aux_write(&rig, 0);
    rig.scan();
    assert_pump(&rig, PumpId::Heating, PumpState::On, ReasonCode::DeltaTExceeded);

    aux_write(&rig, -100);
    rig.scan();
    assert_pump(&rig, PumpId::Heating, PumpState::On, ReasonCode::DeltaTExceeded);
}

#[test]
fn hot_aux_tank_satisfies_heating_demand() {
    let mut rig = Rig::new();
    rig.plant.set(SensorId::Boiler, 5500).set(SensorId::Return, 4000);
    aux_write(&rig, 5000);
    rig.settle();

    assert_pump(&rig, PumpId::Heating, PumpState::Off, ReasonCode::NoDemand);
    assert!(rig.engine.decisions().aux_suppressed);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::AuxAvailability(true))),
        1
    );
}

#[test]
fn aux_does_not_suppress_when_boiler_at_target() {
    let mut rig = Rig::new();
    rig.plant.set(SensorId::Boiler, 6500).set(SensorId::Return, 4000);
    aux_write(&rig, 5000);
    rig.settle();
    assert_pump(&rig, PumpId::Heating, PumpState::On, ReasonCode::DeltaTExceeded);
}

#[test]
fn stale_aux_value_is_ignored() {
    let mut rig = Rig::with_config(heatctl::config::PlantConfig {
        aux_stale_after_secs: 10,
        ..fast_config()
    });
    rig.plant.set(SensorId::Boiler, 5500).set(SensorId::Return, 4000);
    aux_write(&rig, 5000);
    rig.settle();
    assert_pump(&rig, PumpId::Heating, PumpState::Off, ReasonCode::NoDemand);

    rig.scans(10);
    assert_pump(&rig, PumpId::Heating, PumpState::On, ReasonCode::DeltaTExceeded);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::AuxAvailability(false))),
        1
    );

    aux_write(&rig, 5000);
    rig.scan();
    assert_pump(&rig, PumpId::Heating, PumpState::Off, ReasonCode::NoDemand);
}

// ── Well pump ─────────────────────────────────────────────────

#[test]
fn well_pump_runs_continuously_until_forced_off() {
    let mut rig = Rig::new();
    rig.settle();
    assert_pump(&rig, PumpId::Well, PumpState::On, ReasonCode::ContinuousRun);

    rig.gateway
        .submit(RegisterWrite::new(
            ClientId::Operator,
            setpoint_addr(SetpointKey::OverrideWell),
            2,
        ))
        .unwrap();
    rig.scan();
    assert_pump(&rig, PumpId::Well, PumpState::Off, ReasonCode::OverrideOff);
}
