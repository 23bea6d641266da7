//! Pump decision rules.
//!
//! Each cycle every pump gets exactly one [`Decision`]: a logical state and
//! the reason code that produced it.  Rules are tried in a fixed
//! precedence and the first applicable rule wins:
//!
//! ```text
//!  ForceOff ─▶ ForceOn ─▶ frost ─▶ night (heating only)
//!      ─▶ arbitration (heating only) ─▶ ΔT (+ tank limit, hot water only)
//! ```
//!
//! The well pump ignores all of that and runs unless forced off.
//!
//! With a zero ΔT dead-band the outcome depends on the current inputs
//! only.  A non-zero band makes the previous state an input as well.

use crate::plant::{Centi, OverrideMode, PumpId, PumpState, ReasonCode, SensorId};
use crate::sensors::SensorSet;
use crate::setpoints::{SetpointKey, SetpointStore};

use super::arbitration::heating_demand_satisfied;
use super::delta_t::DeltaTRule;

/// Result of the rule chain for one pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decision {
    pub state: PumpState,
    pub reason: ReasonCode,
}

impl Decision {
    const fn on(reason: ReasonCode) -> Self {
        Self {
            state: PumpState::On,
            reason,
        }
    }

    const fn off(reason: ReasonCode) -> Self {
        Self {
            state: PumpState::Off,
            reason,
        }
    }
}

/// Everything a decision may depend on, as seen at the start of the cycle.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInputs<'a> {
    pub sensors: &'a SensorSet,
    pub setpoints: &'a SetpointStore,
    /// Current hour lies inside the night window.
    pub night: bool,
    /// Auxiliary tank temperature when available and fresh.
    pub aux_tank: Option<Centi>,
    /// States decided in the previous cycle (dead-band memory).
    pub previous: [PumpState; 3],
}

/// Decisions for all three pumps in register order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decisions {
    pub pumps: [Decision; 3],
    /// The heating ΔT demand was handed to the auxiliary source this cycle.
    pub aux_suppressed: bool,
}

impl Decisions {
    pub fn get(&self, pump: PumpId) -> Decision {
        self.pumps[pump.index()]
    }

    pub fn states(&self) -> [PumpState; 3] {
        self.pumps.map(|d| d.state)
    }
}

/// Per-pump wiring of the automatic rules.
#[derive(Debug, Clone, Copy)]
struct PumpRole {
    source: SensorId,
    destination: SensorId,
    frost_sensor: SensorId,
    night_setback: bool,
    arbitration: bool,
    tank_limit: Option<SetpointKey>,
}

const fn role(pump: PumpId) -> Option<PumpRole> {
    match pump {
        PumpId::HotWater => Some(PumpRole {
            source: SensorId::Boiler,
            destination: SensorId::HotWater,
            frost_sensor: SensorId::Outdoor,
            night_setback: false,
            arbitration: false,
            tank_limit: Some(SetpointKey::HotWaterLimit),
        }),
        PumpId::Heating => Some(PumpRole {
            source: SensorId::Boiler,
            destination: SensorId::Return,
            frost_sensor: SensorId::Outdoor,
            night_setback: true,
            arbitration: true,
            tank_limit: None,
        }),
        PumpId::Well => None,
    }
}

/// Rule-ordering switches that are installation policy, not setpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Policy {
    pub frost_overrides_force_off: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct DecisionEngine {
    policy: Policy,
}

impl DecisionEngine {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub fn decide_all(&self, inputs: &DecisionInputs<'_>) -> Decisions {
        let mut aux_suppressed = false;
        let pumps = PumpId::ALL.map(|pump| {
            let (decision, suppressed) = self.decide(pump, inputs);
            aux_suppressed |= suppressed;
            decision
        });
        Decisions {
            pumps,
            aux_suppressed,
        }
    }

    /// Run the rule chain for one pump.  The flag reports whether the
    /// arbitration rule decided the outcome.
    pub fn decide(&self, pump: PumpId, inputs: &DecisionInputs<'_>) -> (Decision, bool) {
        let mode = inputs.setpoints.override_mode(pump);

        let Some(role) = role(pump) else {
            return (continuous(mode), false);
        };

        let frost = frost_active(&role, inputs);

        if self.policy.frost_overrides_force_off && frost {
            return (Decision::on(ReasonCode::FrostProtection), false);
        }
        match mode {
            OverrideMode::ForceOff => return (Decision::off(ReasonCode::OverrideOff), false),
            OverrideMode::ForceOn => return (Decision::on(ReasonCode::OverrideOn), false),
            OverrideMode::Auto => {}
        }
        if frost {
            return (Decision::on(ReasonCode::FrostProtection), false);
        }
        if role.night_setback && inputs.night {
            return (Decision::off(ReasonCode::NightMode), false);
        }
        if role.arbitration && self.aux_takes_load(inputs) {
            return (Decision::off(ReasonCode::NoDemand), true);
        }
        (delta_t(&role, pump, inputs), false)
    }

    fn aux_takes_load(&self, inputs: &DecisionInputs<'_>) -> bool {
        inputs.aux_tank.is_some_and(|tank| {
            heating_demand_satisfied(
                tank,
                inputs.sensors.value(SensorId::Boiler),
                inputs.setpoints.read(SetpointKey::BoilerTarget),
                inputs.setpoints.read(SetpointKey::AuxHighWater),
            )
        })
    }
}

/// Well pump: fixed continuous circulation.
fn continuous(mode: OverrideMode) -> Decision {
    match mode {
        OverrideMode::ForceOff => Decision::off(ReasonCode::OverrideOff),
        OverrideMode::ForceOn => Decision::on(ReasonCode::OverrideOn),
        OverrideMode::Auto => Decision::on(ReasonCode::ContinuousRun),
    }
}

fn frost_active(role: &PumpRole, inputs: &DecisionInputs<'_>) -> bool {
    let threshold = inputs.setpoints.read(SetpointKey::FrostThreshold);
    inputs
        .sensors
        .value(role.frost_sensor)
        .is_some_and(|t| t < threshold)
}

fn delta_t(role: &PumpRole, pump: PumpId, inputs: &DecisionInputs<'_>) -> Decision {
    let (Ok(source), Ok(destination)) = (
        inputs.sensors.require(role.source),
        inputs.sensors.require(role.destination),
    ) else {
        return Decision::off(ReasonCode::NoDemand);
    };

    let rule = DeltaTRule {
        on: inputs.setpoints.read(SetpointKey::DeltaTOn),
        band: inputs.setpoints.read(SetpointKey::DeltaTBand),
    };
    let running = inputs.previous[pump.index()].is_on();
    if !rule.demand(source - destination, running) {
        return Decision::off(ReasonCode::NoDemand);
    }
    if role
        .tank_limit
        .is_some_and(|limit| destination >= inputs.setpoints.read(limit))
    {
        return Decision::off(ReasonCode::SafetyLimit);
    }
    Decision::on(ReasonCode::DeltaTExceeded)
}
