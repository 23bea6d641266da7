//! Control decision engine: rule chain, ΔT rule and cross-system
//! arbitration.

pub mod arbitration;
pub mod decision;
pub mod delta_t;

pub use decision::{Decision, DecisionEngine, DecisionInputs, Decisions, Policy};
