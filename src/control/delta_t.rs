//! ΔT rule with an optional dead-band.
//!
//! A pump is demanded when `source − destination` reaches the on-threshold.
//! With a zero band the same threshold switches it off again.  A non-zero
//! band keeps an already running pump on until the difference drops below
//! `on − band`, which stops chatter around the threshold.

use crate::plant::Centi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaTRule {
    /// On-threshold (K × 100).
    pub on: Centi,
    /// Dead-band below the threshold (K × 100).
    pub band: Centi,
}

impl DeltaTRule {
    pub fn demand(&self, delta: Centi, running: bool) -> bool {
        if delta >= self.on {
            return true;
        }
        running && self.band > 0 && delta >= self.on - self.band
    }
}
