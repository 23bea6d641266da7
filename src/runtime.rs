//! Runtime & cycle tracker.
//!
//! Observes the pump states the decision engine produced and accumulates,
//! per pump, running time and the number of Off→On starts.  Counters are
//! volatile: they start at zero on every engine start and measure
//! operating time since then.  Long-term totals belong to the external
//! logger, which polls the measurement block.

use log::info;

use crate::plant::{PumpId, PumpState};

const MS_PER_CENTI_HOUR: u64 = 36_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeCounter {
    run_ms: u64,
    starts: u32,
}

impl RuntimeCounter {
    pub fn hours(&self) -> f64 {
        self.run_ms as f64 / 3_600_000.0
    }

    /// Runtime in hundredths of an hour (register unit).
    pub fn centi_hours(&self) -> u32 {
        (self.run_ms / MS_PER_CENTI_HOUR).min(u64::from(u32::MAX)) as u32
    }

    pub fn run_ms(&self) -> u64 {
        self.run_ms
    }

    pub fn starts(&self) -> u32 {
        self.starts
    }
}

pub struct RuntimeTracker {
    counters: [RuntimeCounter; 3],
    last: [PumpState; 3],
}

impl RuntimeTracker {
    /// All counters zero, every pump assumed Off.
    pub fn new() -> Self {
        Self {
            counters: [RuntimeCounter::default(); 3],
            last: [PumpState::Off; 3],
        }
    }

    /// Account for one completed scan.  Called exactly once per cycle.
    pub fn observe(&mut self, states: [PumpState; 3], elapsed_ms: u32) {
        for pump in PumpId::ALL {
            let i = pump.index();
            let state = states[i];
            if state.is_on() {
                let c = &mut self.counters[i];
                c.run_ms = c.run_ms.saturating_add(u64::from(elapsed_ms));
                if !self.last[i].is_on() {
                    c.starts = c.starts.saturating_add(1);
                }
            }
            self.last[i] = state;
        }
    }

    /// Zero one pump's counters; the others are untouched.
    pub fn reset(&mut self, pump: PumpId) {
        let before = self.counters[pump.index()];
        self.counters[pump.index()] = RuntimeCounter::default();
        info!(
            "Runtime: {} counters reset (was {:.2} h, {} starts)",
            pump,
            before.hours(),
            before.starts
        );
    }

    pub fn counter(&self, pump: PumpId) -> RuntimeCounter {
        self.counters[pump.index()]
    }
}

impl Default for RuntimeTracker {
    fn default() -> Self {
        Self::new()
    }
}
