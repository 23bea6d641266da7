//! Two-phase sensor multiplexer scheduler.
//!
//! The mux relay switches every shared analog channel between its phase A
//! and phase B probe.  After a switch the selected probe needs time to
//! settle, so a channel is only latched on the last cycle of a phase's
//! dwell.  Time is counted in scan-cycle milliseconds, never wall clock.

use crate::plant::MuxPhase;

/// Outcome of one scheduler step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTick {
    /// Phase whose probes are on the channels during this cycle.
    pub selected: MuxPhase,
    /// True on the last cycle of the dwell: latch now.
    pub settled: bool,
}

#[derive(Debug, Clone)]
pub struct MuxScheduler {
    phase: MuxPhase,
    elapsed_ms: u32,
    dwell_a_ms: u32,
    dwell_b_ms: u32,
}

impl MuxScheduler {
    pub fn new(dwell_a_ms: u32, dwell_b_ms: u32) -> Self {
        Self {
            phase: MuxPhase::A,
            elapsed_ms: 0,
            dwell_a_ms,
            dwell_b_ms,
        }
    }

    /// Account for one scan cycle of `period_ms`.
    ///
    /// When the dwell has expired the returned tick is `settled` and the
    /// scheduler has already switched to the other phase for the next cycle.
    pub fn step(&mut self, period_ms: u32) -> PhaseTick {
        let selected = self.phase;
        self.elapsed_ms = self.elapsed_ms.saturating_add(period_ms);
        let settled = self.elapsed_ms >= self.dwell(selected);
        if settled {
            self.phase = selected.other();
            self.elapsed_ms = 0;
        }
        PhaseTick { selected, settled }
    }

    /// Phase that drives the select outputs from now until the next step.
    pub fn phase(&self) -> MuxPhase {
        self.phase
    }

    fn dwell(&self, phase: MuxPhase) -> u32 {
        match phase {
            MuxPhase::A => self.dwell_a_ms,
            MuxPhase::B => self.dwell_b_ms,
        }
    }
}
