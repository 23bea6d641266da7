//! Cross-system arbitration with the auxiliary heat pump.
//!
//! The heat-pump gateway writes its tank temperature into the setpoint
//! block at its own polling rate.  The value is only trusted while it is
//! positive and fresh; otherwise arbitration is inert and the heating
//! circuit runs on its local rules alone.

use crate::error::StalenessFault;
use crate::plant::Centi;

/// Last auxiliary tank temperature and when it arrived (cycle time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuxTankInput {
    value: Centi,
    written_at_ms: Option<u64>,
}

impl AuxTankInput {
    pub const fn new() -> Self {
        Self {
            value: 0,
            written_at_ms: None,
        }
    }

    /// Record a gateway write.  A value ≤ 0 is recorded as-is and reads
    /// back as unavailable.
    pub fn record(&mut self, value: Centi, now_ms: u64) {
        self.value = value;
        self.written_at_ms = Some(now_ms);
    }

    /// Usable tank temperature, or why it is not usable.
    pub fn available(&self, now_ms: u64, stale_after_ms: u64) -> Result<Centi, StalenessFault> {
        let Some(at) = self.written_at_ms else {
            return Err(StalenessFault::NeverWritten);
        };
        if self.value <= 0 {
            return Err(StalenessFault::Sentinel);
        }
        if now_ms.saturating_sub(at) > stale_after_ms {
            return Err(StalenessFault::Expired);
        }
        Ok(self.value)
    }
}

/// Whether the auxiliary tank can carry the heating load: its tank is above
/// the high-water mark while the boiler is still below its own target.
pub fn heating_demand_satisfied(
    aux_tank: Centi,
    boiler: Option<Centi>,
    boiler_target: Centi,
    high_water: Centi,
) -> bool {
    aux_tank > high_water && boiler.is_some_and(|b| b < boiler_target)
}
