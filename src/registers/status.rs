//! Packed status word (measurement block offset 10).
//!
//! Pump bits are logical: a set bit means the pump is running, whatever
//! the relay polarity.  Bits 7–15 are reserved and always zero.

use crate::plant::{MuxPhase, PumpId, PumpState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusWord(u16);

impl StatusWord {
    pub const HOT_WATER_ACTIVE: u16 = 1 << 0;
    pub const HEATING_ACTIVE: u16 = 1 << 1;
    pub const WELL_ACTIVE: u16 = 1 << 2;
    pub const NIGHT_MODE: u16 = 1 << 3;
    /// Set while mux phase B is selected.
    pub const MUX_PHASE_B: u16 = 1 << 4;
    pub const DATA_READY: u16 = 1 << 5;
    pub const SENSOR_ERROR: u16 = 1 << 6;

    pub const DEFINED: u16 = 0x007F;

    pub fn compose(
        pumps: [PumpState; 3],
        night: bool,
        phase: MuxPhase,
        data_ready: bool,
        sensor_error: bool,
    ) -> Self {
        let mut w = 0;
        for pump in PumpId::ALL {
            if pumps[pump.index()].is_on() {
                w |= Self::pump_bit(pump);
            }
        }
        let flags = [
            (night, Self::NIGHT_MODE),
            (phase == MuxPhase::B, Self::MUX_PHASE_B),
            (data_ready, Self::DATA_READY),
            (sensor_error, Self::SENSOR_ERROR),
        ];
        for (set, bit) in flags {
            if set {
                w |= bit;
            }
        }
        Self(w)
    }

    pub const fn from_word(word: u16) -> Self {
        Self(word)
    }

    pub const fn word(self) -> u16 {
        self.0
    }

    pub const fn pump_bit(pump: PumpId) -> u16 {
        1 << (pump as u16)
    }

    pub fn pump_active(self, pump: PumpId) -> bool {
        self.0 & Self::pump_bit(pump) != 0
    }

    pub fn has(self, bit: u16) -> bool {
        self.0 & bit != 0
    }
}
