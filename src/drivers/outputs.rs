//! Actuator output mapper.
//!
//! Translates logical pump states and the mux phase into the physical
//! output byte (%QB0).  Electrical polarity lives only here, in a table
//! keyed by output identity: decision logic never sees it.
//!
//! ## Fail-safe contract
//!
//! The hot-water and heating pumps are wired through normally-closed relay
//! contacts and therefore active-low: an unpowered or crashed controller
//! leaves them running instead of letting the circuits freeze.
//!
//! Nothing else in the crate builds an output byte.

use crate::plant::{MuxPhase, PumpId, PumpState};

/// Identity of every driven output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputId {
    MuxSelectA,
    MuxSelectB,
    HotWaterPump,
    HeatingPump,
    WellPump,
}

impl OutputId {
    pub const fn for_pump(pump: PumpId) -> Self {
        match pump {
            PumpId::HotWater => Self::HotWaterPump,
            PumpId::Heating => Self::HeatingPump,
            PumpId::Well => Self::WellPump,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Logical on = bit set.
    ActiveHigh,
    /// Logical on = bit clear (normally-closed contact).
    ActiveLow,
}

impl Polarity {
    const fn encode(self, active: bool) -> bool {
        match self {
            Self::ActiveHigh => active,
            Self::ActiveLow => !active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputChannel {
    pub id: OutputId,
    pub bit: u8,
    pub polarity: Polarity,
}

impl OutputChannel {
    const fn mask(self) -> u8 {
        1 << self.bit
    }
}

pub struct OutputMapper {
    table: [OutputChannel; 5],
}

impl OutputMapper {
    pub fn new(table: [OutputChannel; 5]) -> Self {
        Self { table }
    }

    fn channel(&self, id: OutputId) -> Option<OutputChannel> {
        self.table.iter().copied().find(|c| c.id == id)
    }

    /// Build the physical output byte.  Bits not in the table stay clear.
    pub fn encode(&self, pumps: [PumpState; 3], phase: MuxPhase) -> u8 {
        self.table.iter().fold(0u8, |byte, ch| {
            let active = match ch.id {
                OutputId::MuxSelectA => phase == MuxPhase::A,
                OutputId::MuxSelectB => phase == MuxPhase::B,
                OutputId::HotWaterPump => pumps[PumpId::HotWater.index()].is_on(),
                OutputId::HeatingPump => pumps[PumpId::Heating.index()].is_on(),
                OutputId::WellPump => pumps[PumpId::Well.index()].is_on(),
            };
            if ch.polarity.encode(active) {
                byte | ch.mask()
            } else {
                byte
            }
        })
    }

    /// Logical pump states as driven by a physical byte.
    pub fn decode(&self, byte: u8) -> [PumpState; 3] {
        PumpId::ALL.map(|pump| {
            self.channel(OutputId::for_pump(pump))
                .map_or(PumpState::Off, |ch| {
                    let bit = byte & ch.mask() != 0;
                    PumpState::from_bool(ch.polarity.encode(bit))
                })
        })
    }

    /// Mux phase selected by a physical byte.
    pub fn decode_phase(&self, byte: u8) -> MuxPhase {
        let b = self
            .channel(OutputId::MuxSelectB)
            .is_some_and(|ch| ch.polarity.encode(byte & ch.mask() != 0));
        if b { MuxPhase::B } else { MuxPhase::A }
    }
}
