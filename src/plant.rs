//! Plant vocabulary shared by every layer of the engine.
//!
//! Temperatures travel as hundredths of a degree Celsius in `i32`
//! ("centi-degrees") so that register encoding never rounds twice.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Hundredths of a degree Celsius (or Kelvin for differences).
pub type Centi = i32;

/// Convert whole/fractional degrees to centi-degrees (test and sim helper).
pub fn centi(celsius: f32) -> Centi {
    (celsius * 100.0).round() as Centi
}

// ───────────────────────────────────────────────────────────────
// Pumps
// ───────────────────────────────────────────────────────────────

/// The three pumps of the plant.  Order is the register order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PumpId {
    /// Boiler → hot-water tank charging pump (WW).
    HotWater,
    /// Heating-circuit pump (HK).
    Heating,
    /// Well / continuous circulation pump (BR).
    Well,
}

impl PumpId {
    pub const ALL: [PumpId; 3] = [PumpId::HotWater, PumpId::Heating, PumpId::Well];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HotWater => "hot-water",
            Self::Heating => "heating",
            Self::Well => "well",
        }
    }

    /// Parse the short names used by the console (`ww`, `hk`, `br`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ww" | "hot-water" | "hotwater" => Some(Self::HotWater),
            "hk" | "heating" => Some(Self::Heating),
            "br" | "well" => Some(Self::Well),
            _ => None,
        }
    }
}

impl fmt::Display for PumpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Logical pump state.  Electrical polarity is the output mapper's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PumpState {
    #[default]
    Off,
    On,
}

impl PumpState {
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    pub const fn from_bool(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

/// Manual override per pump.  Register encoding 0/1/2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u16)]
pub enum OverrideMode {
    #[default]
    Auto = 0,
    ForceOn = 1,
    ForceOff = 2,
}

impl OverrideMode {
    pub const fn from_word(word: u16) -> Option<Self> {
        match word {
            0 => Some(Self::Auto),
            1 => Some(Self::ForceOn),
            2 => Some(Self::ForceOff),
            _ => None,
        }
    }

    pub const fn word(self) -> u16 {
        self as u16
    }
}

/// Why a pump is in its current state.  Exactly one per pump per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ReasonCode {
    #[default]
    NoDemand = 0x00,
    DeltaTExceeded = 0x01,
    OverrideOn = 0x02,
    OverrideOff = 0x03,
    SafetyLimit = 0x04,
    FrostProtection = 0x05,
    NightMode = 0x06,
    /// Fixed continuous-circulation policy of the well pump.
    ///
    /// Extends the seven codes above so the well pump is never reported as
    /// `DeltaTExceeded`.  Register consumers decoding only 0x00..0x06 must
    /// accept 0x07 as a running state.
    ContinuousRun = 0x07,
}

impl ReasonCode {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(Self::NoDemand),
            0x01 => Some(Self::DeltaTExceeded),
            0x02 => Some(Self::OverrideOn),
            0x03 => Some(Self::OverrideOff),
            0x04 => Some(Self::SafetyLimit),
            0x05 => Some(Self::FrostProtection),
            0x06 => Some(Self::NightMode),
            0x07 => Some(Self::ContinuousRun),
            _ => None,
        }
    }

    /// The pump state this reason necessarily accompanies.
    pub const fn implied_state(self) -> PumpState {
        match self {
            Self::DeltaTExceeded | Self::OverrideOn | Self::FrostProtection | Self::ContinuousRun => {
                PumpState::On
            }
            Self::NoDemand | Self::OverrideOff | Self::SafetyLimit | Self::NightMode => {
                PumpState::Off
            }
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoDemand => "no demand",
            Self::DeltaTExceeded => "delta-T exceeded",
            Self::OverrideOn => "override on",
            Self::OverrideOff => "override off",
            Self::SafetyLimit => "safety limit",
            Self::FrostProtection => "frost protection",
            Self::NightMode => "night mode",
            Self::ContinuousRun => "continuous run",
        };
        f.pad(s)
    }
}

// ───────────────────────────────────────────────────────────────
// Sensors
// ───────────────────────────────────────────────────────────────

/// Logical sensors.  Order is the register order of the held raw values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorId {
    Flow,
    Outdoor,
    Indoor,
    Boiler,
    HotWater,
    OilTank,
    Return,
    Solar,
}

impl SensorId {
    pub const COUNT: usize = 8;

    pub const ALL: [SensorId; Self::COUNT] = [
        SensorId::Flow,
        SensorId::Outdoor,
        SensorId::Indoor,
        SensorId::Boiler,
        SensorId::HotWater,
        SensorId::OilTank,
        SensorId::Return,
        SensorId::Solar,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Bit used in fault bitmasks.
    pub const fn mask(self) -> u8 {
        1 << (self as u8)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::Outdoor => "outdoor",
            Self::Indoor => "indoor",
            Self::Boiler => "boiler",
            Self::HotWater => "hot-water",
            Self::OilTank => "oil-tank",
            Self::Return => "return",
            Self::Solar => "solar",
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which of two sensors owns a multiplexed channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MuxPhase {
    #[default]
    A,
    B,
}

impl MuxPhase {
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}
