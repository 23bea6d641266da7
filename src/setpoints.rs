//! Setpoint & override store.
//!
//! Holds the operator-tunable values behind the setpoint block.  Every
//! write is range-checked per key; a rejected write leaves the prior value
//! in place.  Reads never fail.
//!
//! Two retention classes live here:
//!
//! - **Persisted setpoints** (targets, thresholds, night window) survive a
//!   restart through [`PersistedSetpoints`].
//! - **Volatile values** (overrides, auxiliary tank temperature, clock
//!   sync) always come up at their defaults.  A restart never resumes a
//!   manual override.

use core::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::ValidationFault;
use crate::plant::{Centi, OverrideMode, PumpId};

/// Number of words in the setpoint block.
pub const SETPOINT_WORDS: usize = 16;

/// Named setpoint keys.  The discriminant is the word offset in the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SetpointKey {
    BoilerTarget = 0,
    HotWaterLimit = 1,
    DeltaTOn = 2,
    DeltaTBand = 3,
    NightStart = 4,
    NightEnd = 5,
    FrostThreshold = 6,
    AuxHighWater = 7,
    ClockHour = 8,
    AuxTankTemp = 12,
    OverrideHotWater = 13,
    OverrideHeating = 14,
    OverrideWell = 15,
}

impl SetpointKey {
    pub const ALL: [SetpointKey; 13] = [
        SetpointKey::BoilerTarget,
        SetpointKey::HotWaterLimit,
        SetpointKey::DeltaTOn,
        SetpointKey::DeltaTBand,
        SetpointKey::NightStart,
        SetpointKey::NightEnd,
        SetpointKey::FrostThreshold,
        SetpointKey::AuxHighWater,
        SetpointKey::ClockHour,
        SetpointKey::AuxTankTemp,
        SetpointKey::OverrideHotWater,
        SetpointKey::OverrideHeating,
        SetpointKey::OverrideWell,
    ];

    /// Key at a block offset.  Reserved offsets return
    /// [`ValidationFault::Reserved`].
    pub fn from_offset(offset: usize) -> Result<Self, ValidationFault> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.offset() == offset)
            .ok_or(if offset < SETPOINT_WORDS {
                ValidationFault::Reserved
            } else {
                ValidationFault::UnknownAddress
            })
    }

    pub const fn offset(self) -> usize {
        self as usize
    }

    pub const fn override_for(pump: PumpId) -> Self {
        match pump {
            PumpId::HotWater => Self::OverrideHotWater,
            PumpId::Heating => Self::OverrideHeating,
            PumpId::Well => Self::OverrideWell,
        }
    }

    /// Valid range in register units.  Signed keys are two's complement.
    pub const fn range(self) -> RangeInclusive<i32> {
        match self {
            Self::BoilerTarget | Self::AuxHighWater => 2000..=9000,
            Self::HotWaterLimit => 3000..=8000,
            Self::DeltaTOn => 50..=2000,
            Self::DeltaTBand => 0..=1000,
            Self::NightStart | Self::NightEnd | Self::ClockHour => 0..=23,
            Self::FrostThreshold => -2000..=1500,
            Self::AuxTankTemp => -5000..=12_000,
            Self::OverrideHotWater | Self::OverrideHeating | Self::OverrideWell => 0..=2,
        }
    }

    /// Survives a restart through [`PersistedSetpoints`].
    pub const fn is_persisted(self) -> bool {
        (self as u8) < (Self::ClockHour as u8)
    }

    /// Only the heat-pump gateway may write this key, and it may write
    /// nothing else.
    pub const fn is_aux_owned(self) -> bool {
        matches!(self, Self::AuxTankTemp)
    }

    /// Whether the word is interpreted as a signed 16-bit value.
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::FrostThreshold | Self::AuxTankTemp)
    }

    pub const fn default_value(self) -> i32 {
        match self {
            Self::BoilerTarget => 6000,
            Self::HotWaterLimit => 6500,
            Self::DeltaTOn => 200,
            Self::DeltaTBand => 0,
            Self::NightStart => 22,
            Self::NightEnd => 6,
            Self::FrostThreshold => 500,
            Self::AuxHighWater => 4500,
            Self::ClockHour
            | Self::AuxTankTemp
            | Self::OverrideHotWater
            | Self::OverrideHeating
            | Self::OverrideWell => 0,
        }
    }

    /// Decode a register word for this key.
    pub const fn decode(self, word: u16) -> i32 {
        if self.is_signed() {
            word as i16 as i32
        } else {
            word as i32
        }
    }
}

/// The subset that survives a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSetpoints {
    pub boiler_target: Centi,
    pub hot_water_limit: Centi,
    pub delta_t_on: Centi,
    pub delta_t_band: Centi,
    pub night_start: u8,
    pub night_end: u8,
    pub frost_threshold: Centi,
    pub aux_high_water: Centi,
}

/// In-memory setpoint store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetpointStore {
    values: [i32; SETPOINT_WORDS],
}

impl SetpointStore {
    /// Every key at its documented default.
    pub fn new() -> Self {
        let mut values = [0; SETPOINT_WORDS];
        for key in SetpointKey::ALL {
            values[key.offset()] = key.default_value();
        }
        Self { values }
    }

    /// Defaults plus a restored persisted subset.  Restored values are
    /// re-validated; any out-of-range field falls back to its default.
    pub fn restored(saved: &PersistedSetpoints) -> Self {
        let mut store = Self::new();
        let fields = [
            (SetpointKey::BoilerTarget, saved.boiler_target),
            (SetpointKey::HotWaterLimit, saved.hot_water_limit),
            (SetpointKey::DeltaTOn, saved.delta_t_on),
            (SetpointKey::DeltaTBand, saved.delta_t_band),
            (SetpointKey::NightStart, i32::from(saved.night_start)),
            (SetpointKey::NightEnd, i32::from(saved.night_end)),
            (SetpointKey::FrostThreshold, saved.frost_threshold),
            (SetpointKey::AuxHighWater, saved.aux_high_water),
        ];
        for (key, value) in fields {
            if store.write(key, value).is_err() {
                log::warn!("Setpoints: stored {:?}={} out of range, using default", key, value);
            }
        }
        store
    }

    /// Validate and store.  On error the prior value is untouched.
    pub fn write(&mut self, key: SetpointKey, value: i32) -> Result<(), ValidationFault> {
        if !key.range().contains(&value) {
            return Err(ValidationFault::OutOfRange);
        }
        self.values[key.offset()] = value;
        Ok(())
    }

    /// Decode and store a raw register word.
    pub fn write_word(&mut self, key: SetpointKey, word: u16) -> Result<(), ValidationFault> {
        self.write(key, key.decode(word))
    }

    pub fn read(&self, key: SetpointKey) -> i32 {
        self.values[key.offset()]
    }

    pub fn override_mode(&self, pump: PumpId) -> OverrideMode {
        // Writes are range-checked to 0..=2.
        OverrideMode::from_word(self.read(SetpointKey::override_for(pump)) as u16)
            .unwrap_or_default()
    }

    pub fn persisted(&self) -> PersistedSetpoints {
        PersistedSetpoints {
            boiler_target: self.read(SetpointKey::BoilerTarget),
            hot_water_limit: self.read(SetpointKey::HotWaterLimit),
            delta_t_on: self.read(SetpointKey::DeltaTOn),
            delta_t_band: self.read(SetpointKey::DeltaTBand),
            night_start: self.read(SetpointKey::NightStart) as u8,
            night_end: self.read(SetpointKey::NightEnd) as u8,
            frost_threshold: self.read(SetpointKey::FrostThreshold),
            aux_high_water: self.read(SetpointKey::AuxHighWater),
        }
    }

    /// The setpoint block as register words (reserved words read zero).
    pub fn words(&self) -> [u16; SETPOINT_WORDS] {
        self.values.map(|v| v as i16 as u16)
    }
}

impl Default for SetpointStore {
    fn default() -> Self {
        Self::new()
    }
}
