//! Unified error types for the heating controller.
//!
//! A single top-level `Error` every subsystem converts into.  All variants
//! are `Copy` so they travel through the scan path and the register gateway
//! without allocation.  None of them is fatal to the scan cycle: faults are
//! counted, logged and published, never propagated out of a scan.

use core::fmt;

use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor reading was implausible or missing.
    Sensor(SensorFault),
    /// An external register write was rejected.
    Validation(ValidationFault),
    /// The auxiliary heat-pump input is not usable.
    Staleness(StalenessFault),
    /// The physical output image could not be written.
    Output(OutputFault),
    /// Configuration or retained state could not be loaded, validated or
    /// saved.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Validation(e) => write!(f, "validation: {e}"),
            Self::Staleness(e) => write!(f, "staleness: {e}"),
            Self::Output(e) => write!(f, "output: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFault {
    /// Raw reading outside the plausible range of the sensor's curve.
    OutOfRange,
    /// The sensor has not produced a valid sample since start.
    NotSampled,
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::NotSampled => write!(f, "no valid sample yet"),
        }
    }
}

impl From<SensorFault> for Error {
    fn from(e: SensorFault) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Validation faults
// ---------------------------------------------------------------------------

/// Why an external register write was refused.  The prior value is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFault {
    /// Address is not part of the register map.
    UnknownAddress,
    /// Address belongs to a read-only region.
    ReadOnly,
    /// Value outside the key's valid range.
    OutOfRange,
    /// The client may not write this address.
    Unauthorized,
    /// Reserved word; always reads zero.
    Reserved,
}

impl fmt::Display for ValidationFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAddress => write!(f, "unknown address"),
            Self::ReadOnly => write!(f, "read-only register"),
            Self::OutOfRange => write!(f, "value out of range"),
            Self::Unauthorized => write!(f, "client not authorised"),
            Self::Reserved => write!(f, "reserved register"),
        }
    }
}

impl From<ValidationFault> for Error {
    fn from(e: ValidationFault) -> Self {
        Self::Validation(e)
    }
}

// ---------------------------------------------------------------------------
// Staleness faults
// ---------------------------------------------------------------------------

/// Why the auxiliary tank temperature is currently unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalenessFault {
    NeverWritten,
    /// Value ≤ 0 was written: the gateway reports "not available".
    Sentinel,
    /// No refresh inside the staleness window.
    Expired,
}

impl fmt::Display for StalenessFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NeverWritten => write!(f, "never written"),
            Self::Sentinel => write!(f, "sentinel value"),
            Self::Expired => write!(f, "not refreshed in time"),
        }
    }
}

impl From<StalenessFault> for Error {
    fn from(e: StalenessFault) -> Self {
        Self::Staleness(e)
    }
}

// ---------------------------------------------------------------------------
// Output faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFault {
    /// A pin or output-image write returned an error.
    WriteFailed,
}

impl fmt::Display for OutputFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed => write!(f, "output write failed"),
        }
    }
}

impl From<OutputFault> for Error {
    fn from(e: OutputFault) -> Self {
        Self::Output(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, Error>;
