//! Port traits: the hexagonal boundary between the scan core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlEngine (domain)
//! ```
//!
//! Driven adapters (field I/O, event sinks, storage) implement these
//! traits.  The [`ControlEngine`](super::service::ControlEngine) consumes
//! them via generics, so the domain core never touches hardware directly.
//!
//! External clients do not go through a port: they share the
//! [`RegisterGateway`](crate::registers::RegisterGateway) with the engine.

use crate::error::OutputFault;
use crate::sensors::RawInputs;

// ───────────────────────────────────────────────────────────────
// Field inputs (driven adapter: terminals → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the analog and digital input image.
pub trait InputPort {
    /// Read every analog channel and the digital input word once.
    ///
    /// Adapters never fail here: a broken probe shows up as an
    /// implausible raw count, which the sensor hub rejects.
    fn read_inputs(&mut self) -> RawInputs;
}

// ───────────────────────────────────────────────────────────────
// Field outputs (driven adapter: domain → terminals)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the physical output byte (%QB0).
pub trait OutputPort {
    /// Drive the full output byte.  A failed write is retried with the
    /// next scan's image.
    fn write_outputs(&mut self, image: u8) -> Result<(), OutputFault>;
}

// ───────────────────────────────────────────────────────────────
// Event sink (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ persistent state)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage for the retained setpoints.
///
/// - Keys are namespaced to prevent collisions between subsystems.
/// - Writes MUST be atomic: no partial blob after a power loss.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from loading, validating or persisting configuration and
/// retained state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Nothing stored yet (first start).
    NotFound,
    /// Stored blob failed to deserialize.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage is full, or the caller's buffer is too small.
    Full,
    /// Generic I/O error.
    IoError,
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound => Self::NotFound,
            StorageError::Full => Self::StorageFull,
            StorageError::IoError => Self::IoError,
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Corrupted => write!(f, "corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for StorageError {}
