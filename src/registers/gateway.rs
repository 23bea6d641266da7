//! Cross-system register gateway.
//!
//! The only meeting point between the scan loop and external clients
//! (monitor, logger, heat-pump gateway, service tool).
//!
//! ```text
//!  clients ──submit()──▶ [ staged writes: bounded channel ] ──▶ scan start
//!  clients ◀─snapshot()─ [ latched RegisterImage (Copy)   ] ◀── scan end
//! ```
//!
//! - Writes are never applied mid-cycle: they wait in a bounded
//!   `embassy-sync` channel until the engine drains it at the start of the
//!   next scan.  `submit` never blocks; a full queue is `Busy`.
//! - The engine publishes one complete image per scan.  Readers copy the
//!   whole image under a critical section, so a read never mixes two
//!   cycles.  No lock outlives a single copy.
//! - Writes aimed at read-only regions are refused at submission and
//!   counted; value checks happen when the engine applies the write.

use core::cell::Cell;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;
use log::debug;

use crate::app::commands::{ClientId, RegisterWrite};
use crate::error::ValidationFault;
use crate::plant::PumpId;

use super::map::{Region, RegisterImage, locate, measure_addr, reset_target, runtime_offset};

/// Depth of the staged-write queue.
pub const STAGING_DEPTH: usize = 32;

/// Largest block a single read may return.
pub const MAX_READ_WORDS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayError {
    /// Refused without being staged.
    Rejected(ValidationFault),
    /// Staging queue full.
    Busy,
    /// Queue stayed full until the deadline.
    Timeout,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(e) => write!(f, "rejected: {e}"),
            Self::Busy => write!(f, "staging queue full"),
            Self::Timeout => write!(f, "timed out waiting for staging queue"),
        }
    }
}

impl std::error::Error for GatewayError {}

pub struct RegisterGateway {
    staged: Channel<CriticalSectionRawMutex, RegisterWrite, STAGING_DEPTH>,
    published: Mutex<CriticalSectionRawMutex, Cell<RegisterImage>>,
    faults: AtomicU32,
}

impl RegisterGateway {
    pub const fn new() -> Self {
        Self {
            staged: Channel::new(),
            published: Mutex::new(Cell::new(RegisterImage::empty())),
            faults: AtomicU32::new(0),
        }
    }

    // ── Client side ───────────────────────────────────────────

    /// Stage a write for the next scan.  Never blocks.
    pub fn submit(&self, write: RegisterWrite) -> Result<(), GatewayError> {
        if let Err(fault) = precheck(write.address) {
            self.record_fault();
            debug!(
                "Gateway: {} write to {} refused ({})",
                write.client, write.address, fault
            );
            return Err(GatewayError::Rejected(fault));
        }
        self.staged.try_send(write).map_err(|_| GatewayError::Busy)
    }

    /// Like [`submit`](Self::submit), retrying while the queue is full
    /// until `timeout` has passed.
    pub fn submit_with_timeout(
        &self,
        write: RegisterWrite,
        timeout: Duration,
    ) -> Result<(), GatewayError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.submit(write) {
                Err(GatewayError::Busy) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(1));
                }
                Err(GatewayError::Busy) => return Err(GatewayError::Timeout),
                other => return other,
            }
        }
    }

    /// Stage the targeted zero-write that resets one pump's counters.
    pub fn request_reset(&self, client: ClientId, pump: PumpId) -> Result<(), GatewayError> {
        self.submit(RegisterWrite::new(client, measure_addr(runtime_offset(pump)), 0))
    }

    /// Copy of the most recently published image.
    pub fn snapshot(&self) -> RegisterImage {
        self.published.lock(Cell::get)
    }

    pub fn read(&self, address: u16) -> Option<u16> {
        self.snapshot().read(address)
    }

    /// Read `count` consecutive registers from one snapshot.
    pub fn read_block(&self, start: u16, count: usize) -> Result<Vec<u16, MAX_READ_WORDS>, GatewayError> {
        let image = self.snapshot();
        let mut out = Vec::new();
        for i in 0..count {
            let word = u16::try_from(i)
                .ok()
                .and_then(|i| start.checked_add(i))
                .and_then(|addr| image.read(addr))
                .ok_or(GatewayError::Rejected(ValidationFault::UnknownAddress))?;
            out.push(word)
                .map_err(|_| GatewayError::Rejected(ValidationFault::OutOfRange))?;
        }
        Ok(out)
    }

    /// Rejected writes since start (submission and application).
    pub fn fault_count(&self) -> u32 {
        self.faults.load(Ordering::Relaxed)
    }

    /// Writes currently waiting for the next scan.
    pub fn pending(&self) -> usize {
        self.staged.len()
    }

    // ── Engine side ───────────────────────────────────────────

    pub(crate) fn take_staged(&self) -> Option<RegisterWrite> {
        self.staged.try_receive().ok()
    }

    pub(crate) fn publish(&self, image: RegisterImage) {
        self.published.lock(|cell| cell.set(image));
    }

    pub(crate) fn record_fault(&self) -> u32 {
        self.faults.fetch_add(1, Ordering::Relaxed).saturating_add(1)
    }
}

impl Default for RegisterGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Region-level check done at submission time.
fn precheck(address: u16) -> Result<(), ValidationFault> {
    match locate(address) {
        None => Err(ValidationFault::UnknownAddress),
        Some(Region::Setpoint(_)) => Ok(()),
        Some(Region::Measurement(off)) if reset_target(off).is_some() => Ok(()),
        Some(Region::Measurement(_) | Region::Diagnostics(_) | Region::Output) => {
            Err(ValidationFault::ReadOnly)
        }
    }
}
