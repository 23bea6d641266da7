//! Application core: scan orchestration with zero direct I/O.
//!
//! All interaction with field hardware, storage and logging happens
//! through the **port traits** defined in [`ports`], keeping this layer
//! fully testable with mock adapters.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
