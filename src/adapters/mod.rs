//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements            | Connects to                    |
//! |------------|-----------------------|--------------------------------|
//! | `log_sink` | EventSink             | `log` facade                   |
//! | `sim`      | InputPort, OutputPort | simulated boiler plant         |
//! | `storage`  | StoragePort           | memory map / state directory   |
//! | `time`     | (none)                | host monotonic + local clock   |
//!
//! The `embedded-hal` output adapter lives in
//! [`drivers::pin_bank`](crate::drivers::pin_bank).

pub mod log_sink;
pub mod sim;
pub mod storage;
pub mod time;
