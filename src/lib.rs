//! heatctl: control decision engine for an oil-fired heating plant.
//!
//! Reads multiplexed temperature probes, decides the hot-water, heating
//! and well pumps once per scan, tracks their runtime, and exposes a
//! Modbus-style register map to external monitors, loggers and a
//! heat-pump gateway.  Pure logic lives in the library; field I/O,
//! storage and logging come in through the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod plant;
pub mod registers;
pub mod runtime;
pub mod safety;
pub mod schedule;
pub mod sensors;
pub mod setpoints;
