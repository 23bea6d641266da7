//! Field I/O assignments for the controller terminal block.
//!
//! Single source of truth: the sensor hub and the output mapper read their
//! wiring from here rather than hard-coding channel numbers or bits.

use crate::drivers::outputs::{OutputChannel, OutputId, Polarity};
use crate::plant::SensorId;
use crate::sensors::ChannelWiring;

// ---------------------------------------------------------------------------
// Analog inputs (%IW0..%IW3)
// ---------------------------------------------------------------------------

/// Number of analog input words read each cycle.
pub const ANALOG_CHANNELS: usize = 4;

/// Every analog channel is shared by two sensors through the mux relay.
pub const ANALOG_WIRING: [ChannelWiring; ANALOG_CHANNELS] = [
    ChannelWiring::Muxed { a: SensorId::Flow, b: SensorId::HotWater },
    ChannelWiring::Muxed { a: SensorId::Outdoor, b: SensorId::OilTank },
    ChannelWiring::Muxed { a: SensorId::Indoor, b: SensorId::Return },
    ChannelWiring::Muxed { a: SensorId::Boiler, b: SensorId::Solar },
];

// ---------------------------------------------------------------------------
// Digital inputs (%IX0.0..%IX0.7)
// ---------------------------------------------------------------------------

/// Only the low byte of the digital input word is wired.
pub const DIGITAL_INPUT_MASK: u16 = 0x00FF;

// ---------------------------------------------------------------------------
// Digital outputs (%QB0)
// ---------------------------------------------------------------------------

/// Hot-water and heating pumps hang on normally-closed relay contacts:
/// a de-energised output leaves them running.
pub const OUTPUT_TABLE: [OutputChannel; 5] = [
    OutputChannel { id: OutputId::MuxSelectA, bit: 0, polarity: Polarity::ActiveHigh },
    OutputChannel { id: OutputId::HotWaterPump, bit: 1, polarity: Polarity::ActiveLow },
    OutputChannel { id: OutputId::HeatingPump, bit: 2, polarity: Polarity::ActiveLow },
    OutputChannel { id: OutputId::WellPump, bit: 3, polarity: Polarity::ActiveHigh },
    OutputChannel { id: OutputId::MuxSelectB, bit: 4, polarity: Polarity::ActiveHigh },
];
