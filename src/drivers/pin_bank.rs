//! Output pin bank.
//!
//! Drives one `embedded-hal` output pin per bit of the physical output
//! byte, for boards where %QB0 is a set of GPIOs rather than a fieldbus
//! output image.  The byte is applied bit by bit; the first failing pin
//! aborts the write and the next scan retries the full image.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::OutputPort;
use crate::error::OutputFault;

pub struct PinBank<P: OutputPin, const N: usize> {
    pins: [P; N],
    last: Option<u8>,
}

impl<P: OutputPin, const N: usize> PinBank<P, N> {
    /// `pins[i]` drives bit `i`.
    pub fn new(pins: [P; N]) -> Self {
        Self { pins, last: None }
    }

    /// Last byte written completely.
    pub fn last(&self) -> Option<u8> {
        self.last
    }

    pub fn pins(&self) -> &[P; N] {
        &self.pins
    }
}

impl<P: OutputPin, const N: usize> OutputPort for PinBank<P, N> {
    fn write_outputs(&mut self, image: u8) -> Result<(), OutputFault> {
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            let high = bit < 8 && image & (1 << bit) != 0;
            let res = if high { pin.set_high() } else { pin.set_low() };
            if res.is_err() {
                warn!("PinBank: bit {} write failed", bit);
                self.last = None;
                return Err(OutputFault::WriteFailed);
            }
        }
        self.last = Some(image);
        Ok(())
    }
}
