//! Output drivers: the polarity-aware output mapper and a GPIO pin bank.

pub mod outputs;
pub mod pin_bank;
