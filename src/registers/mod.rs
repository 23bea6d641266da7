//! Register map and the cross-system gateway.

pub mod gateway;
pub mod map;
pub mod status;

pub use gateway::{GatewayError, RegisterGateway};
pub use map::RegisterImage;
pub use status::StatusWord;
