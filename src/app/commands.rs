//! Inbound register writes from external clients.
//!
//! External clients never touch engine state directly: they submit a
//! [`RegisterWrite`] to the [`RegisterGateway`](crate::registers::gateway::RegisterGateway),
//! and the [`ControlEngine`](super::service::ControlEngine) applies staged
//! writes at the start of its next scan.

use core::fmt;

/// Who is writing.  Write authority is checked per register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientId {
    /// Operator panel / monitoring client: setpoints, overrides, resets.
    Operator,
    /// Service tool: same rights as the operator.
    Maintenance,
    /// Heat-pump logger: may write only the auxiliary tank temperature.
    AuxGateway,
}

impl ClientId {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "operator" | "op" => Some(Self::Operator),
            "maintenance" | "mt" => Some(Self::Maintenance),
            "aux" | "gateway" => Some(Self::AuxGateway),
            _ => None,
        }
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operator => write!(f, "operator"),
            Self::Maintenance => write!(f, "maintenance"),
            Self::AuxGateway => write!(f, "aux-gateway"),
        }
    }
}

/// One staged write of a single holding register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    pub client: ClientId,
    pub address: u16,
    pub value: u16,
}

impl RegisterWrite {
    pub const fn new(client: ClientId, address: u16, value: u16) -> Self {
        Self {
            client,
            address,
            value,
        }
    }
}
