use std::fmt;
use std::fmt::{Display, Formatter};

use crate::error::BasaltError;
use crate::Result;

/// Protocol phase of a connection. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConnectionState {
    Handshake = 0,
    Status = 1,
    Login = 2,
    Play = 3,
}

impl ConnectionState {
    /// Maps the `next_state` field of a Handshake packet.
    pub fn from_next_state(value: i32) -> Result<Self> {
        match value {
            1 => Ok(ConnectionState::Status),
            2 => Ok(ConnectionState::Login),
            other => Err(BasaltError::Protocol(format!(
                "invalid handshake next state {}",
                other
            ))),
        }
    }

    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        matches!(
            (self, next),
            (ConnectionState::Handshake, ConnectionState::Status)
                | (ConnectionState::Handshake, ConnectionState::Login)
                | (ConnectionState::Login, ConnectionState::Play)
        )
    }

    pub fn transition_to(&mut self, next: ConnectionState) -> Result<()> {
        if !self.can_transition_to(next) {
            return Err(BasaltError::IllegalStateTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    /// Whether a disconnect packet exists in this state.
    pub fn supports_disconnect(self) -> bool {
        matches!(self, ConnectionState::Login | ConnectionState::Play)
    }
}

impl Display for ConnectionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Handshake => write!(f, "HANDSHAKE"),
            ConnectionState::Status => write!(f, "STATUS"),
            ConnectionState::Login => write!(f, "LOGIN"),
            ConnectionState::Play => write!(f, "PLAY"),
        }
    }
}
