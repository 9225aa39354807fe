use thiserror::Error;

use crate::state::ConnectionState;

#[derive(Debug, Error)]
pub enum BasaltError {
    /// Not enough bytes buffered yet. The only recoverable error.
    #[error("out of bounds read: needed {needed} bytes, {remaining} remaining")]
    OutOfBounds { needed: usize, remaining: usize },
    #[error("VarInt too big")]
    VarIntTooBig,
    #[error("VarLong too big")]
    VarLongTooBig,
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBoolean(u8),
    #[error("invalid UUID {0:?}")]
    InvalidUuid(String),
    #[error("invalid string length {length} (max {max})")]
    InvalidStringLength { length: i64, max: usize },
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
    #[error("frame of {0} bytes exceeds the maximum frame length")]
    FrameTooLarge(usize),
    #[error("decompressed length mismatch: expected {expected}, got {actual}")]
    DecompressedLengthMismatch { expected: usize, actual: usize },
    #[error("unknown packet 0x{id:02X} in state {state}")]
    UnknownPacket { state: ConnectionState, id: i32 },
    #[error("illegal state transition from {from} to {to}")]
    IllegalStateTransition {
        from: ConnectionState,
        to: ConnectionState,
    },
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("crypto error: {0}")]
    Crypto(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BasaltError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BasaltError::OutOfBounds { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_recoverable() {
        assert!(BasaltError::OutOfBounds {
            needed: 4,
            remaining: 1
        }
        .is_recoverable());
        assert!(!BasaltError::VarIntTooBig.is_recoverable());
        assert!(!BasaltError::InvalidBoolean(2).is_recoverable());
    }

    #[test]
    fn test_display() {
        assert_eq!(BasaltError::VarIntTooBig.to_string(), "VarInt too big");
        assert_eq!(
            BasaltError::UnknownPacket {
                state: ConnectionState::Login,
                id: 0x7F
            }
            .to_string(),
            "unknown packet 0x7F in state LOGIN"
        );
        assert_eq!(
            BasaltError::InvalidBoolean(2).to_string(),
            "invalid boolean byte 0x02"
        );
    }

    #[test]
    fn test_io_error_source() {
        let err: BasaltError =
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed").into();
        assert!(err.source().is_some());
        assert!(err.to_string().contains("pipe closed"));
    }
}
