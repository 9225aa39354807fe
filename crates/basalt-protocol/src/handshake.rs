use basalt_common::{ConnectionState, PacketBuffer, Result};

use crate::packet::Packet;

/// First packet of every connection. Selects STATUS or LOGIN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakePacket {
    pub protocol_version: i32,
    pub server_address: String,
    pub server_port: u16,
    pub next_state: i32,
}

impl HandshakePacket {
    /// The state requested by `next_state`, or an error for anything but 1 or 2.
    pub fn requested_state(&self) -> Result<ConnectionState> {
        ConnectionState::from_next_state(self.next_state)
    }
}

impl Packet for HandshakePacket {
    fn packet_id() -> i32 {
        0x00
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(HandshakePacket {
            protocol_version: buffer.read_varint()?,
            server_address: buffer.read_string_bounded(255)?,
            server_port: buffer.read_u16()?,
            next_state: buffer.read_varint()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_varint(self.protocol_version);
        buffer.write_string(&self.server_address)?;
        buffer.write_u16(self.server_port);
        buffer.write_varint(self.next_state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::RawPacket;

    #[test]
    fn test_handshake_layout() {
        let handshake = HandshakePacket {
            protocol_version: 758,
            server_address: "localhost".to_owned(),
            server_port: 25565,
            next_state: 2,
        };
        let raw = RawPacket::from_packet(&handshake).unwrap();
        assert_eq!(&raw.payload[..2], &[0xF6, 0x05]);
        assert_eq!(&raw.payload[raw.payload.len() - 3..], &[0x63, 0xDD, 0x02]);

        let decoded: HandshakePacket = raw.decode().unwrap();
        assert_eq!(decoded, handshake);
        assert_eq!(decoded.requested_state().unwrap(), ConnectionState::Login);
    }

    #[test]
    fn test_invalid_next_state() {
        let handshake = HandshakePacket {
            protocol_version: 758,
            server_address: String::new(),
            server_port: 1,
            next_state: 3,
        };
        assert!(handshake.requested_state().is_err());
    }
}
