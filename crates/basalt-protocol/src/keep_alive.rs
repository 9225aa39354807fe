use basalt_common::{PacketBuffer, Result};

use crate::packet::Packet;

/// Sent by the server periodically; the client must echo the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlivePacket {
    pub keep_alive_id: i64,
}

impl KeepAlivePacket {
    pub fn new(keep_alive_id: i64) -> Self {
        Self { keep_alive_id }
    }
}

impl Packet for KeepAlivePacket {
    fn packet_id() -> i32 {
        0x21
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(KeepAlivePacket {
            keep_alive_id: buffer.read_long()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_long(self.keep_alive_id);
        Ok(())
    }
}

/// The client's echo of [`KeepAlivePacket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAliveResponsePacket {
    pub keep_alive_id: i64,
}

impl Packet for KeepAliveResponsePacket {
    fn packet_id() -> i32 {
        0x0F
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(KeepAliveResponsePacket {
            keep_alive_id: buffer.read_long()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_long(self.keep_alive_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::RawPacket;

    #[test]
    fn test_ids_differ_per_direction() {
        let request = RawPacket::from_packet(&KeepAlivePacket::new(1234)).unwrap();
        assert_eq!(request.id, 0x21);

        let echo = RawPacket::new(0x0F, request.payload.clone());
        let response: KeepAliveResponsePacket = echo.decode().unwrap();
        assert_eq!(response.keep_alive_id, 1234);
    }
}
