use basalt_common::{Chat, PacketBuffer, Result};

use crate::packet::Packet;

/// Disconnect in PLAY. The LOGIN counterpart lives in `login`.
#[derive(Debug, Clone, PartialEq)]
pub struct DisconnectPacket {
    pub reason: Chat,
}

impl DisconnectPacket {
    pub fn new(reason: impl Into<Chat>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Packet for DisconnectPacket {
    fn packet_id() -> i32 {
        0x1A
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(DisconnectPacket {
            reason: buffer.read_chat()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_chat(&self.reason)
    }
}
