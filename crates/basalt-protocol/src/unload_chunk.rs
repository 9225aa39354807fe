use basalt_common::{PacketBuffer, Result};

use crate::packet::Packet;

/// Tells the client to forget a chunk column that left its view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnloadChunkPacket {
    pub chunk_x: i32,
    pub chunk_z: i32,
}

impl Packet for UnloadChunkPacket {
    fn packet_id() -> i32 {
        0x1D
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(UnloadChunkPacket {
            chunk_x: buffer.read_int()?,
            chunk_z: buffer.read_int()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_int(self.chunk_x);
        buffer.write_int(self.chunk_z);
        Ok(())
    }
}
