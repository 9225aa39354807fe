use basalt_common::{PacketBuffer, Result};

use crate::packet::Packet;

/// Sets the chunk the client's view is centered on. Chunks outside the view
/// distance from it may be unloaded by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateViewPositionPacket {
    pub chunk_x: i32,
    pub chunk_z: i32,
}

impl UpdateViewPositionPacket {
    pub fn new(chunk_x: i32, chunk_z: i32) -> Self {
        UpdateViewPositionPacket { chunk_x, chunk_z }
    }
}

impl Packet for UpdateViewPositionPacket {
    fn packet_id() -> i32 {
        0x49
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(UpdateViewPositionPacket {
            chunk_x: buffer.read_varint()?,
            chunk_z: buffer.read_varint()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_varint(self.chunk_x);
        buffer.write_varint(self.chunk_z);
        Ok(())
    }
}
