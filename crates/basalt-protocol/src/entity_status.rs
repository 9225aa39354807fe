use basalt_common::{PacketBuffer, Result};

use crate::packet::Packet;

/// Status 24 through 28 set a player's op permission level 0 to 4.
pub const OP_PERMISSION_LEVEL_0: i8 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityStatusPacket {
    pub entity_id: i32,
    pub status: i8,
}

impl EntityStatusPacket {
    pub fn op_permission_level(entity_id: i32, level: u8) -> Self {
        Self {
            entity_id,
            status: OP_PERMISSION_LEVEL_0 + level.min(4) as i8,
        }
    }
}

impl Packet for EntityStatusPacket {
    fn packet_id() -> i32 {
        0x1B
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(EntityStatusPacket {
            entity_id: buffer.read_int()?,
            status: buffer.read_byte()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_int(self.entity_id);
        buffer.write_byte(self.status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_level_status() {
        assert_eq!(EntityStatusPacket::op_permission_level(1, 4).status, 28);
        assert_eq!(EntityStatusPacket::op_permission_level(1, 0).status, 24);
        assert_eq!(EntityStatusPacket::op_permission_level(1, 9).status, 28);
    }
}
