use basalt_common::{PacketBuffer, Position, Result, Rotation};

use crate::packet::Packet;

/// Player Position And Look (clientbound)
/// Moves the player and closes the "Downloading Terrain" screen when joining.
/// The client answers with a [`TeleportConfirmPacket`] carrying `teleport_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPositionAndLook {
    pub position: Position,
    pub rotation: Rotation,
    /// Bit field marking which fields are relative
    pub flags: u8,
    pub teleport_id: i32,
    pub dismount_vehicle: bool,
}

impl PlayerPositionAndLook {
    pub const RELATIVE_X: u8 = 0x01;
    pub const RELATIVE_Y: u8 = 0x02;
    pub const RELATIVE_Z: u8 = 0x04;
    pub const RELATIVE_Y_ROT: u8 = 0x08;
    pub const RELATIVE_X_ROT: u8 = 0x10;

    /// An absolute teleport.
    pub fn absolute(position: Position, rotation: Rotation, teleport_id: i32) -> Self {
        Self {
            position,
            rotation,
            flags: 0,
            teleport_id,
            dismount_vehicle: false,
        }
    }
}

impl Packet for PlayerPositionAndLook {
    fn packet_id() -> i32 {
        0x38
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(PlayerPositionAndLook {
            position: Position::new(
                buffer.read_double()?,
                buffer.read_double()?,
                buffer.read_double()?,
            ),
            rotation: Rotation {
                yaw: buffer.read_float()?,
                pitch: buffer.read_float()?,
            },
            flags: buffer.read_ubyte()?,
            teleport_id: buffer.read_varint()?,
            dismount_vehicle: buffer.read_bool()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_double(self.position.x);
        buffer.write_double(self.position.y);
        buffer.write_double(self.position.z);
        buffer.write_float(self.rotation.yaw);
        buffer.write_float(self.rotation.pitch);
        buffer.write_ubyte(self.flags);
        buffer.write_varint(self.teleport_id);
        buffer.write_bool(self.dismount_vehicle);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeleportConfirmPacket {
    pub teleport_id: i32,
}

impl Packet for TeleportConfirmPacket {
    fn packet_id() -> i32 {
        0x00
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(TeleportConfirmPacket {
            teleport_id: buffer.read_varint()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_varint(self.teleport_id);
        Ok(())
    }
}
