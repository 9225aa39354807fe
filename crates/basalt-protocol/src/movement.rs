//! Serverbound movement packets. All carry the on-ground flag last.

use basalt_common::{PacketBuffer, Position, Result, Rotation};

use crate::packet::Packet;

fn read_position(buffer: &mut PacketBuffer) -> Result<Position> {
    Ok(Position::new(
        buffer.read_double()?,
        buffer.read_double()?,
        buffer.read_double()?,
    ))
}

fn write_position(buffer: &mut PacketBuffer, position: &Position) {
    buffer.write_double(position.x);
    buffer.write_double(position.y);
    buffer.write_double(position.z);
}

fn read_rotation(buffer: &mut PacketBuffer) -> Result<Rotation> {
    Ok(Rotation {
        yaw: buffer.read_float()?,
        pitch: buffer.read_float()?,
    })
}

fn write_rotation(buffer: &mut PacketBuffer, rotation: &Rotation) {
    buffer.write_float(rotation.yaw);
    buffer.write_float(rotation.pitch);
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPositionPacket {
    pub position: Position,
    pub on_ground: bool,
}

impl Packet for PlayerPositionPacket {
    fn packet_id() -> i32 {
        0x11
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(PlayerPositionPacket {
            position: read_position(buffer)?,
            on_ground: buffer.read_bool()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        write_position(buffer, &self.position);
        buffer.write_bool(self.on_ground);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPositionAndRotationPacket {
    pub position: Position,
    pub rotation: Rotation,
    pub on_ground: bool,
}

impl Packet for PlayerPositionAndRotationPacket {
    fn packet_id() -> i32 {
        0x12
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(PlayerPositionAndRotationPacket {
            position: read_position(buffer)?,
            rotation: read_rotation(buffer)?,
            on_ground: buffer.read_bool()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        write_position(buffer, &self.position);
        write_rotation(buffer, &self.rotation);
        buffer.write_bool(self.on_ground);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRotationPacket {
    pub rotation: Rotation,
    pub on_ground: bool,
}

impl Packet for PlayerRotationPacket {
    fn packet_id() -> i32 {
        0x13
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(PlayerRotationPacket {
            rotation: read_rotation(buffer)?,
            on_ground: buffer.read_bool()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        write_rotation(buffer, &self.rotation);
        buffer.write_bool(self.on_ground);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerMovementPacket {
    pub on_ground: bool,
}

impl Packet for PlayerMovementPacket {
    fn packet_id() -> i32 {
        0x14
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(PlayerMovementPacket {
            on_ground: buffer.read_bool()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_bool(self.on_ground);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::RawPacket;
    use assert_matches::assert_matches;
    use basalt_common::BasaltError;

    #[test]
    fn test_position_and_rotation_decode() {
        let packet = PlayerPositionAndRotationPacket {
            position: Position::new(-12.5, 70.0, 3.25),
            rotation: Rotation {
                yaw: 180.0,
                pitch: -45.0,
            },
            on_ground: true,
        };
        let raw = RawPacket::from_packet(&packet).unwrap();
        assert_eq!(raw.payload.len(), 33);
        assert_eq!(raw.decode::<PlayerPositionAndRotationPacket>().unwrap(), packet);
    }

    #[test]
    fn test_bad_on_ground_byte() {
        let raw = RawPacket::new(0x14, vec![0x02]);
        assert_matches!(
            raw.decode::<PlayerMovementPacket>(),
            Err(BasaltError::InvalidBoolean(0x02))
        );
    }
}
