use basalt_common::{BasaltError, PacketBuffer, Result};

use crate::packet::Packet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Peaceful = 0,
    Easy = 1,
    Normal = 2,
    Hard = 3,
}

impl TryFrom<u8> for Difficulty {
    type Error = BasaltError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Difficulty::Peaceful),
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Normal),
            3 => Ok(Difficulty::Hard),
            other => Err(BasaltError::Protocol(format!("invalid difficulty {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerDifficultyPacket {
    pub difficulty: Difficulty,
    pub locked: bool,
}

impl Packet for ServerDifficultyPacket {
    fn packet_id() -> i32 {
        0x0E
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(ServerDifficultyPacket {
            difficulty: Difficulty::try_from(buffer.read_ubyte()?)?,
            locked: buffer.read_bool()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_ubyte(self.difficulty as u8);
        buffer.write_bool(self.locked);
        Ok(())
    }
}
