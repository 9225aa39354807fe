use basalt_common::{BasaltError, Chat, PacketBuffer, Result};
use serde::{Deserialize, Serialize};

use crate::packet::Packet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub version: StatusVersion,
    pub players: StatusPlayers,
    pub description: Chat,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub favicon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusVersion {
    pub name: String,
    pub protocol: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPlayers {
    pub max: i32,
    pub online: i32,
    #[serde(default)]
    pub sample: Vec<StatusPlayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPlayer {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRequestPacket;

impl Packet for StatusRequestPacket {
    fn packet_id() -> i32 {
        0x00
    }

    fn read_from_buffer(_buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(StatusRequestPacket)
    }

    fn write_to_buffer(&self, _buffer: &mut PacketBuffer) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusResponsePacket {
    pub status: ServerStatus,
}

impl Packet for StatusResponsePacket {
    fn packet_id() -> i32 {
        0x00
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        let json = buffer.read_string()?;
        let status = serde_json::from_str(&json)
            .map_err(|e| BasaltError::Protocol(format!("invalid status JSON: {}", e)))?;
        Ok(StatusResponsePacket { status })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        let json = serde_json::to_string(&self.status)
            .map_err(|e| BasaltError::Protocol(e.to_string()))?;
        buffer.write_string(&json)
    }
}

/// Ping in STATUS. The server answers with a pong carrying the same payload,
/// which has the same id and layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingPacket {
    pub payload: i64,
}

impl Packet for PingPacket {
    fn packet_id() -> i32 {
        0x01
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(PingPacket {
            payload: buffer.read_long()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_long(self.payload);
        Ok(())
    }
}
