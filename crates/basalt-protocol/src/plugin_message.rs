use basalt_common::{PacketBuffer, Result};

use crate::packet::Packet;

pub const BRAND_CHANNEL: &str = "minecraft:brand";

/// Custom payload on a namespaced channel, clientbound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMessagePacket {
    pub channel: String,
    pub data: Vec<u8>,
}

impl PluginMessagePacket {
    /// `minecraft:brand` carrying the server brand as a protocol string.
    pub fn brand(brand: &str) -> Result<Self> {
        let mut data = PacketBuffer::new();
        data.write_string(brand)?;
        Ok(Self {
            channel: BRAND_CHANNEL.to_owned(),
            data: data.into_inner(),
        })
    }
}

impl Packet for PluginMessagePacket {
    fn packet_id() -> i32 {
        0x18
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(PluginMessagePacket {
            channel: buffer.read_string()?,
            data: buffer.read_remaining(),
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_string(&self.channel)?;
        buffer.write_bytes(&self.data);
        Ok(())
    }
}

/// Custom payload sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientPluginMessagePacket {
    pub channel: String,
    pub data: Vec<u8>,
}

impl ClientPluginMessagePacket {
    /// The client brand, if this is a `minecraft:brand` message.
    pub fn brand(&self) -> Option<String> {
        if self.channel != BRAND_CHANNEL {
            return None;
        }
        PacketBuffer::from_bytes(self.data.clone())
            .read_string()
            .ok()
    }
}

impl Packet for ClientPluginMessagePacket {
    fn packet_id() -> i32 {
        0x0A
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(ClientPluginMessagePacket {
            channel: buffer.read_string()?,
            data: buffer.read_remaining(),
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_string(&self.channel)?;
        buffer.write_bytes(&self.data);
        Ok(())
    }
}
