use basalt_common::{Chat, PacketBuffer, Result};
use uuid::Uuid;

use crate::packet::Packet;

pub const MAX_USERNAME_LENGTH: usize = 16;

/// Whether `name` is 2-16 characters of `[A-Za-z0-9_]`.
pub fn is_valid_username(name: &str) -> bool {
    (2..=MAX_USERNAME_LENGTH).contains(&name.len())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginStartPacket {
    pub username: String,
}

impl Packet for LoginStartPacket {
    fn packet_id() -> i32 {
        0x00
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(LoginStartPacket {
            username: buffer.read_string_bounded(MAX_USERNAME_LENGTH * 4)?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_string(&self.username)
    }
}

/// Sent when online encryption is on. `server_id` is always empty since 1.7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionRequestPacket {
    pub server_id: String,
    pub public_key: Vec<u8>,
    pub verify_token: Vec<u8>,
}

impl EncryptionRequestPacket {
    pub fn new(public_key: Vec<u8>, verify_token: Vec<u8>) -> Self {
        Self {
            server_id: String::new(),
            public_key,
            verify_token,
        }
    }
}

impl Packet for EncryptionRequestPacket {
    fn packet_id() -> i32 {
        0x01
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(EncryptionRequestPacket {
            server_id: buffer.read_string_bounded(20)?,
            public_key: buffer.read_byte_array()?,
            verify_token: buffer.read_byte_array()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_string(&self.server_id)?;
        buffer.write_byte_array(&self.public_key);
        buffer.write_byte_array(&self.verify_token);
        Ok(())
    }
}

/// Both fields are RSA encrypted with the server's public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionResponsePacket {
    pub shared_secret: Vec<u8>,
    pub verify_token: Vec<u8>,
}

impl Packet for EncryptionResponsePacket {
    fn packet_id() -> i32 {
        0x01
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(EncryptionResponsePacket {
            shared_secret: buffer.read_byte_array()?,
            verify_token: buffer.read_byte_array()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_byte_array(&self.shared_secret);
        buffer.write_byte_array(&self.verify_token);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccessPacket {
    pub uuid: Uuid,
    pub username: String,
}

impl Packet for LoginSuccessPacket {
    fn packet_id() -> i32 {
        0x02
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(LoginSuccessPacket {
            uuid: buffer.read_uuid()?,
            username: buffer.read_string_bounded(MAX_USERNAME_LENGTH * 4)?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_uuid(&self.uuid);
        buffer.write_string(&self.username)
    }
}

/// Frames after this one use the compressed layout. A negative threshold
/// would disable compression, so the server only sends non-negative ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCompressionPacket {
    pub threshold: i32,
}

impl Packet for SetCompressionPacket {
    fn packet_id() -> i32 {
        0x03
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(SetCompressionPacket {
            threshold: buffer.read_varint()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_varint(self.threshold);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginDisconnectPacket {
    pub reason: Chat,
}

impl Packet for LoginDisconnectPacket {
    fn packet_id() -> i32 {
        0x00
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(LoginDisconnectPacket {
            reason: buffer.read_chat()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_chat(&self.reason)
    }
}
