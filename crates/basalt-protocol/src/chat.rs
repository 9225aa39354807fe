use basalt_common::{BasaltError, Chat, PacketBuffer, Result};
use uuid::Uuid;

use crate::packet::Packet;

/// Longest chat line a client may send.
pub const MAX_CHAT_LENGTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPosition {
    Chat = 0,
    System = 1,
    GameInfo = 2,
}

impl TryFrom<i8> for ChatPosition {
    type Error = BasaltError;

    fn try_from(value: i8) -> Result<Self> {
        match value {
            0 => Ok(ChatPosition::Chat),
            1 => Ok(ChatPosition::System),
            2 => Ok(ChatPosition::GameInfo),
            other => Err(BasaltError::Protocol(format!(
                "invalid chat position {}",
                other
            ))),
        }
    }
}

/// Clientbound chat line. A nil sender is always displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessagePacket {
    pub message: Chat,
    pub position: ChatPosition,
    pub sender: Uuid,
}

impl ChatMessagePacket {
    pub fn system(message: Chat) -> Self {
        Self {
            message,
            position: ChatPosition::System,
            sender: Uuid::nil(),
        }
    }

    pub fn player(message: Chat, sender: Uuid) -> Self {
        Self {
            message,
            position: ChatPosition::Chat,
            sender,
        }
    }
}

impl Packet for ChatMessagePacket {
    fn packet_id() -> i32 {
        0x0F
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(ChatMessagePacket {
            message: buffer.read_chat()?,
            position: ChatPosition::try_from(buffer.read_byte()?)?,
            sender: buffer.read_uuid()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_chat(&self.message)?;
        buffer.write_byte(self.position as i8);
        buffer.write_uuid(&self.sender);
        Ok(())
    }
}

/// Serverbound chat line or command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequestPacket {
    pub message: String,
}

impl Packet for ChatRequestPacket {
    fn packet_id() -> i32 {
        0x03
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        let message = buffer.read_string()?;
        let length = message.chars().count();
        if length > MAX_CHAT_LENGTH {
            return Err(BasaltError::InvalidStringLength {
                length: length as i64,
                max: MAX_CHAT_LENGTH,
            });
        }
        Ok(ChatRequestPacket { message })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_string(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::RawPacket;
    use assert_matches::assert_matches;

    #[test]
    fn test_system_message_layout() {
        let packet = ChatMessagePacket::system(Chat::text("hi").color("yellow"));
        let raw = RawPacket::from_packet(&packet).unwrap();
        let json = r#"{"text":"hi","color":"yellow"}"#;
        assert_eq!(raw.payload[0] as usize, json.len());
        assert_eq!(&raw.payload[1..=json.len()], json.as_bytes());
        assert_eq!(raw.payload[json.len() + 1], 1);
        assert!(raw.payload[json.len() + 2..].iter().all(|b| *b == 0));
        assert_eq!(raw.decode::<ChatMessagePacket>().unwrap(), packet);
    }

    #[test]
    fn test_chat_request_length_limit() {
        let ok = ChatRequestPacket {
            message: "x".repeat(MAX_CHAT_LENGTH),
        };
        let raw = RawPacket::from_packet(&ok).unwrap();
        assert_eq!(raw.decode::<ChatRequestPacket>().unwrap(), ok);

        let too_long = ChatRequestPacket {
            message: "x".repeat(MAX_CHAT_LENGTH + 1),
        };
        let raw = RawPacket::from_packet(&too_long).unwrap();
        assert_matches!(
            raw.decode::<ChatRequestPacket>(),
            Err(BasaltError::InvalidStringLength { length: 257, .. })
        );
    }

    #[test]
    fn test_invalid_position() {
        assert!(ChatPosition::try_from(3).is_err());
        assert_eq!(ChatPosition::try_from(2).unwrap(), ChatPosition::GameInfo);
    }
}
