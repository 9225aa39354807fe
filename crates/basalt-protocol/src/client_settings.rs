use basalt_common::{PacketBuffer, Result};

use crate::packet::Packet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettingsPacket {
    pub locale: String,
    pub view_distance: i8,
    pub chat_mode: i32, // 0 = enabled, 1 = commands only, 2 = hidden
    pub chat_colors: bool,
    pub displayed_skin_parts: u8,
    pub main_hand: i32, // 0 = left, 1 = right
    pub enable_text_filtering: bool,
    pub allow_server_listings: bool,
}

impl Packet for ClientSettingsPacket {
    fn packet_id() -> i32 {
        0x05
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(Self {
            locale: buffer.read_string_bounded(16)?,
            view_distance: buffer.read_byte()?,
            chat_mode: buffer.read_varint()?,
            chat_colors: buffer.read_bool()?,
            displayed_skin_parts: buffer.read_ubyte()?,
            main_hand: buffer.read_varint()?,
            enable_text_filtering: buffer.read_bool()?,
            allow_server_listings: buffer.read_bool()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_string(&self.locale)?;
        buffer.write_byte(self.view_distance);
        buffer.write_varint(self.chat_mode);
        buffer.write_bool(self.chat_colors);
        buffer.write_ubyte(self.displayed_skin_parts);
        buffer.write_varint(self.main_hand);
        buffer.write_bool(self.enable_text_filtering);
        buffer.write_bool(self.allow_server_listings);
        Ok(())
    }
}
