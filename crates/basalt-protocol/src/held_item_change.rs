use basalt_common::{BasaltError, PacketBuffer, Result};

use crate::packet::Packet;

/// Hotbar slot selected by the client, 0 to 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldItemChangePacket {
    pub slot: i16,
}

impl Packet for HeldItemChangePacket {
    fn packet_id() -> i32 {
        0x25
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        let slot = buffer.read_short()?;
        if !(0..=8).contains(&slot) {
            return Err(BasaltError::Protocol(format!(
                "hotbar slot {} out of range",
                slot
            )));
        }
        Ok(HeldItemChangePacket { slot })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_short(self.slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::RawPacket;

    #[test]
    fn test_slot_range() {
        let slot: HeldItemChangePacket = RawPacket::new(0x25, vec![0, 8]).decode().unwrap();
        assert_eq!(slot.slot, 8);
        assert!(RawPacket::new(0x25, vec![0, 9])
            .decode::<HeldItemChangePacket>()
            .is_err());
    }
}
