use basalt_common::{BasaltError, PacketBuffer, Result};

/// A packet of one connection state. Implementors encode the payload only;
/// the packet id is written by the frame codec.
pub trait Packet {
    /// Packet ID
    fn packet_id() -> i32
    where
        Self: Sized;

    /// Reads the packet payload. Clientbound packets keep the default.
    fn read_from_buffer(_buffer: &mut PacketBuffer) -> Result<Self>
    where
        Self: Sized,
    {
        Err(BasaltError::Protocol(format!(
            "{} is not readable by the server",
            std::any::type_name::<Self>()
        )))
    }

    /// Writes the packet payload. Serverbound packets keep the default.
    fn write_to_buffer(&self, _buffer: &mut PacketBuffer) -> Result<()> {
        Err(BasaltError::Protocol(format!(
            "{} is not writable by the server",
            std::any::type_name::<Self>()
        )))
    }
}

/// One decoded frame: the packet id and the undecoded payload behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    pub id: i32,
    pub payload: Vec<u8>,
}

impl RawPacket {
    pub fn new(id: i32, payload: Vec<u8>) -> Self {
        Self { id, payload }
    }

    pub fn from_packet<P: Packet>(packet: &P) -> Result<Self> {
        let mut buffer = PacketBuffer::new();
        packet.write_to_buffer(&mut buffer)?;
        Ok(Self::new(P::packet_id(), buffer.into_inner()))
    }

    /// Decodes the payload as `P`. Trailing bytes are a protocol error.
    pub fn decode<P: Packet>(&self) -> Result<P> {
        if self.id != P::packet_id() {
            return Err(BasaltError::Protocol(format!(
                "expected packet 0x{:02X}, got 0x{:02X}",
                P::packet_id(),
                self.id
            )));
        }
        let mut buffer = PacketBuffer::from_bytes(self.payload.clone());
        let packet = P::read_from_buffer(&mut buffer).map_err(|e| match e {
            // A short payload can never be completed by later bytes
            BasaltError::OutOfBounds { needed, remaining } => BasaltError::Protocol(format!(
                "packet 0x{:02X} truncated: needed {} bytes, {} remaining",
                self.id, needed, remaining
            )),
            other => other,
        })?;
        if buffer.remaining() != 0 {
            return Err(BasaltError::Protocol(format!(
                "packet 0x{:02X} has {} trailing bytes",
                self.id,
                buffer.remaining()
            )));
        }
        Ok(packet)
    }
}
