use basalt_common::{BasaltError, PacketBuffer, Result};
use basalt_nbt::{Compound, Tag};
use basalt_world::Chunk;

use crate::packet::Packet;

/// Chunk Data And Update Light. Carries every section of a column, its
/// heightmaps and its light.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDataPacket {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub heightmaps: Compound,
    /// Sections and biomes as written by [`Chunk::dump`], without the
    /// length prefix.
    pub data: Vec<u8>,
    pub trust_edges: bool,
    /// Light masks and arrays as written by [`Chunk::dump_light`].
    pub light: Vec<u8>,
}

impl ChunkDataPacket {
    pub fn from_chunk(chunk: &Chunk) -> Result<Self> {
        let mut sections = PacketBuffer::new();
        chunk.dump(&mut sections);

        let mut light = PacketBuffer::new();
        chunk.dump_light(&mut light);

        Ok(Self {
            chunk_x: chunk.x(),
            chunk_z: chunk.z(),
            heightmaps: chunk.heightmaps(),
            data: sections.read_byte_array()?,
            trust_edges: true,
            light: light.into_inner(),
        })
    }

    /// Replaces the sections of `chunk` with the ones in this packet.
    pub fn load_sections(&self, chunk: &mut Chunk) -> Result<()> {
        let mut buffer = PacketBuffer::new();
        buffer.write_byte_array(&self.data);
        chunk.load_sections(&mut buffer)
    }
}

impl Packet for ChunkDataPacket {
    fn packet_id() -> i32 {
        0x22
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        let chunk_x = buffer.read_int()?;
        let chunk_z = buffer.read_int()?;
        let heightmaps = match Tag::read_named(buffer)? {
            (_, Tag::Compound(compound)) => compound,
            _ => {
                return Err(BasaltError::Protocol(
                    "heightmaps must be a compound".to_owned(),
                ))
            }
        };
        let data = buffer.read_byte_array()?;
        let block_entities = buffer.read_varint()?;
        if block_entities != 0 {
            return Err(BasaltError::Protocol(format!(
                "{} block entities are not supported",
                block_entities
            )));
        }
        Ok(ChunkDataPacket {
            chunk_x,
            chunk_z,
            heightmaps,
            data,
            trust_edges: buffer.read_bool()?,
            light: buffer.read_remaining(),
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_int(self.chunk_x);
        buffer.write_int(self.chunk_z);
        basalt_nbt::write_root(buffer, "", &self.heightmaps)?;
        buffer.write_byte_array(&self.data);
        buffer.write_varint(0);
        buffer.write_bool(self.trust_edges);
        buffer.write_bytes(&self.light);
        Ok(())
    }
}
