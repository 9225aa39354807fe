use basalt_common::{PacketBuffer, Result};

use crate::palette::{Palette, PaletteConfig};

/// Slot of block `(x, y, z)` within a section, each coordinate in `0..16`.
pub fn block_index(x: usize, y: usize, z: usize) -> usize {
    debug_assert!(x < 16 && y < 16 && z < 16);
    (y << 8) | (z << 4) | x
}

/// Slot of biome cell `(x, y, z)` within a section, each coordinate in `0..4`.
pub fn biome_index(x: usize, y: usize, z: usize) -> usize {
    debug_assert!(x < 4 && y < 4 && z < 4);
    (y << 4) | (z << 2) | x
}

/// 16x16x16 block states plus a running count of non-air blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSection {
    blocks: Palette,
    solid_block_count: u16,
}

impl ChunkSection {
    pub fn new() -> Self {
        Self::filled(0)
    }

    pub fn filled(state_id: u32) -> Self {
        Self {
            blocks: Palette::single(state_id, PaletteConfig::BLOCKS),
            solid_block_count: if state_id == 0 { 0 } else { 4096 },
        }
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> u32 {
        self.blocks.get(block_index(x, y, z))
    }

    pub fn set(&mut self, x: usize, y: usize, z: usize, state_id: u32) {
        let index = block_index(x, y, z);
        let old = self.blocks.get(index);
        if old != 0 && state_id == 0 {
            self.solid_block_count -= 1;
        } else if old == 0 && state_id != 0 {
            self.solid_block_count += 1;
        }
        self.blocks.update(index, state_id);
    }

    pub fn solid_block_count(&self) -> u16 {
        self.solid_block_count
    }

    pub fn is_empty(&self) -> bool {
        self.solid_block_count == 0
    }

    pub fn palette(&self) -> &Palette {
        &self.blocks
    }

    /// Counts non-air blocks by visiting every slot.
    pub fn recount(&self) -> u16 {
        self.blocks.count_nonzero() as u16
    }

    pub fn write_to_buffer(&self, buffer: &mut PacketBuffer) {
        buffer.write_short(self.solid_block_count as i16);
        self.blocks.write_to_buffer(buffer);
    }

    /// Reads a section; the solid count is recomputed rather than trusted.
    pub fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        let start = buffer.read_offset();
        buffer.read_short()?;
        let blocks = match Palette::read_from_buffer(buffer, PaletteConfig::BLOCKS) {
            Ok(blocks) => blocks,
            Err(e) => {
                buffer.set_read_offset(start);
                return Err(e);
            }
        };
        let solid_block_count = blocks.count_nonzero() as u16;
        Ok(Self {
            blocks,
            solid_block_count,
        })
    }
}

impl Default for ChunkSection {
    fn default() -> Self {
        Self::new()
    }
}

/// Biomes of one section on a 4x4x4 grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiomeSection {
    biomes: Palette,
}

impl BiomeSection {
    pub fn filled(biome_id: u32) -> Self {
        Self {
            biomes: Palette::single(biome_id, PaletteConfig::BIOMES),
        }
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> u32 {
        self.biomes.get(biome_index(x, y, z))
    }

    pub fn set(&mut self, x: usize, y: usize, z: usize, biome_id: u32) {
        self.biomes.update(biome_index(x, y, z), biome_id);
    }

    pub fn palette(&self) -> &Palette {
        &self.biomes
    }

    pub fn write_to_buffer(&self, buffer: &mut PacketBuffer) {
        self.biomes.write_to_buffer(buffer);
    }

    pub fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(Self {
            biomes: Palette::read_from_buffer(buffer, PaletteConfig::BIOMES)?,
        })
    }
}
