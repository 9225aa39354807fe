use basalt_common::{BasaltError, PacketBuffer, Result};
use basalt_nbt::Compound;

use crate::bit_array::BitPackedArray;
use crate::heightmap::Heightmap;
use crate::light::{LightArray, LightKind, LIGHT_ARRAY_BYTES};
use crate::section::{block_index, BiomeSection, ChunkSection};

/// A 16-wide column of sections from `min_y` up to `min_y + height`.
///
/// Light is tracked for `num_sections + 2` light sections: index 0 is the
/// section below the world, index `i + 1` is block section `i`, and the last
/// index is the section above the world.
#[derive(Debug, Clone)]
pub struct Chunk {
    x: i32,
    z: i32,
    min_y: i32,
    height: u32,
    sections: Vec<ChunkSection>,
    biomes: Vec<BiomeSection>,

    sky_light_mask: BitPackedArray,
    empty_sky_light_mask: BitPackedArray,
    sky_light: Vec<Option<LightArray>>,

    block_light_mask: BitPackedArray,
    empty_block_light_mask: BitPackedArray,
    block_light: Vec<Option<LightArray>>,
}

impl Chunk {
    pub fn new(x: i32, z: i32, min_y: i32, height: u32) -> Self {
        assert!(
            height > 0 && height % 16 == 0,
            "world height must be a positive multiple of 16, got {}",
            height
        );
        let num_sections = (height / 16) as usize;
        let light_sections = num_sections + 2;

        Self {
            x,
            z,
            min_y,
            height,
            sections: vec![ChunkSection::new(); num_sections],
            biomes: vec![BiomeSection::filled(0); num_sections],
            sky_light_mask: BitPackedArray::new(light_sections, 1),
            empty_sky_light_mask: BitPackedArray::new(light_sections, 1),
            sky_light: vec![None; light_sections],
            block_light_mask: BitPackedArray::new(light_sections, 1),
            empty_block_light_mask: BitPackedArray::new(light_sections, 1),
            block_light: vec![None; light_sections],
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn num_sections(&self) -> usize {
        self.sections.len()
    }

    pub fn light_section_count(&self) -> usize {
        self.sections.len() + 2
    }

    pub fn sections(&self) -> &[ChunkSection] {
        &self.sections
    }

    pub fn biome_sections(&self) -> &[BiomeSection] {
        &self.biomes
    }

    /// Section index and the y offset inside it, if `y` is inside the world.
    fn locate(&self, y: i32) -> Option<(usize, usize)> {
        if y < self.min_y || y >= self.min_y + self.height as i32 {
            return None;
        }
        let relative = (y - self.min_y) as usize;
        Some((relative >> 4, relative & 15))
    }

    pub fn get_block(&self, x: usize, y: i32, z: usize) -> u32 {
        match self.locate(y) {
            Some((section, local_y)) => self.sections[section].get(x, local_y, z),
            None => 0,
        }
    }

    /// Returns false if `y` is outside the world.
    pub fn set_block(&mut self, x: usize, y: i32, z: usize, state_id: u32) -> bool {
        match self.locate(y) {
            Some((section, local_y)) => {
                self.sections[section].set(x, local_y, z, state_id);
                true
            }
            None => false,
        }
    }

    pub fn get_biome(&self, x: usize, y: i32, z: usize) -> u32 {
        match self.locate(y) {
            Some((section, local_y)) => self.biomes[section].get(x >> 2, local_y >> 2, z >> 2),
            None => 0,
        }
    }

    pub fn set_biome(&mut self, x: usize, y: i32, z: usize, biome_id: u32) -> bool {
        match self.locate(y) {
            Some((section, local_y)) => {
                self.biomes[section].set(x >> 2, local_y >> 2, z >> 2, biome_id);
                true
            }
            None => false,
        }
    }

    pub fn fill_biome(&mut self, biome_id: u32) {
        for biomes in &mut self.biomes {
            *biomes = BiomeSection::filled(biome_id);
        }
    }

    fn light_parts(
        &mut self,
        kind: LightKind,
    ) -> (
        &mut BitPackedArray,
        &mut BitPackedArray,
        &mut Vec<Option<LightArray>>,
    ) {
        match kind {
            LightKind::Sky => (
                &mut self.sky_light_mask,
                &mut self.empty_sky_light_mask,
                &mut self.sky_light,
            ),
            LightKind::Block => (
                &mut self.block_light_mask,
                &mut self.empty_block_light_mask,
                &mut self.block_light,
            ),
        }
    }

    fn light_arrays(&self, kind: LightKind) -> &[Option<LightArray>] {
        match kind {
            LightKind::Sky => &self.sky_light,
            LightKind::Block => &self.block_light,
        }
    }

    pub fn get_light(&self, kind: LightKind, x: usize, y: i32, z: usize) -> u8 {
        let Some((section, local_y)) = self.locate(y) else {
            return 0;
        };
        match &self.light_arrays(kind)[section + 1] {
            Some(array) => array.get(block_index(x, local_y, z)),
            None => 0,
        }
    }

    /// Sets one light level, creating the section's light array on demand.
    pub fn set_light(&mut self, kind: LightKind, x: usize, y: i32, z: usize, level: u8) -> bool {
        let Some((section, local_y)) = self.locate(y) else {
            return false;
        };
        let light_index = section + 1;
        let (mask, empty_mask, arrays) = self.light_parts(kind);

        if arrays[light_index].is_none() {
            if level == 0 {
                return true;
            }
            arrays[light_index] = Some(LightArray::new());
            mask.set(light_index, 1);
            empty_mask.set(light_index, 0);
        }
        if let Some(array) = arrays[light_index].as_mut() {
            array.set(block_index(x, local_y, z), level);
        }
        true
    }

    pub fn set_sky_light(&mut self, x: usize, y: i32, z: usize, level: u8) -> bool {
        self.set_light(LightKind::Sky, x, y, z, level)
    }

    pub fn set_block_light(&mut self, x: usize, y: i32, z: usize, level: u8) -> bool {
        self.set_light(LightKind::Block, x, y, z, level)
    }

    /// Replaces a whole light section.
    pub fn set_light_section(&mut self, kind: LightKind, light_index: usize, array: LightArray) {
        let (mask, empty_mask, arrays) = self.light_parts(kind);
        arrays[light_index] = Some(array);
        mask.set(light_index, 1);
        empty_mask.set(light_index, 0);
    }

    /// Flags a light section as all zero, dropping any stored array.
    pub fn mark_light_empty(&mut self, kind: LightKind, light_index: usize) {
        let (mask, empty_mask, arrays) = self.light_parts(kind);
        arrays[light_index] = None;
        mask.set(light_index, 0);
        empty_mask.set(light_index, 1);
    }

    pub fn has_light(&self, kind: LightKind, light_index: usize) -> bool {
        self.light_arrays(kind)[light_index].is_some()
    }

    /// Writes every section with its biomes, prefixed by the total byte length.
    pub fn dump(&self, buffer: &mut PacketBuffer) {
        let mut staging = PacketBuffer::new();
        for (section, biomes) in self.sections.iter().zip(&self.biomes) {
            section.write_to_buffer(&mut staging);
            biomes.write_to_buffer(&mut staging);
        }
        buffer.write_byte_array(staging.as_slice());
    }

    /// Replaces all sections with the ones encoded by `dump`.
    pub fn load_sections(&mut self, buffer: &mut PacketBuffer) -> Result<()> {
        let mut data = PacketBuffer::from_bytes(buffer.read_byte_array()?);
        let mut sections = Vec::with_capacity(self.sections.len());
        let mut biomes = Vec::with_capacity(self.biomes.len());
        for _ in 0..self.sections.len() {
            sections.push(ChunkSection::read_from_buffer(&mut data)?);
            biomes.push(BiomeSection::read_from_buffer(&mut data)?);
        }
        if data.remaining() != 0 {
            return Err(BasaltError::Protocol(format!(
                "{} trailing bytes after chunk sections",
                data.remaining()
            )));
        }
        self.sections = sections;
        self.biomes = biomes;
        Ok(())
    }

    /// Writes the four light masks, then the sky and block light arrays.
    pub fn dump_light(&self, buffer: &mut PacketBuffer) {
        self.sky_light_mask.write_to_buffer(buffer);
        self.block_light_mask.write_to_buffer(buffer);
        self.empty_sky_light_mask.write_to_buffer(buffer);
        self.empty_block_light_mask.write_to_buffer(buffer);

        for (mask, arrays) in [
            (&self.sky_light_mask, &self.sky_light),
            (&self.block_light_mask, &self.block_light),
        ] {
            let present: Vec<&LightArray> = (0..mask.capacity())
                .filter(|index| mask.get(*index) == 1)
                .map(|index| match &arrays[index] {
                    Some(array) => array,
                    None => panic!("light mask bit {} set without light data", index),
                })
                .collect();

            buffer.write_varint(present.len() as i32);
            for array in present {
                buffer.write_varint(LIGHT_ARRAY_BYTES as i32);
                buffer.write_bytes(&array.to_bytes());
            }
        }
    }

    /// Height of the first air block above the highest non-air block, per column.
    pub fn compute_heightmap(&self) -> Heightmap {
        let mut heightmap = Heightmap::new(self.height);
        for x in 0..16 {
            for z in 0..16 {
                let top = self
                    .sections
                    .iter()
                    .enumerate()
                    .rev()
                    .filter(|(_, section)| !section.is_empty())
                    .find_map(|(index, section)| {
                        (0..16)
                            .rev()
                            .find(|y| section.get(x, *y, z) != 0)
                            .map(|y| (index * 16 + y + 1) as u32)
                    });
                heightmap.set(x, z, top.unwrap_or(0));
            }
        }
        heightmap
    }

    /// `MOTION_BLOCKING` and `WORLD_SURFACE` heightmaps. Every non-air block
    /// counts as motion blocking.
    pub fn heightmaps(&self) -> Compound {
        let longs = self.compute_heightmap().to_longs();
        Compound::new()
            .with("MOTION_BLOCKING", longs.clone())
            .with("WORLD_SURFACE", longs)
    }
}
