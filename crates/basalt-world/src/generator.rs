use crate::block::{BEDROCK, BIOME_PLAINS, DIRT, GRASS_BLOCK};
use crate::chunk::Chunk;
use crate::light::{LightArray, LightKind};
use crate::section::block_index;

pub trait ChunkGenerator: Send + Sync {
    fn generate(&self, chunk_x: i32, chunk_z: i32) -> Chunk;

    /// Y of the first free block above the terrain at the spawn column.
    fn spawn_height(&self) -> i32;

    fn min_y(&self) -> i32;

    /// World height in blocks, a multiple of 16.
    fn height(&self) -> u32;
}

/// Stacks uniform layers from the bottom of the world upwards.
#[derive(Debug, Clone)]
pub struct FlatGenerator {
    layers: Vec<(u32, u32)>,
    biome: u32,
    min_y: i32,
    height: u32,
}

impl FlatGenerator {
    /// `layers` are `(state id, thickness)` pairs, bottom first.
    pub fn new(layers: Vec<(u32, u32)>, biome: u32, min_y: i32, height: u32) -> Self {
        Self {
            layers,
            biome,
            min_y,
            height,
        }
    }

    fn surface(&self) -> u32 {
        self.layers
            .iter()
            .map(|(_, thickness)| thickness)
            .sum::<u32>()
            .min(self.height)
    }

    fn light_sky(&self, chunk: &mut Chunk) {
        let surface = self.surface() as usize;
        let num_sections = chunk.num_sections();

        chunk.mark_light_empty(LightKind::Sky, 0);
        for section in 0..num_sections {
            let base = section * 16;
            let light_index = section + 1;
            if base >= surface {
                chunk.set_light_section(LightKind::Sky, light_index, LightArray::filled(15));
            } else if base + 16 <= surface {
                chunk.mark_light_empty(LightKind::Sky, light_index);
            } else {
                let mut array = LightArray::new();
                for y in (surface - base)..16 {
                    for z in 0..16 {
                        for x in 0..16 {
                            array.set(block_index(x, y, z), 15);
                        }
                    }
                }
                chunk.set_light_section(LightKind::Sky, light_index, array);
            }
        }
        chunk.set_light_section(LightKind::Sky, num_sections + 1, LightArray::filled(15));

        for light_index in 0..chunk.light_section_count() {
            chunk.mark_light_empty(LightKind::Block, light_index);
        }
    }
}

impl Default for FlatGenerator {
    /// Bedrock, two layers of dirt and grass on a 256 block tall plains world.
    fn default() -> Self {
        Self::new(
            vec![(BEDROCK, 1), (DIRT, 2), (GRASS_BLOCK, 1)],
            BIOME_PLAINS,
            0,
            256,
        )
    }
}

impl ChunkGenerator for FlatGenerator {
    fn generate(&self, chunk_x: i32, chunk_z: i32) -> Chunk {
        let mut chunk = Chunk::new(chunk_x, chunk_z, self.min_y, self.height);
        chunk.fill_biome(self.biome);

        let mut y = self.min_y;
        for (state_id, thickness) in &self.layers {
            for _ in 0..*thickness {
                for x in 0..16 {
                    for z in 0..16 {
                        chunk.set_block(x, y, z, *state_id);
                    }
                }
                y += 1;
            }
        }

        self.light_sky(&mut chunk);
        chunk
    }

    fn spawn_height(&self) -> i32 {
        self.min_y + self.surface() as i32
    }

    fn min_y(&self) -> i32 {
        self.min_y
    }

    fn height(&self) -> u32 {
        self.height
    }
}
