use std::collections::HashMap;

use basalt_common::{BlockPosition, Position};
use log::debug;

use crate::chunk::Chunk;
use crate::generator::{ChunkGenerator, FlatGenerator};

/// Loaded chunk columns, generated on first access.
pub struct World {
    generator: Box<dyn ChunkGenerator>,
    chunks: HashMap<(i32, i32), Chunk>,
}

impl World {
    pub fn new(generator: Box<dyn ChunkGenerator>) -> Self {
        Self {
            generator,
            chunks: HashMap::new(),
        }
    }

    pub fn flat() -> Self {
        Self::new(Box::new(FlatGenerator::default()))
    }

    pub fn chunk(&mut self, chunk_x: i32, chunk_z: i32) -> &Chunk {
        self.chunk_mut(chunk_x, chunk_z)
    }

    pub fn chunk_mut(&mut self, chunk_x: i32, chunk_z: i32) -> &mut Chunk {
        let generator = &self.generator;
        self.chunks.entry((chunk_x, chunk_z)).or_insert_with(|| {
            debug!("Generating chunk ({}, {})", chunk_x, chunk_z);
            generator.generate(chunk_x, chunk_z)
        })
    }

    pub fn is_loaded(&self, chunk_x: i32, chunk_z: i32) -> bool {
        self.chunks.contains_key(&(chunk_x, chunk_z))
    }

    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn get_block(&mut self, position: BlockPosition) -> u32 {
        let chunk = self.chunk(position.x >> 4, position.z >> 4);
        chunk.get_block(
            (position.x & 15) as usize,
            position.y,
            (position.z & 15) as usize,
        )
    }

    pub fn set_block(&mut self, position: BlockPosition, state_id: u32) -> bool {
        let chunk = self.chunk_mut(position.x >> 4, position.z >> 4);
        chunk.set_block(
            (position.x & 15) as usize,
            position.y,
            (position.z & 15) as usize,
            state_id,
        )
    }

    pub fn min_y(&self) -> i32 {
        self.generator.min_y()
    }

    pub fn height(&self) -> u32 {
        self.generator.height()
    }

    /// Centre of the block column at the origin, standing on the terrain.
    pub fn spawn_position(&self) -> Position {
        Position::new(0.5, self.generator.spawn_height() as f64, 0.5)
    }

    /// Drops every chunk outside all of `views`, each a centre and a
    /// Chebyshev radius. Returns how many were dropped.
    pub fn retain_viewed(&mut self, views: &[((i32, i32), i32)]) -> usize {
        let before = self.chunks.len();
        self.chunks.retain(|&(x, z), _| {
            views.iter().any(|&((center_x, center_z), radius)| {
                (x - center_x).abs() <= radius && (z - center_z).abs() <= radius
            })
        });
        let dropped = before - self.chunks.len();
        if dropped > 0 {
            debug!("Unloaded {} chunks, {} remain", dropped, self.chunks.len());
        }
        dropped
    }

    /// Chunk coordinates within `view_distance` of `center`, nearest first.
    pub fn chunks_in_view(center: (i32, i32), view_distance: i32) -> Vec<(i32, i32)> {
        let mut chunks = Vec::with_capacity(((2 * view_distance + 1) * (2 * view_distance + 1)) as usize);
        for dx in -view_distance..=view_distance {
            for dz in -view_distance..=view_distance {
                chunks.push((center.0 + dx, center.1 + dz));
            }
        }
        chunks.sort_by_key(|(x, z)| {
            let (dx, dz) = (x - center.0, z - center.1);
            dx * dx + dz * dz
        });
        chunks
    }
}
