use basalt_common::{BasaltError, Result};

use crate::bit_array::needed_bits;

/// Per-column height of a chunk, stored as `height above min_y` of the first
/// free block. Packed into longs without entries straddling a long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heightmap {
    heights: Vec<u32>,
    bits_per_entry: u8,
}

impl Heightmap {
    pub fn new(world_height: u32) -> Self {
        Self {
            heights: vec![0; 256],
            bits_per_entry: needed_bits(world_height),
        }
    }

    pub fn bits_per_entry(&self) -> u8 {
        self.bits_per_entry
    }

    pub fn get(&self, x: usize, z: usize) -> u32 {
        self.heights[z * 16 + x]
    }

    pub fn set(&mut self, x: usize, z: usize, height: u32) {
        self.heights[z * 16 + x] = height;
    }

    pub fn to_longs(&self) -> Vec<i64> {
        let bits = self.bits_per_entry as usize;
        let per_long = 64 / bits;
        let mut longs = vec![0u64; (self.heights.len() + per_long - 1) / per_long];
        for (index, height) in self.heights.iter().enumerate() {
            let shift = (index % per_long) * bits;
            longs[index / per_long] |= (*height as u64) << shift;
        }
        longs.into_iter().map(|long| long as i64).collect()
    }

    pub fn from_longs(longs: &[i64], world_height: u32) -> Result<Self> {
        let mut heightmap = Self::new(world_height);
        let bits = heightmap.bits_per_entry as usize;
        let per_long = 64 / bits;
        let expected = (256 + per_long - 1) / per_long;
        if longs.len() != expected {
            return Err(BasaltError::Protocol(format!(
                "heightmap needs {} longs, got {}",
                expected,
                longs.len()
            )));
        }
        let mask = (1u64 << bits) - 1;
        for index in 0..256 {
            let long = longs[index / per_long] as u64;
            heightmap.heights[index] = ((long >> ((index % per_long) * bits)) & mask) as u32;
        }
        Ok(heightmap)
    }
}
