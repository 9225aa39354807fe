use basalt_common::{BasaltError, Result};

use crate::bit_array::BitPackedArray;

pub const LIGHT_ARRAY_BYTES: usize = 2048;
const SECTION_VOLUME: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Sky,
    Block,
}

/// Light levels (0-15) for one 16x16x16 section, four bits per block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightArray {
    levels: BitPackedArray,
}

impl LightArray {
    pub fn new() -> Self {
        Self {
            levels: BitPackedArray::new(SECTION_VOLUME, 4),
        }
    }

    pub fn filled(level: u8) -> Self {
        let mut array = Self::new();
        if level != 0 {
            for index in 0..SECTION_VOLUME {
                array.levels.set(index, level as u32);
            }
        }
        array
    }

    pub fn get(&self, index: usize) -> u8 {
        self.levels.get(index) as u8
    }

    pub fn set(&mut self, index: usize, level: u8) {
        self.levels.set(index, level.min(15) as u32);
    }

    pub fn is_dark(&self) -> bool {
        self.levels.words().iter().all(|word| *word == 0)
    }

    /// Nibble array as sent to the client: even index in the low nibble.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.levels
            .words()
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .collect()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != LIGHT_ARRAY_BYTES {
            return Err(BasaltError::Protocol(format!(
                "light array must be {} bytes, got {}",
                LIGHT_ARRAY_BYTES,
                bytes.len()
            )));
        }
        let mut array = Self::new();
        for (byte_index, byte) in bytes.iter().enumerate() {
            array.levels.set(byte_index * 2, (byte & 0x0F) as u32);
            array.levels.set(byte_index * 2 + 1, (byte >> 4) as u32);
        }
        Ok(array)
    }
}

impl Default for LightArray {
    fn default() -> Self {
        Self::new()
    }
}
