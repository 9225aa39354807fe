use std::mem;

use basalt_common::{BasaltError, PacketBuffer, Result};

use crate::bit_array::{needed_bits, BitPackedArray};

/// Width bounds for one kind of paletted container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteConfig {
    pub capacity: usize,
    /// Width of a freshly promoted indirect palette.
    pub min_bits: u8,
    /// Widest indirect palette before switching to direct ids.
    pub max_bits: u8,
    /// Width of direct (global) ids.
    pub global_bits: u8,
}

impl PaletteConfig {
    pub const BLOCKS: PaletteConfig = PaletteConfig {
        capacity: 4096,
        min_bits: 4,
        max_bits: 8,
        global_bits: 15,
    };

    pub const BIOMES: PaletteConfig = PaletteConfig {
        capacity: 64,
        min_bits: 1,
        max_bits: 3,
        global_bits: 6,
    };

    /// Largest number of distinct values an indirect palette can hold.
    pub fn indirect_cardinality(&self) -> usize {
        1 << self.max_bits
    }
}

/// Adaptive value storage. Promotes `SingleValue -> Indirect -> Direct` as the
/// number of distinct values grows and never demotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Palette {
    SingleValue {
        value: u32,
        config: PaletteConfig,
    },
    Indirect {
        palette: Vec<u32>,
        data: BitPackedArray,
        config: PaletteConfig,
    },
    Direct {
        data: BitPackedArray,
        config: PaletteConfig,
    },
}

impl Palette {
    pub fn single(value: u32, config: PaletteConfig) -> Self {
        Palette::SingleValue { value, config }
    }

    pub fn config(&self) -> PaletteConfig {
        match self {
            Palette::SingleValue { config, .. }
            | Palette::Indirect { config, .. }
            | Palette::Direct { config, .. } => *config,
        }
    }

    /// Width of the packed data, 0 for a single value.
    pub fn bits_per_value(&self) -> u8 {
        match self {
            Palette::SingleValue { .. } => 0,
            Palette::Indirect { data, .. } | Palette::Direct { data, .. } => {
                data.bits_per_value()
            }
        }
    }

    /// Palette entries, if this is an indirect palette.
    pub fn entries(&self) -> Option<&[u32]> {
        match self {
            Palette::Indirect { palette, .. } => Some(palette),
            _ => None,
        }
    }

    pub fn get(&self, index: usize) -> u32 {
        match self {
            Palette::SingleValue { value, config } => {
                assert!(
                    index < config.capacity,
                    "index {} out of bounds for capacity {}",
                    index,
                    config.capacity
                );
                *value
            }
            Palette::Indirect { palette, data, .. } => palette[data.get(index) as usize],
            Palette::Direct { data, .. } => data.get(index),
        }
    }

    /// Stores `value` at `index`, returning the palette that now holds it.
    pub fn set(self, index: usize, value: u32) -> Palette {
        match self {
            Palette::SingleValue {
                value: current,
                config,
            } => {
                if value == current {
                    return Palette::SingleValue {
                        value: current,
                        config,
                    };
                }
                assert!(
                    index < config.capacity,
                    "index {} out of bounds for capacity {}",
                    index,
                    config.capacity
                );
                let mut data = BitPackedArray::new(config.capacity, config.min_bits);
                data.set(index, 1);
                Palette::Indirect {
                    palette: vec![current, value],
                    data,
                    config,
                }
            }
            Palette::Indirect {
                mut palette,
                mut data,
                config,
            } => {
                let palette_index = match palette.iter().position(|entry| *entry == value) {
                    Some(position) => position,
                    None => {
                        let position = palette.len();
                        palette.push(value);

                        let bits = needed_bits(position as u32);
                        if bits > data.bits_per_value() {
                            if bits <= config.max_bits {
                                data = data.resize_bits(bits);
                            } else {
                                let direct = Palette::to_direct(&palette, &data, config);
                                return direct.set(index, value);
                            }
                        }
                        position
                    }
                };
                data.set(index, palette_index as u32);
                Palette::Indirect {
                    palette,
                    data,
                    config,
                }
            }
            Palette::Direct { mut data, config } => {
                data.set(index, value);
                Palette::Direct { data, config }
            }
        }
    }

    /// In-place form of `set` for owners that hold the palette by value.
    pub fn update(&mut self, index: usize, value: u32) {
        let config = self.config();
        let palette = mem::replace(self, Palette::single(0, config));
        *self = palette.set(index, value);
    }

    fn to_direct(palette: &[u32], data: &BitPackedArray, config: PaletteConfig) -> Palette {
        let mut direct = BitPackedArray::new(data.capacity(), config.global_bits);
        for (index, palette_index) in data.iter().enumerate() {
            direct.set(index, palette[palette_index as usize]);
        }
        Palette::Direct {
            data: direct,
            config,
        }
    }

    /// Number of slots holding a nonzero value.
    pub fn count_nonzero(&self) -> usize {
        match self {
            Palette::SingleValue { value: 0, .. } => 0,
            Palette::SingleValue { config, .. } => config.capacity,
            Palette::Indirect { palette, data, .. } => data
                .iter()
                .filter(|index| palette[*index as usize] != 0)
                .count(),
            Palette::Direct { data, .. } => data.iter().filter(|value| *value != 0).count(),
        }
    }

    pub fn write_to_buffer(&self, buffer: &mut PacketBuffer) {
        match self {
            Palette::SingleValue { value, .. } => {
                buffer.write_ubyte(0);
                buffer.write_varint(*value as i32);
                buffer.write_varint(0);
            }
            Palette::Indirect { palette, data, .. } => {
                buffer.write_ubyte(data.bits_per_value());
                buffer.write_varint(palette.len() as i32);
                for entry in palette {
                    buffer.write_varint(*entry as i32);
                }
                data.write_to_buffer(buffer);
            }
            Palette::Direct { data, .. } => {
                buffer.write_ubyte(data.bits_per_value());
                data.write_to_buffer(buffer);
            }
        }
    }

    pub fn read_from_buffer(buffer: &mut PacketBuffer, config: PaletteConfig) -> Result<Palette> {
        let start = buffer.read_offset();
        let result = Self::read_body(buffer, config);
        if result.is_err() {
            buffer.set_read_offset(start);
        }
        result
    }

    fn read_body(buffer: &mut PacketBuffer, config: PaletteConfig) -> Result<Palette> {
        let bits = buffer.read_ubyte()?;

        if bits == 0 {
            let value = read_id(buffer)?;
            let long_count = buffer.read_varint()?;
            if long_count != 0 {
                return Err(BasaltError::Protocol(format!(
                    "single value palette followed by {} longs",
                    long_count
                )));
            }
            return Ok(Palette::SingleValue { value, config });
        }

        if bits <= config.max_bits {
            let length = buffer.read_varint()?;
            if length <= 0 || length as usize > config.indirect_cardinality() {
                return Err(BasaltError::Protocol(format!(
                    "invalid palette length {}",
                    length
                )));
            }
            let mut palette = Vec::with_capacity(length as usize);
            for _ in 0..length {
                palette.push(read_id(buffer)?);
            }
            let bits = bits.max(config.min_bits);
            let data = BitPackedArray::read_from_buffer(buffer, config.capacity, bits)?;
            if let Some(bad) = data.iter().find(|index| *index as usize >= palette.len()) {
                return Err(BasaltError::Protocol(format!(
                    "palette index {} out of range for {} entries",
                    bad,
                    palette.len()
                )));
            }
            return Ok(Palette::Indirect {
                palette,
                data,
                config,
            });
        }

        if bits > 32 {
            return Err(BasaltError::Protocol(format!(
                "invalid bits per value {}",
                bits
            )));
        }
        let data = BitPackedArray::read_from_buffer(buffer, config.capacity, bits)?;
        Ok(Palette::Direct { data, config })
    }
}

fn read_id(buffer: &mut PacketBuffer) -> Result<u32> {
    let id = buffer.read_varint()?;
    if id < 0 {
        return Err(BasaltError::Protocol(format!("negative palette id {}", id)));
    }
    Ok(id as u32)
}
