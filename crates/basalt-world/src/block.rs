//! Block state and biome ids used by the built-in generator.

pub const AIR: u32 = 0;
pub const STONE: u32 = 1;
pub const GRASS_BLOCK: u32 = 9;
pub const DIRT: u32 = 10;
pub const BEDROCK: u32 = 33;

pub const BIOME_THE_VOID: u32 = 0;
pub const BIOME_PLAINS: u32 = 1;
