//! Paletted, bit-packed voxel storage and the chunk columns built on it.

pub mod bit_array;
pub mod block;
pub mod chunk;
pub mod generator;
pub mod heightmap;
pub mod light;
pub mod palette;
pub mod section;
pub mod world;

pub use bit_array::BitPackedArray;
pub use chunk::Chunk;
pub use generator::{ChunkGenerator, FlatGenerator};
pub use heightmap::Heightmap;
pub use light::{LightArray, LightKind};
pub use palette::{Palette, PaletteConfig};
pub use section::{BiomeSection, ChunkSection};
pub use world::World;
