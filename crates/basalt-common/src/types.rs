use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, crate::error::BasaltError>;

/// Entity position in world coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Chunk column containing this position.
    pub fn chunk(&self) -> (i32, i32) {
        ((self.x.floor() as i32) >> 4, (self.z.floor() as i32) >> 4)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub yaw: f32,
    pub pitch: f32,
}

/// Integer block coordinates, packed on the wire as `x:26 | z:26 | y:12`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn pack(&self) -> u64 {
        (((self.x as u64) & 0x3FF_FFFF) << 38)
            | (((self.z as u64) & 0x3FF_FFFF) << 12)
            | ((self.y as u64) & 0xFFF)
    }

    pub fn unpack(value: u64) -> Self {
        let value = value as i64;
        Self {
            x: (value >> 38) as i32,
            y: ((value << 52) >> 52) as i32,
            z: ((value << 26) >> 38) as i32,
        }
    }
}
