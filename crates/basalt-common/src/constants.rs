pub const PROTOCOL_VERSION: i32 = 758;
pub const GAME_VERSION: &str = "1.18.2";
pub const SERVER_BRAND: &str = "Basalt";

/// Maximum decoded string length, in bytes.
pub const MAX_STRING_LENGTH: usize = 32767;

/// Largest length a 3-byte VarInt can carry.
pub const MAX_FRAME_LENGTH: usize = 2_097_151;

pub const TICKS_PER_SECOND: u64 = 20;
