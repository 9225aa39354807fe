use basalt_common::{BasaltError, PacketBuffer, Result};
use basalt_nbt::{Compound, Tag};

use crate::dimension;
use crate::packet::Packet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    Survival = 0,
    Creative = 1,
    Adventure = 2,
    Spectator = 3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinGamePacket {
    pub entity_id: i32,
    pub is_hardcore: bool,
    pub gamemode: GameMode,
    pub previous_gamemode: i8, // -1 if none
    pub world_names: Vec<String>,
    pub dimension_codec: Compound,
    pub dimension: Compound,
    pub world_name: String,
    pub hashed_seed: i64,
    pub max_players: i32, // ignored by the client
    pub view_distance: i32,
    pub simulation_distance: i32,
    pub reduced_debug_info: bool,
    pub enable_respawn_screen: bool,
    pub is_debug: bool,
    pub is_flat: bool,
}

impl JoinGamePacket {
    /// Creative mode in a flat overworld of `height` blocks from `min_y`.
    pub fn new(entity_id: i32, min_y: i32, height: u32) -> Self {
        Self {
            entity_id,
            is_hardcore: false,
            gamemode: GameMode::Creative,
            previous_gamemode: -1,
            world_names: vec![dimension::OVERWORLD.to_owned()],
            dimension_codec: dimension::dimension_codec(min_y, height),
            dimension: dimension::overworld(min_y, height),
            world_name: dimension::OVERWORLD.to_owned(),
            hashed_seed: 0,
            max_players: 20,
            view_distance: 4,
            simulation_distance: 4,
            reduced_debug_info: false,
            enable_respawn_screen: true,
            is_debug: false,
            is_flat: true,
        }
    }
}

fn read_root(buffer: &mut PacketBuffer) -> Result<Compound> {
    match Tag::read_named(buffer)? {
        (_, Tag::Compound(compound)) => Ok(compound),
        (_, other) => Err(BasaltError::Protocol(format!(
            "expected compound root, got tag type {}",
            other.type_id()
        ))),
    }
}

impl Packet for JoinGamePacket {
    fn packet_id() -> i32 {
        0x26
    }

    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        let entity_id = buffer.read_int()?;
        let is_hardcore = buffer.read_bool()?;
        let gamemode = match buffer.read_ubyte()? & 0x7 {
            0 => GameMode::Survival,
            1 => GameMode::Creative,
            2 => GameMode::Adventure,
            3 => GameMode::Spectator,
            other => {
                return Err(BasaltError::Protocol(format!("invalid game mode {}", other)))
            }
        };
        let previous_gamemode = buffer.read_byte()?;
        let world_count = buffer.read_varint()?;
        if !(0..=64).contains(&world_count) {
            return Err(BasaltError::Protocol(format!(
                "invalid world count {}",
                world_count
            )));
        }
        let mut world_names = Vec::with_capacity(world_count as usize);
        for _ in 0..world_count {
            world_names.push(buffer.read_string()?);
        }
        Ok(JoinGamePacket {
            entity_id,
            is_hardcore,
            gamemode,
            previous_gamemode,
            world_names,
            dimension_codec: read_root(buffer)?,
            dimension: read_root(buffer)?,
            world_name: buffer.read_string()?,
            hashed_seed: buffer.read_long()?,
            max_players: buffer.read_varint()?,
            view_distance: buffer.read_varint()?,
            simulation_distance: buffer.read_varint()?,
            reduced_debug_info: buffer.read_bool()?,
            enable_respawn_screen: buffer.read_bool()?,
            is_debug: buffer.read_bool()?,
            is_flat: buffer.read_bool()?,
        })
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_int(self.entity_id);
        buffer.write_bool(self.is_hardcore);
        buffer.write_ubyte(self.gamemode as u8);
        buffer.write_byte(self.previous_gamemode);

        buffer.write_varint(self.world_names.len() as i32);
        for world_name in &self.world_names {
            buffer.write_string(world_name)?;
        }

        basalt_nbt::write_root(buffer, "", &self.dimension_codec)?;
        basalt_nbt::write_root(buffer, "", &self.dimension)?;

        buffer.write_string(&self.world_name)?;
        buffer.write_long(self.hashed_seed);
        buffer.write_varint(self.max_players);
        buffer.write_varint(self.view_distance);
        buffer.write_varint(self.simulation_distance);
        buffer.write_bool(self.reduced_debug_info);
        buffer.write_bool(self.enable_respawn_screen);
        buffer.write_bool(self.is_debug);
        buffer.write_bool(self.is_flat);
        Ok(())
    }
}
