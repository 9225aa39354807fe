//! Packets and framing for Minecraft Java Edition 1.18.2 (protocol 758).

pub mod chat;
pub mod chunk_data;
pub mod cipher;
pub mod client_settings;
pub mod crypto;
pub mod dimension;
pub mod disconnect;
pub mod entity_status;
pub mod frame;
pub mod handshake;
pub mod held_item_change;
pub mod join_game;
pub mod keep_alive;
pub mod login;
pub mod movement;
pub mod packet;
pub mod player_position_and_look;
pub mod plugin_message;
pub mod server_difficulty;
pub mod status;
pub mod unload_chunk;
pub mod update_view_position;

pub use basalt_common::{Chat, ConnectionState};
pub use frame::FrameCodec;
pub use packet::{Packet, RawPacket};
