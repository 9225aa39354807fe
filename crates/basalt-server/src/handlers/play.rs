use basalt_common::constants::SERVER_BRAND;
use basalt_common::{BasaltError, Chat, ConnectionState, Position, Result, Rotation};
use basalt_protocol::chat::{ChatMessagePacket, ChatRequestPacket};
use basalt_protocol::chunk_data::ChunkDataPacket;
use basalt_protocol::client_settings::ClientSettingsPacket;
use basalt_protocol::entity_status::EntityStatusPacket;
use basalt_protocol::held_item_change::HeldItemChangePacket;
use basalt_protocol::join_game::JoinGamePacket;
use basalt_protocol::keep_alive::KeepAliveResponsePacket;
use basalt_protocol::movement::{
    PlayerMovementPacket, PlayerPositionAndRotationPacket, PlayerPositionPacket,
    PlayerRotationPacket,
};
use basalt_protocol::player_position_and_look::{PlayerPositionAndLook, TeleportConfirmPacket};
use basalt_protocol::plugin_message::{ClientPluginMessagePacket, PluginMessagePacket};
use basalt_protocol::server_difficulty::{Difficulty, ServerDifficultyPacket};
use basalt_protocol::unload_chunk::UnloadChunkPacket;
use basalt_protocol::update_view_position::UpdateViewPositionPacket;
use futures::future::BoxFuture;
use futures::FutureExt;
use log::{debug, info, warn};
use std::sync::Arc;

use crate::connection::Connection;
use crate::handlers::HandlerRegistry;
use crate::session::PlayerSession;

/// Coordinates past this are rejected, like the vanilla world border.
pub const MAX_COORDINATE: f64 = 3.0e7;
pub const OP_LEVEL: u8 = 4;
pub const ILLEGAL_CHAT: &str = "Illegal characters in chat";
pub const INVALID_MOVE: &str = "Invalid move player packet received";

pub(super) fn register(registry: &mut HandlerRegistry) {
    use ConnectionState::Play;
    registry.register::<TeleportConfirmPacket>(Play, teleport_confirm);
    registry.register::<ChatRequestPacket>(Play, chat);
    registry.register::<ClientSettingsPacket>(Play, client_settings);
    registry.register::<ClientPluginMessagePacket>(Play, plugin_message);
    registry.register::<KeepAliveResponsePacket>(Play, keep_alive);
    registry.register::<PlayerPositionPacket>(Play, position);
    registry.register::<PlayerPositionAndRotationPacket>(Play, position_and_rotation);
    registry.register::<PlayerRotationPacket>(Play, rotation);
    registry.register::<PlayerMovementPacket>(Play, movement);
    registry.register::<HeldItemChangePacket>(Play, held_item_change);
}

/// Chat may not carry the section sign, control characters or DEL.
pub fn is_legal_chat(message: &str) -> bool {
    message
        .chars()
        .all(|c| c != '\u{a7}' && c >= ' ' && c != '\u{7f}')
}

pub fn is_valid_position(position: &Position) -> bool {
    [position.x, position.y, position.z]
        .iter()
        .all(|value| value.is_finite() && value.abs() < MAX_COORDINATE)
}

pub fn is_valid_rotation(rotation: &Rotation) -> bool {
    rotation.yaw.is_finite() && rotation.pitch.is_finite()
}

/// Sends everything a client needs to leave the loading screen, then
/// announces the player.
pub async fn join(conn: &mut Connection) -> Result<()> {
    let server = Arc::clone(conn.server());
    let player = conn
        .player()
        .cloned()
        .ok_or_else(|| BasaltError::Protocol("join before login".to_owned()))?;
    let config = server.config();

    let (min_y, height, spawn) = {
        let world = server.world().read().await;
        (world.min_y(), world.height(), world.spawn_position())
    };

    let mut join_game = JoinGamePacket::new(player.entity_id, min_y, height);
    join_game.max_players = config.max_players as i32;
    join_game.view_distance = config.view_distance as i32;
    join_game.simulation_distance = config.simulation_distance as i32;
    conn.send(&join_game).await?;
    conn.send(&PluginMessagePacket::brand(SERVER_BRAND)?).await?;
    conn.send(&ServerDifficultyPacket {
        difficulty: Difficulty::Normal,
        locked: false,
    })
    .await?;
    conn.send(&EntityStatusPacket::op_permission_level(
        player.entity_id,
        OP_LEVEL,
    ))
    .await?;

    update_view(conn, spawn.chunk()).await?;

    let teleport_id = conn.begin_teleport();
    conn.send(&PlayerPositionAndLook::absolute(
        spawn,
        Rotation::default(),
        teleport_id,
    ))
    .await?;

    info!("{} joined the game", player.username);
    let message = Chat::text(format!("{} joined the game", player.username)).color("yellow");
    let sessions = server.sessions().read().await;
    sessions.broadcast(&ChatMessagePacket::system(message), None)
}

/// Recentres the client's view on `center` and streams the chunks it lacks.
/// The session must already hold the new position and distance.
async fn update_view(conn: &mut Connection, center: (i32, i32)) -> Result<()> {
    let change = conn.view_mut().move_to(center);
    let server = Arc::clone(conn.server());
    if !change.unload.is_empty() {
        let sessions = server.sessions().read().await;
        server.unload_unwatched_chunks(&sessions).await;
    }
    conn.send(&UpdateViewPositionPacket::new(center.0, center.1))
        .await?;
    for (chunk_x, chunk_z) in change.unload {
        conn.send(&UnloadChunkPacket { chunk_x, chunk_z }).await?;
    }
    if change.load.is_empty() {
        return Ok(());
    }

    let packets = {
        let mut world = server.world().write().await;
        change
            .load
            .iter()
            .map(|&(x, z)| ChunkDataPacket::from_chunk(world.chunk(x, z)))
            .collect::<Result<Vec<_>>>()?
    };
    debug!(
        "{}: sending {} chunks around {:?}",
        conn.describe(),
        packets.len(),
        center
    );
    for packet in &packets {
        conn.send(packet).await?;
    }
    Ok(())
}

/// Applies `update` to this connection's session.
async fn update_session<F>(conn: &mut Connection, update: F) -> Result<()>
where
    F: FnOnce(&mut PlayerSession) + Send,
{
    let server = Arc::clone(conn.server());
    let username = conn.username()?.to_owned();
    let mut sessions = server.sessions().write().await;
    if let Some(session) = sessions.get_session_mut(&username) {
        update(session);
    }
    Ok(())
}

async fn apply_movement(
    conn: &mut Connection,
    position: Option<Position>,
    rotation: Option<Rotation>,
    on_ground: bool,
) -> Result<()> {
    // Movement sent before the client accepted our teleport is stale
    if conn.awaiting_teleport() {
        return Ok(());
    }
    let valid = position.as_ref().map_or(true, is_valid_position)
        && rotation.as_ref().map_or(true, is_valid_rotation);
    if !valid {
        conn.disconnect(INVALID_MOVE).await;
        return Ok(());
    }

    update_session(conn, |session| {
        if let Some(position) = position {
            session.position = position;
        }
        if let Some(rotation) = rotation {
            session.rotation = rotation;
        }
        session.on_ground = on_ground;
    })
    .await?;

    if let Some(position) = position {
        let chunk = position.chunk();
        if conn.view().center() != Some(chunk) {
            update_view(conn, chunk).await?;
        }
    }
    Ok(())
}

fn teleport_confirm(conn: &mut Connection, packet: TeleportConfirmPacket) -> BoxFuture<'_, Result<()>> {
    async move {
        if !conn.confirm_teleport(packet.teleport_id) {
            debug!(
                "{}: ignoring confirmation of teleport {}",
                conn.describe(),
                packet.teleport_id
            );
        }
        Ok(())
    }
    .boxed()
}

fn chat(conn: &mut Connection, packet: ChatRequestPacket) -> BoxFuture<'_, Result<()>> {
    async move {
        let message = packet.message.trim().to_owned();
        if !is_legal_chat(&message) {
            conn.disconnect(ILLEGAL_CHAT).await;
            return Ok(());
        }
        if message.is_empty() {
            return Ok(());
        }
        let player = conn
            .player()
            .cloned()
            .ok_or_else(|| BasaltError::Protocol("chat before login".to_owned()))?;

        if message.starts_with('/') {
            let reply = Chat::text("Commands are not supported").color("red");
            return conn.send(&ChatMessagePacket::system(reply)).await;
        }

        info!("<{}> {}", player.username, message);
        let line = Chat::text(format!("<{}> {}", player.username, message));
        let server = Arc::clone(conn.server());
        let sessions = server.sessions().read().await;
        sessions.broadcast(&ChatMessagePacket::player(line, player.uuid), None)
    }
    .boxed()
}

fn client_settings(conn: &mut Connection, packet: ClientSettingsPacket) -> BoxFuture<'_, Result<()>> {
    async move {
        debug!("{}: client settings {:?}", conn.describe(), packet);
        let server_distance = conn.server().config().view_distance;
        let distance = (packet.view_distance.max(2) as u8).min(server_distance);
        let locale = packet.locale;
        update_session(conn, move |session| {
            session.view_distance = distance;
            session.locale = locale;
        })
        .await?;

        if conn.view_mut().set_distance(distance) {
            if let Some(center) = conn.view().center() {
                update_view(conn, center).await?;
            }
        }
        Ok(())
    }
    .boxed()
}

fn plugin_message(
    conn: &mut Connection,
    packet: ClientPluginMessagePacket,
) -> BoxFuture<'_, Result<()>> {
    async move {
        match packet.brand() {
            Some(brand) => {
                debug!("{}: client brand is {}", conn.describe(), brand);
                update_session(conn, |session| session.brand = Some(brand)).await
            }
            None => {
                debug!(
                    "{}: ignoring plugin message on {}",
                    conn.describe(),
                    packet.channel
                );
                Ok(())
            }
        }
    }
    .boxed()
}

fn keep_alive(conn: &mut Connection, packet: KeepAliveResponsePacket) -> BoxFuture<'_, Result<()>> {
    async move {
        let id = packet.keep_alive_id;
        let mut acknowledged = false;
        update_session(conn, |session| {
            acknowledged = session.acknowledge_keep_alive(id);
        })
        .await?;
        if !acknowledged {
            warn!("{}: unexpected keep alive {}", conn.describe(), id);
        }
        Ok(())
    }
    .boxed()
}

fn position(conn: &mut Connection, packet: PlayerPositionPacket) -> BoxFuture<'_, Result<()>> {
    async move { apply_movement(conn, Some(packet.position), None, packet.on_ground).await }
        .boxed()
}

fn position_and_rotation(
    conn: &mut Connection,
    packet: PlayerPositionAndRotationPacket,
) -> BoxFuture<'_, Result<()>> {
    async move {
        apply_movement(
            conn,
            Some(packet.position),
            Some(packet.rotation),
            packet.on_ground,
        )
        .await
    }
    .boxed()
}

fn rotation(conn: &mut Connection, packet: PlayerRotationPacket) -> BoxFuture<'_, Result<()>> {
    async move { apply_movement(conn, None, Some(packet.rotation), packet.on_ground).await }
        .boxed()
}

fn movement(conn: &mut Connection, packet: PlayerMovementPacket) -> BoxFuture<'_, Result<()>> {
    async move { apply_movement(conn, None, None, packet.on_ground).await }.boxed()
}

fn held_item_change(conn: &mut Connection, packet: HeldItemChangePacket) -> BoxFuture<'_, Result<()>> {
    async move { update_session(conn, |session| session.held_slot = packet.slot).await }.boxed()
}
