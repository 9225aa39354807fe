use basalt_common::constants::{GAME_VERSION, PROTOCOL_VERSION};
use basalt_common::{BasaltError, ConnectionState, Result};
use basalt_protocol::crypto::{offline_uuid, verify_token};
use basalt_protocol::login::{
    is_valid_username, EncryptionRequestPacket, EncryptionResponsePacket, LoginStartPacket,
    LoginSuccessPacket, SetCompressionPacket,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use log::{debug, info};
use std::cmp::Ordering;
use std::sync::Arc;

use crate::connection::{Connection, Player};
use crate::handlers::{play, HandlerRegistry};
use crate::session::PlayerSession;

pub const ALREADY_CONNECTED: &str = "You are already connected to this server";
pub const SERVER_FULL: &str = "The server is full!";

pub(super) fn register(registry: &mut HandlerRegistry) {
    registry.register::<LoginStartPacket>(ConnectionState::Login, login_start);
    registry.register::<EncryptionResponsePacket>(ConnectionState::Login, encryption_response);
}

/// Why a client with `protocol_version` may not join, if it may not.
pub fn version_mismatch(protocol_version: i32) -> Option<String> {
    match protocol_version.cmp(&PROTOCOL_VERSION) {
        Ordering::Less => Some(format!("Outdated client! Please use {}", GAME_VERSION)),
        Ordering::Greater => Some(format!("Outdated server! I'm still on {}", GAME_VERSION)),
        Ordering::Equal => None,
    }
}

fn login_start(conn: &mut Connection, packet: LoginStartPacket) -> BoxFuture<'_, Result<()>> {
    async move {
        let username = packet.username;
        if !is_valid_username(&username) {
            conn.disconnect(format!("Invalid username {:?}", username)).await;
            return Ok(());
        }
        if let Some(reason) = version_mismatch(conn.protocol_version()) {
            conn.disconnect(reason).await;
            return Ok(());
        }

        let server = Arc::clone(conn.server());
        let rejection = {
            let sessions = server.sessions().read().await;
            if sessions.contains(&username) {
                Some(ALREADY_CONNECTED)
            } else if sessions.count() >= server.config().max_players as usize {
                Some(SERVER_FULL)
            } else {
                None
            }
        };
        if let Some(reason) = rejection {
            conn.disconnect(reason).await;
            return Ok(());
        }

        debug!("{}: {} is logging in", conn.peer(), username);
        match server.key() {
            Some(key) => {
                let token = verify_token().to_vec();
                conn.begin_login(username, Some(token.clone()))?;
                conn.send(&EncryptionRequestPacket::new(key.public_der().to_vec(), token))
                    .await
            }
            None => {
                conn.begin_login(username, None)?;
                finish_login(conn).await
            }
        }
    }
    .boxed()
}

fn encryption_response(
    conn: &mut Connection,
    packet: EncryptionResponsePacket,
) -> BoxFuture<'_, Result<()>> {
    async move {
        let server = Arc::clone(conn.server());
        let key = server
            .key()
            .ok_or_else(|| BasaltError::Protocol("encryption is disabled".to_owned()))?;
        let expected = conn
            .take_verify_token()
            .ok_or_else(|| BasaltError::Protocol("unexpected encryption response".to_owned()))?;

        if key.decrypt(&packet.verify_token)? != expected {
            return Err(BasaltError::Crypto("verify token mismatch".to_owned()));
        }
        let shared_secret = key.decrypt(&packet.shared_secret)?;
        conn.codec_mut().enable_encryption(&shared_secret)?;
        debug!("{}: encryption enabled", conn.describe());

        finish_login(conn).await
    }
    .boxed()
}

/// Enables compression, sends Login Success and moves the player into PLAY.
async fn finish_login(conn: &mut Connection) -> Result<()> {
    let username = conn
        .login_username()
        .map(str::to_owned)
        .ok_or_else(|| BasaltError::Protocol("login not started".to_owned()))?;
    let server = Arc::clone(conn.server());

    if let Some(threshold) = server.config().compression() {
        conn.send(&SetCompressionPacket {
            threshold: threshold as i32,
        })
        .await?;
        conn.codec_mut().enable_compression(threshold)?;
    }

    let uuid = offline_uuid(&username);
    conn.send(&LoginSuccessPacket {
        uuid,
        username: username.clone(),
    })
    .await?;
    conn.transition(ConnectionState::Play)?;

    let entity_id = server.next_entity_id();
    let spawn = server.world().read().await.spawn_position();
    let session = PlayerSession::new(
        entity_id,
        username.clone(),
        uuid,
        spawn,
        server.config().view_distance,
        conn.sender(),
    );
    if !server.sessions().write().await.add_session(session) {
        // Lost a race against another login with the same name
        conn.disconnect(ALREADY_CONNECTED).await;
        return Ok(());
    }
    conn.set_player(Player {
        username,
        uuid,
        entity_id,
    });
    info!("{} logged in with entity id {}", conn.describe(), entity_id);

    play::join(conn).await
}
