use basalt_common::{Chat, Position, Result, Rotation};
use basalt_logger::time::unix_timestamp;
use basalt_protocol::keep_alive::KeepAlivePacket;
use basalt_protocol::{Packet, RawPacket};
use log::{debug, info};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use uuid::Uuid;

use crate::connection::ConnectionCommand;
use crate::tick::{TickContext, Tickable};

/// A player in PLAY state. Owned by the session manager; the connection
/// task that serves the player receives everything sent through `sender`.
#[derive(Debug)]
pub struct PlayerSession {
    pub entity_id: i32,
    pub username: String,
    pub uuid: Uuid,
    pub position: Position,
    pub rotation: Rotation,
    pub on_ground: bool,
    pub held_slot: i16,
    pub view_distance: u8,
    pub locale: String,
    pub brand: Option<String>,
    sender: UnboundedSender<ConnectionCommand>,
    last_keep_alive_sent: Instant,
    pending_keep_alive: Option<i64>,
    disconnecting: bool,
}

impl PlayerSession {
    pub fn new(
        entity_id: i32,
        username: String,
        uuid: Uuid,
        position: Position,
        view_distance: u8,
        sender: UnboundedSender<ConnectionCommand>,
    ) -> Self {
        Self {
            entity_id,
            username,
            uuid,
            position,
            rotation: Rotation::default(),
            on_ground: false,
            held_slot: 0,
            view_distance,
            locale: "en_us".to_owned(),
            brand: None,
            sender,
            last_keep_alive_sent: Instant::now(),
            pending_keep_alive: None,
            disconnecting: false,
        }
    }

    /// Queues `packet` on the player's connection. A connection that already
    /// went away drops it.
    pub fn send<P: Packet>(&self, packet: &P) -> Result<()> {
        self.send_raw(RawPacket::from_packet(packet)?);
        Ok(())
    }

    pub fn send_raw(&self, packet: RawPacket) {
        if self.sender.send(ConnectionCommand::Send(packet)).is_err() {
            debug!("Dropped packet for {}, connection closed", self.username);
        }
    }

    /// Asks the connection to disconnect. Later calls are ignored.
    pub fn disconnect(&mut self, reason: impl Into<Chat>) {
        if self.disconnecting {
            return;
        }
        self.disconnecting = true;
        let _ = self.sender.send(ConnectionCommand::Disconnect(reason.into()));
    }

    pub fn is_disconnecting(&self) -> bool {
        self.disconnecting
    }

    /// Clears the outstanding keep alive if `id` matches it.
    pub fn acknowledge_keep_alive(&mut self, id: i64) -> bool {
        if self.pending_keep_alive == Some(id) {
            self.pending_keep_alive = None;
            true
        } else {
            false
        }
    }

    pub fn pending_keep_alive(&self) -> Option<i64> {
        self.pending_keep_alive
    }
}

impl Tickable for PlayerSession {
    fn tick(&mut self, ctx: &TickContext) {
        if self.disconnecting {
            return;
        }
        let elapsed = ctx.now.saturating_duration_since(self.last_keep_alive_sent);
        match self.pending_keep_alive {
            Some(_) if elapsed >= ctx.keep_alive_timeout => {
                info!("{} timed out", self.username);
                self.disconnect("Timed out");
            }
            Some(_) => {}
            None if elapsed >= ctx.keep_alive_interval => {
                let id = unix_timestamp();
                if self.send(&KeepAlivePacket::new(id)).is_ok() {
                    self.pending_keep_alive = Some(id);
                    self.last_keep_alive_sent = ctx.now;
                }
            }
            None => {}
        }
    }
}
