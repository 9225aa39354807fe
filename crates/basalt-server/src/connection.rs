use basalt_common::{BasaltError, Chat, ConnectionState, Result};
use basalt_protocol::chat::ChatMessagePacket;
use basalt_protocol::disconnect::DisconnectPacket;
use basalt_protocol::login::LoginDisconnectPacket;
use basalt_protocol::{FrameCodec, Packet, RawPacket};
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{sleep, timeout, Instant};
use tokio_util::codec::Framed;
use uuid::Uuid;

use crate::server::Server;
use crate::view::ChunkView;

/// Work queued for a connection by other tasks.
#[derive(Debug)]
pub enum ConnectionCommand {
    Send(RawPacket),
    Disconnect(Chat),
}

/// The player a connection logged in as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub username: String,
    pub uuid: Uuid,
    pub entity_id: i32,
}

/// A login between Login Start and Login Success.
#[derive(Debug)]
struct PendingLogin {
    username: String,
    verify_token: Option<Vec<u8>>,
}

/// One client socket. Owns its framing state and runs on a single task, so
/// the frame decoder is never entered concurrently.
pub struct Connection {
    server: Arc<Server>,
    framed: Framed<TcpStream, FrameCodec>,
    peer: SocketAddr,
    state: ConnectionState,
    protocol_version: i32,
    commands: UnboundedReceiver<ConnectionCommand>,
    sender: UnboundedSender<ConnectionCommand>,
    login: Option<PendingLogin>,
    player: Option<Player>,
    view: ChunkView,
    pending_teleport: Option<i32>,
    next_teleport_id: i32,
    closed: bool,
}

impl Connection {
    pub fn new(server: Arc<Server>, socket: TcpStream, peer: SocketAddr) -> Self {
        let (sender, commands) = mpsc::unbounded_channel();
        let view = ChunkView::new(server.config().view_distance);
        Self {
            server,
            framed: Framed::new(socket, FrameCodec::new()),
            peer,
            state: ConnectionState::Handshake,
            protocol_version: 0,
            commands,
            sender,
            login: None,
            player: None,
            view,
            pending_teleport: None,
            next_teleport_id: 1,
            closed: false,
        }
    }

    /// Serves the connection until it closes. Errors end this connection
    /// only.
    pub async fn run(mut self) {
        if let Err(e) = self.process().await {
            warn!("{}: {}", self.describe(), e);
            match e {
                BasaltError::Io(_) => self.close().await,
                other => self.disconnect(format!("Internal Exception: {}", other)).await,
            }
        }
        self.close().await;
        self.leave().await;
        debug!("{}: connection closed", self.peer);
    }

    async fn process(&mut self) -> Result<()> {
        let read_timeout = self.server.config().read_timeout();
        let idle = sleep(read_timeout);
        tokio::pin!(idle);

        while !self.closed {
            tokio::select! {
                frame = self.framed.next() => match frame {
                    Some(frame) => {
                        idle.as_mut().reset(Instant::now() + read_timeout);
                        self.handle_packet(frame?).await?;
                    }
                    None => {
                        debug!("{}: peer closed the connection", self.describe());
                        self.closed = true;
                    }
                },
                Some(command) = self.commands.recv() => match command {
                    ConnectionCommand::Send(packet) => self.framed.send(packet).await?,
                    ConnectionCommand::Disconnect(reason) => self.disconnect(reason).await,
                },
                _ = &mut idle => {
                    info!("{}: timed out", self.describe());
                    self.disconnect("Timed out").await;
                }
            }
        }
        Ok(())
    }

    async fn handle_packet(&mut self, packet: RawPacket) -> Result<()> {
        debug!(
            "{}: packet 0x{:02X} ({} bytes) in {}",
            self.peer,
            packet.id,
            packet.payload.len(),
            self.state
        );
        let server = Arc::clone(&self.server);
        let handler = server.handlers().get(self.state, packet.id)?;
        handler.handle(self, packet).await
    }

    pub fn server(&self) -> &Arc<Server> {
        &self.server
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn transition(&mut self, next: ConnectionState) -> Result<()> {
        self.state.transition_to(next)?;
        debug!("{}: switched to {}", self.describe(), next);
        Ok(())
    }

    pub fn protocol_version(&self) -> i32 {
        self.protocol_version
    }

    pub fn set_protocol_version(&mut self, version: i32) {
        self.protocol_version = version;
    }

    pub fn codec_mut(&mut self) -> &mut FrameCodec {
        self.framed.codec_mut()
    }

    /// A sender that feeds this connection's command queue.
    pub fn sender(&self) -> UnboundedSender<ConnectionCommand> {
        self.sender.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// `"<peer>"`, or `"<name> (<peer>)"` once logged in.
    pub fn describe(&self) -> String {
        match (&self.player, &self.login) {
            (Some(player), _) => format!("{} ({})", player.username, self.peer),
            (None, Some(login)) => format!("{} ({})", login.username, self.peer),
            (None, None) => self.peer.to_string(),
        }
    }

    pub async fn send<P: Packet>(&mut self, packet: &P) -> Result<()> {
        let raw = RawPacket::from_packet(packet)?;
        self.framed.send(raw).await
    }

    pub fn begin_login(&mut self, username: String, verify_token: Option<Vec<u8>>) -> Result<()> {
        if self.login.is_some() {
            return Err(BasaltError::Protocol("login already started".to_owned()));
        }
        self.login = Some(PendingLogin {
            username,
            verify_token,
        });
        Ok(())
    }

    /// The verify token sent in Encryption Request. Can be taken once.
    pub fn take_verify_token(&mut self) -> Option<Vec<u8>> {
        self.login.as_mut().and_then(|login| login.verify_token.take())
    }

    pub fn login_username(&self) -> Option<&str> {
        self.login.as_ref().map(|login| login.username.as_str())
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn set_player(&mut self, player: Player) {
        self.login = None;
        self.player = Some(player);
    }

    pub fn username(&self) -> Result<&str> {
        self.player
            .as_ref()
            .map(|player| player.username.as_str())
            .ok_or_else(|| BasaltError::Protocol("not logged in".to_owned()))
    }

    pub fn view(&self) -> &ChunkView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ChunkView {
        &mut self.view
    }

    /// Allocates the id for a teleport the client has to confirm.
    pub fn begin_teleport(&mut self) -> i32 {
        let id = self.next_teleport_id;
        self.next_teleport_id = self.next_teleport_id.wrapping_add(1);
        self.pending_teleport = Some(id);
        id
    }

    pub fn confirm_teleport(&mut self, id: i32) -> bool {
        if self.pending_teleport == Some(id) {
            self.pending_teleport = None;
            true
        } else {
            false
        }
    }

    pub fn awaiting_teleport(&self) -> bool {
        self.pending_teleport.is_some()
    }

    /// Sends the state's disconnect packet, if it has one, then closes.
    /// Neither step waits longer than the configured grace period.
    pub async fn disconnect(&mut self, reason: impl Into<Chat>) {
        if self.closed {
            return;
        }
        let reason = reason.into();
        info!(
            "{}: disconnecting: {}",
            self.describe(),
            reason.plain_text()
        );
        let packet = match self.state {
            ConnectionState::Login => RawPacket::from_packet(&LoginDisconnectPacket { reason }),
            ConnectionState::Play => RawPacket::from_packet(&DisconnectPacket::new(reason)),
            ConnectionState::Handshake | ConnectionState::Status => {
                self.close().await;
                return;
            }
        };
        let grace = self.server.config().disconnect_grace();
        match packet {
            Ok(packet) => match timeout(grace, self.framed.send(packet)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("{}: failed to send disconnect: {}", self.peer, e),
                Err(_) => warn!("{}: disconnect not flushed within {:?}", self.peer, grace),
            },
            Err(e) => warn!("{}: failed to encode disconnect: {}", self.peer, e),
        }
        self.close().await;
    }

    /// Flushes and shuts the socket down. Safe to call more than once.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let grace = self.server.config().disconnect_grace();
        match timeout(grace, SinkExt::<RawPacket>::close(&mut self.framed)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("{}: error while closing: {}", self.peer, e),
            Err(_) => debug!("{}: close timed out, dropping socket", self.peer),
        }
    }

    /// Removes the player from the server and tells everyone else.
    async fn leave(&mut self) {
        let player = match self.player.take() {
            Some(player) => player,
            None => return,
        };
        let mut sessions = self.server.sessions().write().await;
        if sessions.remove_session(&player.username).is_none() {
            return;
        }
        self.server.unload_unwatched_chunks(&sessions).await;
        info!("{} left the game", player.username);
        let message =
            Chat::text(format!("{} left the game", player.username)).color("yellow");
        let packet = ChatMessagePacket::system(message);
        if let Err(e) = sessions.broadcast(&packet, None) {
            warn!("Failed to announce departure of {}: {}", player.username, e);
        }
    }
}
