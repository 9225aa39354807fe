use basalt_common::constants::{GAME_VERSION, PROTOCOL_VERSION};
use basalt_common::{Chat, Result};
use basalt_protocol::crypto::ServerKey;
use basalt_protocol::status::{ServerStatus, StatusPlayers, StatusVersion};
use basalt_world::World;
use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::time::{sleep, timeout, Duration};

use crate::config::ServerConfig;
use crate::connection::Connection;
use crate::handlers::HandlerRegistry;
use crate::session_manager::SessionManager;
use crate::tick;

pub const SHUTDOWN_MESSAGE: &str = "Server is shutting down";

/// State shared by every connection and the tick loop.
pub struct Server {
    config: ServerConfig,
    key: Option<ServerKey>,
    favicon: Option<String>,
    sessions: RwLock<SessionManager>,
    world: RwLock<World>,
    handlers: HandlerRegistry,
    next_entity_id: AtomicI32,
}

impl Server {
    /// Builds the server. Generates the RSA key pair when encryption is on.
    pub fn new(config: ServerConfig) -> Result<Arc<Self>> {
        config.validate()?;
        let key = if config.encryption {
            info!("Generating server key pair");
            Some(ServerKey::generate()?)
        } else {
            None
        };
        let favicon = config.load_favicon();
        Ok(Arc::new(Self {
            config,
            key,
            favicon,
            sessions: RwLock::new(SessionManager::new()),
            world: RwLock::new(World::flat()),
            handlers: HandlerRegistry::with_defaults(),
            next_entity_id: AtomicI32::new(1),
        }))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn key(&self) -> Option<&ServerKey> {
        self.key.as_ref()
    }

    pub fn sessions(&self) -> &RwLock<SessionManager> {
        &self.sessions
    }

    pub fn world(&self) -> &RwLock<World> {
        &self.world
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn next_entity_id(&self) -> i32 {
        self.next_entity_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Drops world chunks no online player can see. The caller passes the
    /// locked session table so the views cannot change underneath.
    pub async fn unload_unwatched_chunks(&self, sessions: &SessionManager) -> usize {
        let views = sessions.views();
        self.world.write().await.retain_viewed(&views)
    }

    pub async fn status(&self) -> ServerStatus {
        let sessions = self.sessions.read().await;
        ServerStatus {
            version: StatusVersion {
                name: GAME_VERSION.to_owned(),
                protocol: PROTOCOL_VERSION,
            },
            players: StatusPlayers {
                max: self.config.max_players as i32,
                online: sessions.count() as i32,
                sample: sessions.status_sample(),
            },
            description: Chat::text(self.config.motd.clone()),
            favicon: self.favicon.clone(),
        }
    }

    pub async fn bind(&self) -> Result<TcpListener> {
        let listener = TcpListener::bind(self.config.bind_address()).await?;
        info!("Listening on {}", listener.local_addr()?);
        Ok(listener)
    }

    /// Runs the tick loop and accepts connections on `listener` forever.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) {
        let ticker = tokio::spawn(tick::run(Arc::clone(&self)));
        loop {
            match listener.accept().await {
                Ok((socket, peer)) => self.accept(socket, peer),
                Err(e) => {
                    // Usually out of file descriptors; back off instead of spinning
                    error!("Failed to accept connection: {}", e);
                    sleep(Duration::from_millis(100)).await;
                }
            }
            if ticker.is_finished() {
                error!("Tick loop stopped");
                break;
            }
        }
    }

    fn accept(self: &Arc<Self>, socket: tokio::net::TcpStream, peer: SocketAddr) {
        info!("New connection from: {}", peer);
        if let Err(e) = socket.set_nodelay(true) {
            warn!("{}: failed to set TCP_NODELAY: {}", peer, e);
        }
        let connection = Connection::new(Arc::clone(self), socket, peer);
        tokio::spawn(connection.run());
    }

    /// Disconnects every player and waits, at most the grace period, for
    /// their connections to close.
    pub async fn shutdown(&self) {
        let online = {
            let mut sessions = self.sessions.write().await;
            sessions.disconnect_all(SHUTDOWN_MESSAGE);
            sessions.count()
        };
        if online == 0 {
            return;
        }
        info!("Disconnecting {} players", online);
        let drained = timeout(self.config.disconnect_grace(), async {
            while !self.sessions.read().await.is_empty() {
                sleep(Duration::from_millis(20)).await;
            }
        })
        .await;
        if drained.is_err() {
            warn!(
                "{} players still connected after shutdown grace period",
                self.sessions.read().await.count()
            );
        }
    }
}
