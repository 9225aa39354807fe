use basalt_common::Result;
use basalt_protocol::status::StatusPlayer;
use basalt_protocol::{Packet, RawPacket};
use std::collections::HashMap;

use crate::session::PlayerSession;
use crate::tick::{TickContext, Tickable};

/// Players listed in the server list sample.
pub const STATUS_SAMPLE_SIZE: usize = 12;

/// Every player in PLAY state, keyed by username.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<String, PlayerSession>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `session` unless its name is taken. Returns whether it was added.
    pub fn add_session(&mut self, session: PlayerSession) -> bool {
        if self.sessions.contains_key(&session.username) {
            return false;
        }
        self.sessions.insert(session.username.clone(), session);
        true
    }

    pub fn remove_session(&mut self, username: &str) -> Option<PlayerSession> {
        self.sessions.remove(username)
    }

    pub fn get_session(&self, username: &str) -> Option<&PlayerSession> {
        self.sessions.get(username)
    }

    pub fn get_session_mut(&mut self, username: &str) -> Option<&mut PlayerSession> {
        self.sessions.get_mut(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.sessions.contains_key(username)
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Online player names, sorted.
    pub fn player_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sessions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn status_sample(&self) -> Vec<StatusPlayer> {
        self.player_names()
            .into_iter()
            .take(STATUS_SAMPLE_SIZE)
            .filter_map(|name| self.sessions.get(&name))
            .map(|session| StatusPlayer {
                name: session.username.clone(),
                id: session.uuid.to_string(),
            })
            .collect()
    }

    /// The chunk square each player sees: centre chunk and view distance.
    pub fn views(&self) -> Vec<((i32, i32), i32)> {
        self.sessions
            .values()
            .map(|session| (session.position.chunk(), session.view_distance as i32))
            .collect()
    }

    /// Sends `packet` to every player except `except`.
    pub fn broadcast<P: Packet>(&self, packet: &P, except: Option<&str>) -> Result<()> {
        let raw = RawPacket::from_packet(packet)?;
        for (username, session) in &self.sessions {
            if Some(username.as_str()) != except {
                session.send_raw(raw.clone());
            }
        }
        Ok(())
    }

    /// Asks every connection to disconnect with `reason`.
    pub fn disconnect_all(&mut self, reason: &str) {
        for session in self.sessions.values_mut() {
            session.disconnect(reason);
        }
    }
}

impl Tickable for SessionManager {
    fn tick(&mut self, ctx: &TickContext) {
        // Sessions on their way out stay in the map until their connection
        // removes them; they are skipped here.
        for session in self.sessions.values_mut() {
            if !session.is_disconnecting() {
                session.tick(ctx);
            }
        }
    }
}
