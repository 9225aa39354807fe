//! Serverbound packet handlers, looked up by connection state and packet id.

mod handshake;
mod login;
mod play;
mod status;

use basalt_common::{BasaltError, ConnectionState, Result};
use basalt_protocol::{Packet, RawPacket};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use crate::connection::Connection;

pub trait PacketHandler: Send + Sync {
    fn handle<'a>(
        &'a self,
        conn: &'a mut Connection,
        packet: RawPacket,
    ) -> BoxFuture<'a, Result<()>>;
}

/// A handler for one decoded packet type.
pub type HandlerFn<P> = for<'a> fn(&'a mut Connection, P) -> BoxFuture<'a, Result<()>>;

struct TypedHandler<P> {
    handler: HandlerFn<P>,
    _packet: PhantomData<fn() -> P>,
}

impl<P> PacketHandler for TypedHandler<P>
where
    P: Packet + Send + 'static,
{
    fn handle<'a>(
        &'a self,
        conn: &'a mut Connection,
        packet: RawPacket,
    ) -> BoxFuture<'a, Result<()>> {
        match packet.decode::<P>() {
            Ok(packet) => (self.handler)(conn, packet),
            Err(e) => futures::future::err(e).boxed(),
        }
    }
}

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<(ConnectionState, i32), Box<dyn PacketHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every handler the server speaks.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        handshake::register(&mut registry);
        status::register(&mut registry);
        login::register(&mut registry);
        play::register(&mut registry);
        registry
    }

    /// Registers `handler` for `P` in `state`, replacing any earlier one.
    pub fn register<P>(&mut self, state: ConnectionState, handler: HandlerFn<P>)
    where
        P: Packet + Send + 'static,
    {
        self.handlers.insert(
            (state, P::packet_id()),
            Box::new(TypedHandler {
                handler,
                _packet: PhantomData,
            }),
        );
    }

    pub fn get(&self, state: ConnectionState, id: i32) -> Result<&dyn PacketHandler> {
        self.handlers
            .get(&(state, id))
            .map(|handler| handler.as_ref())
            .ok_or(BasaltError::UnknownPacket { state, id })
    }

    pub fn contains(&self, state: ConnectionState, id: i32) -> bool {
        self.handlers.contains_key(&(state, id))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.handlers.keys().collect();
        keys.sort();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &keys)
            .finish()
    }
}
