use basalt_common::{ConnectionState, Result};
use basalt_protocol::handshake::HandshakePacket;
use futures::future::BoxFuture;
use futures::FutureExt;
use log::debug;

use crate::connection::Connection;
use crate::handlers::HandlerRegistry;

pub(super) fn register(registry: &mut HandlerRegistry) {
    registry.register::<HandshakePacket>(ConnectionState::Handshake, handshake);
}

fn handshake(conn: &mut Connection, packet: HandshakePacket) -> BoxFuture<'_, Result<()>> {
    async move {
        debug!(
            "{}: handshake for {}:{} with protocol {}",
            conn.peer(),
            packet.server_address,
            packet.server_port,
            packet.protocol_version
        );
        let next = packet.requested_state()?;
        conn.set_protocol_version(packet.protocol_version);
        conn.transition(next)
    }
    .boxed()
}
