use basalt_common::{ConnectionState, Result};
use basalt_protocol::status::{PingPacket, StatusRequestPacket, StatusResponsePacket};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;

use crate::connection::Connection;
use crate::handlers::HandlerRegistry;

pub(super) fn register(registry: &mut HandlerRegistry) {
    registry.register::<StatusRequestPacket>(ConnectionState::Status, status_request);
    registry.register::<PingPacket>(ConnectionState::Status, ping);
}

fn status_request(conn: &mut Connection, _packet: StatusRequestPacket) -> BoxFuture<'_, Result<()>> {
    async move {
        let server = Arc::clone(conn.server());
        let status = server.status().await;
        conn.send(&StatusResponsePacket { status }).await
    }
    .boxed()
}

/// Echoes the payload and ends the status exchange.
fn ping(conn: &mut Connection, packet: PingPacket) -> BoxFuture<'_, Result<()>> {
    async move {
        conn.send(&packet).await?;
        conn.close().await;
        Ok(())
    }
    .boxed()
}
