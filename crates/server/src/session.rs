//! Driving one connection from its socket.

use crate::{Connection, Outbox, ServerContext};
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tracing::{debug, info, instrument, warn};
use voxelgate_core::ConnectionId;
use voxelgate_net::{spawn_writer, FrameReader, ProtocolError, READ_CHUNK};
use voxelgate_world::World;

/// Read, frame and dispatch until the client leaves or is kicked.
#[instrument(skip(stream, peer, world, ctx), fields(peer = %peer))]
pub async fn serve(
    stream: TcpStream,
    peer: SocketAddr,
    id: ConnectionId,
    world: Arc<World>,
    ctx: Arc<ServerContext>,
) -> Result<()> {
    info!(conn = %id, "New connection");
    let (mut read_half, write_half) = stream.into_split();
    let (tx, writer) = spawn_writer(write_half);
    let outbox = Arc::new(Outbox::new(id, tx));

    let mut conn = Connection::new(id, world, Arc::clone(&ctx), outbox);
    conn.monitor = ctx.policy.monitors.contains(&peer.ip());

    let mut reader = FrameReader::new();
    let mut buf = vec![0u8; READ_CHUNK];
    let result = loop {
        let n = match read_half.read(&mut buf).await {
            Ok(0) => break Ok(()),
            Ok(n) => n,
            Err(e) => break Err(e.into()),
        };
        match reader.feed(&buf[..n], &mut conn) {
            Ok(_) => {}
            Err(ProtocolError::Kicked(_)) => break Ok(()),
            Err(err) => {
                warn!(conn = %id, "protocol error from {}: {}", peer, err);
                conn.kick(&err.to_string());
                break Ok(());
            }
        }
    };

    conn.leave();
    drop(conn);
    // The writer stops once every outbox handle is gone or a kick is flushed.
    match writer.await {
        Ok(Err(e)) => debug!(conn = %id, "writer ended with error: {:#}", e),
        Err(e) => warn!(conn = %id, "writer task failed: {}", e),
        Ok(Ok(())) => {}
    }
    result
}
