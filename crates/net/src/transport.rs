//! TCP transport.
//!
//! Reads are handed to the caller in raw chunks for the [`crate::FrameReader`];
//! writes go through a per-connection task fed by an unbounded channel, so
//! packet producers never wait on the socket.

use crate::ServerPacket;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Size of the buffer used for each socket read.
pub const READ_CHUNK: usize = 4096;

/// Listening socket for client connections.
pub struct ServerEndpoint {
    listener: TcpListener,
    addr: SocketAddr,
}

impl ServerEndpoint {
    /// Bind to the given address.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        let addr = listener.local_addr()?;
        info!("Server endpoint bound to {}", addr);
        Ok(Self { listener, addr })
    }

    /// Get the local address this endpoint is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Accept the next client.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr)> {
        let (stream, peer) = self.listener.accept().await?;
        stream.set_nodelay(true)?;
        Ok((stream, peer))
    }
}

/// Spawn the writer task for one connection.
///
/// The task ends after writing a [`ServerPacket::Kick`], when every sender is
/// dropped, or on the first write error.
pub fn spawn_writer(
    mut writer: OwnedWriteHalf,
) -> (mpsc::UnboundedSender<ServerPacket>, JoinHandle<Result<()>>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerPacket>();
    let handle = tokio::spawn(async move {
        let mut buf = Vec::with_capacity(256);
        while let Some(packet) = rx.recv().await {
            buf.clear();
            packet.encode(&mut buf);
            let mut kicked = matches!(packet, ServerPacket::Kick { .. });
            // Coalesce whatever else is already queued.
            while !kicked {
                let Ok(next) = rx.try_recv() else { break };
                kicked = matches!(next, ServerPacket::Kick { .. });
                next.encode(&mut buf);
            }
            writer.write_all(&buf).await.context("socket write failed")?;
            if kicked {
                break;
            }
        }
        let _ = writer.shutdown().await;
        debug!("writer task finished");
        Ok::<(), anyhow::Error>(())
    });
    (tx, handle)
}
