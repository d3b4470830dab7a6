//! Outgoing side of a connection.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use voxelgate_core::block::{self, BlockId};
use voxelgate_core::{BlockValue, CellPos, ConnectionId};
use voxelgate_net::{Extensions, ServerPacket};
use voxelgate_world::{BlockObserver, World};

/// Queue of packets for one client plus what it negotiated.
///
/// Shared between the connection, the world's observer list, the roster and
/// command threads.
pub struct Outbox {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<ServerPacket>,
    extensions: AtomicU16,
}

impl Outbox {
    /// Wrap the sending half of a writer channel.
    pub fn new(id: ConnectionId, tx: mpsc::UnboundedSender<ServerPacket>) -> Self {
        Self {
            id,
            tx,
            extensions: AtomicU16::new(0),
        }
    }

    /// Create an outbox together with its receiving end.
    pub fn channel(id: ConnectionId) -> (Arc<Self>, mpsc::UnboundedReceiver<ServerPacket>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self::new(id, tx)), rx)
    }

    /// Connection this outbox belongs to.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a packet. Packets for a closed connection are dropped.
    pub fn send(&self, packet: ServerPacket) {
        let _ = self.tx.send(packet);
    }

    /// Queue a chat line from the server.
    pub fn message(&self, text: &str) {
        self.send(ServerPacket::Message {
            id: 0,
            text: text.to_string(),
        });
    }

    /// Extensions the client has announced so far.
    pub fn extensions(&self) -> Extensions {
        Extensions::from_bits_truncate(self.extensions.load(Ordering::Acquire))
    }

    /// Record another negotiated extension.
    pub fn add_extensions(&self, ext: Extensions) {
        self.extensions.fetch_or(ext.bits(), Ordering::AcqRel);
    }

    /// Queue a cell update, converted to a block id this client understands.
    pub fn send_block(&self, world: &World, cell: CellPos, value: BlockValue) {
        self.send(ServerPacket::SetBlock {
            x: cell.x,
            y: cell.y,
            z: cell.z,
            block: self.client_block(world, value),
        });
    }

    /// Block byte the client should render for `value`.
    pub fn client_block(&self, world: &World, value: BlockValue) -> BlockId {
        let ext = self.extensions();
        if value.is_custom() {
            let def = world.custom_def(value.ext);
            if def.is_some() && ext.contains(Extensions::BLOCK_DEFINITIONS) {
                return value.ext;
            }
            let fallback = def.map(|d| d.fallback).unwrap_or(block::STONE);
            return downgrade(fallback, ext);
        }
        downgrade(value.visual().block, ext)
    }
}

fn downgrade(id: BlockId, ext: Extensions) -> BlockId {
    if ext.contains(Extensions::CUSTOM_BLOCKS) {
        id
    } else {
        block::classic_fallback(id)
    }
}

impl BlockObserver for Outbox {
    fn observer_id(&self) -> ConnectionId {
        self.id
    }

    fn observe_block(&self, world: &World, cell: CellPos, block: BlockValue) {
        self.send_block(world, cell, block);
    }
}
