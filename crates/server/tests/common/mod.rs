#![allow(dead_code)]

use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use voxelgate_core::{BlockValue, CellPos, ConnectionId, Position, Rank};
use voxelgate_net::ServerPacket;
use voxelgate_server::{
    CommandExecutor, Connection, EliminationGame, LoginPhase, Outbox, ServerContext, ServerPolicy,
};
use voxelgate_world::{BlockPermissions, World, WorldConfig};

/// Flat 16^3 world: dirt up to y=6, grass at y=7, air above.
pub const SURFACE: u16 = 7;

pub fn world_config() -> WorldConfig {
    WorldConfig {
        width: 16,
        height: 16,
        length: 16,
        ..WorldConfig::default()
    }
}

pub struct Everyone;

impl EliminationGame for Everyone {
    fn is_eliminated(&self, _name: &str) -> bool {
        true
    }
}

/// Knobs that must be set before the shared context is built.
#[derive(Default)]
pub struct Setup {
    pub policy: ServerPolicy,
    pub config: Option<WorldConfig>,
    pub eliminated: bool,
    pub cancel_edits: bool,
    pub commands: Option<Arc<dyn CommandExecutor>>,
}

pub struct Harness {
    pub world: Arc<World>,
    pub ctx: Arc<ServerContext>,
    pub conn: Connection,
    pub rx: UnboundedReceiver<ServerPacket>,
    /// Another client watching the same world.
    pub watcher: UnboundedReceiver<ServerPacket>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(Setup::default())
    }

    pub fn build(setup: Setup) -> Self {
        let world = World::flat(
            "test",
            setup.config.unwrap_or_else(world_config),
            Arc::new(BlockPermissions::default()),
        );
        Self::with_world(world, setup)
    }

    pub fn with_world(world: World, setup: Setup) -> Self {
        let world = Arc::new(world);
        let mut ctx = ServerContext::new(setup.policy);
        if setup.eliminated {
            ctx = ctx.with_game(Arc::new(Everyone));
        }
        if let Some(commands) = setup.commands {
            ctx = ctx.with_commands(commands);
        }
        if setup.cancel_edits {
            ctx.events.on_block_change(|_, _, _, _| true);
        }
        let ctx = Arc::new(ctx);

        let (outbox, rx) = Outbox::channel(ConnectionId(1));
        let (watcher_box, watcher) = Outbox::channel(ConnectionId(2));
        world.add_observer(outbox.clone());
        world.add_observer(watcher_box);

        let mut conn = Connection::new(ConnectionId(1), world.clone(), ctx.clone(), outbox);
        conn.name = "alice".to_string();
        conn.phase = LoginPhase::Authenticated;
        conn.rank = Rank::Guest;
        conn.position = Position::from_block(8, 8, 8);

        Self {
            world,
            ctx,
            conn,
            rx,
            watcher,
        }
    }

    pub fn packets(&mut self) -> Vec<ServerPacket> {
        drain(&mut self.rx)
    }

    pub fn watcher_packets(&mut self) -> Vec<ServerPacket> {
        drain(&mut self.watcher)
    }

    pub fn messages(&mut self) -> Vec<String> {
        self.packets()
            .into_iter()
            .filter_map(|p| match p {
                ServerPacket::Message { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }
}

pub fn drain(rx: &mut UnboundedReceiver<ServerPacket>) -> Vec<ServerPacket> {
    let mut out = Vec::new();
    while let Ok(packet) = rx.try_recv() {
        out.push(packet);
    }
    out
}

pub fn set_block(cell: CellPos, block: u8) -> ServerPacket {
    ServerPacket::SetBlock {
        x: cell.x,
        y: cell.y,
        z: cell.z,
        block,
    }
}

pub fn value(id: u8) -> BlockValue {
    BlockValue::new(id)
}
