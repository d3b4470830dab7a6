//! Per-connection state.

use crate::{Outbox, RecentActions, ServerContext, SpamChecker};
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use voxelgate_core::{BlockValue, CellPos, ConnectionId, Position, Rank};
use voxelgate_net::{Extensions, ServerPacket};
use voxelgate_world::{Requester, World};

/// Whether the handshake has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginPhase {
    /// Only handshake and negotiation messages are accepted.
    #[default]
    Unauthenticated,
    /// Logged in.
    Authenticated,
}

/// What a raw edit handler wants after handling an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEdit {
    /// Stay installed for the next edit.
    Keep,
    /// Uninstall.
    Done,
}

/// Takes over every edit on a connection, e.g. a selection tool waiting for
/// its corner clicks.
pub trait RawEditHandler: Send {
    /// Handle an edit in place of the normal checks.
    fn raw_edit(&mut self, conn: &mut Connection, cell: CellPos, block: BlockValue)
        -> Result<RawEdit>;
}

impl<F> RawEditHandler for F
where
    F: FnMut(&mut Connection, CellPos, BlockValue) -> Result<RawEdit> + Send,
{
    fn raw_edit(
        &mut self,
        conn: &mut Connection,
        cell: CellPos,
        block: BlockValue,
    ) -> Result<RawEdit> {
        self(conn, cell, block)
    }
}

/// One client session, owned by the task reading its socket.
pub struct Connection {
    id: ConnectionId,
    world: Arc<World>,
    ctx: Arc<ServerContext>,
    outbox: Arc<Outbox>,
    pub(crate) raw_edit: Option<Box<dyn RawEditHandler>>,
    pub(crate) spam: SpamChecker,
    pub(crate) recent: RecentActions,
    disconnected: Option<String>,

    /// Account name; empty before login.
    pub name: String,
    /// Current rank.
    pub rank: Rank,
    /// Login phase.
    pub phase: LoginPhase,
    /// Handshake carried the extension magic byte.
    pub supports_ext: bool,
    /// Extension entries the client said it would send.
    pub pending_ext_entries: i16,
    /// Custom block support level the client announced.
    pub custom_block_support: u8,
    /// Trusted non-interactive peer.
    pub monitor: bool,
    /// Last reported position.
    pub position: Position,
    /// Last reported yaw.
    pub yaw: u8,
    /// Last reported pitch.
    pub pitch: u8,
    /// Last cell the client tried to edit.
    pub last_click: Option<CellPos>,
    /// Block the client reports holding, before bindings.
    pub raw_held: BlockValue,
    /// Per-raw-id substitution table.
    pub bindings: [BlockValue; 256],
    /// Forces every placement to this block.
    pub mode_block: Option<BlockValue>,
    /// Deletes become placements of the held block.
    pub painting: bool,
    /// Deletes skip block-specific delete behaviour.
    pub delete_mode: bool,
    /// Jailed connections cannot edit or run commands.
    pub jailed: bool,
    /// Cleared to revoke building rights.
    pub can_build: bool,
    /// Agreed to the rules.
    pub agreed: bool,
    /// Frozen connections have every edit reverted.
    pub frozen: bool,
    /// Operator who has not yet confirmed their identity.
    pub pending_verification: bool,
    /// Muted connections cannot chat.
    pub muted: bool,
    /// Reach distance in blocks.
    pub reach_distance: f32,
    /// Time of the last chat line or rotation.
    pub last_action: Instant,
}

impl Connection {
    /// Fresh, not yet logged in connection to `world`.
    pub fn new(
        id: ConnectionId,
        world: Arc<World>,
        ctx: Arc<ServerContext>,
        outbox: Arc<Outbox>,
    ) -> Self {
        let policy = &ctx.policy;
        Self {
            id,
            spam: SpamChecker::new(policy.block_spam_count, policy.block_spam_interval()),
            recent: RecentActions::default(),
            raw_edit: None,
            disconnected: None,
            name: String::new(),
            rank: policy.default_rank,
            phase: LoginPhase::Unauthenticated,
            supports_ext: false,
            pending_ext_entries: 0,
            custom_block_support: 0,
            monitor: false,
            position: Position::default(),
            yaw: 0,
            pitch: 0,
            last_click: None,
            raw_held: BlockValue::new(voxelgate_core::block::STONE),
            bindings: std::array::from_fn(|raw| BlockValue::from_raw(raw as u8)),
            mode_block: None,
            painting: false,
            delete_mode: false,
            jailed: false,
            can_build: true,
            agreed: !policy.agree_to_rules_on_entry,
            frozen: false,
            pending_verification: false,
            muted: false,
            reach_distance: policy.reach_distance,
            last_action: Instant::now(),
            world,
            ctx,
            outbox,
        }
    }

    /// Connection id.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// World this connection edits.
    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// Server-wide state.
    pub fn context(&self) -> &Arc<ServerContext> {
        &self.ctx
    }

    /// Outgoing packet queue.
    pub fn outbox(&self) -> &Arc<Outbox> {
        &self.outbox
    }

    /// Edits applied through this connection, oldest first.
    pub fn recent_actions(&self) -> &RecentActions {
        &self.recent
    }

    /// Handshake completed.
    pub fn is_logged_in(&self) -> bool {
        self.phase == LoginPhase::Authenticated
    }

    /// Extensions negotiated so far.
    pub fn extensions(&self) -> Extensions {
        self.outbox.extensions()
    }

    /// Record a negotiated extension.
    pub fn add_extensions(&mut self, ext: Extensions) {
        self.outbox.add_extensions(ext);
    }

    /// Reason the connection was kicked, once it has been.
    pub fn kick_reason(&self) -> Option<&str> {
        self.disconnected.as_deref()
    }

    /// True when the running game has knocked this connection out.
    pub fn is_eliminated(&self) -> bool {
        self.ctx
            .game()
            .is_some_and(|game| game.is_eliminated(&self.name))
    }

    /// Install a handler that takes over every edit.
    pub fn set_raw_edit(&mut self, handler: impl RawEditHandler + 'static) {
        self.raw_edit = Some(Box::new(handler));
    }

    /// Remove the raw edit handler.
    pub fn clear_raw_edit(&mut self) {
        self.raw_edit = None;
    }

    /// A raw edit handler is installed.
    pub fn has_raw_edit(&self) -> bool {
        self.raw_edit.is_some()
    }

    /// Tell this client what a cell holds.
    pub fn send_block(&self, cell: CellPos, value: BlockValue) {
        self.outbox.send_block(&self.world, cell, value);
    }

    /// Undo the client's local prediction for `cell`.
    pub fn revert_block(&self, cell: CellPos) {
        self.send_block(cell, self.world.get_block(cell));
    }

    /// Send a kick and mark the connection for closing. Later kicks are ignored.
    pub fn kick(&mut self, reason: &str) {
        if self.disconnected.is_some() {
            return;
        }
        warn!(conn = %self.id, name = %self.name, "kicked: {}", reason);
        self.outbox.send(ServerPacket::Kick {
            reason: reason.to_string(),
        });
        self.disconnected = Some(reason.to_string());
    }

    /// Detach from the world and the roster.
    pub fn leave(&mut self) {
        self.world.remove_observer(self.id);
        self.ctx.roster.remove(self.id);
        if self.is_logged_in() {
            info!(conn = %self.id, name = %self.name, "disconnected");
        }
    }
}

impl Requester for Connection {
    fn connection_id(&self) -> ConnectionId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn rank(&self) -> Rank {
        self.rank
    }

    fn message(&self, text: &str) {
        self.outbox.message(text);
    }
}
