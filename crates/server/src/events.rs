//! Hooks that let plugins observe and cancel connection activity.

use std::sync::RwLock;
use voxelgate_core::{BlockValue, CellPos, Position};
use voxelgate_net::PlayerClick;
use voxelgate_world::Requester;

/// Listener for block edits; returning true cancels the edit.
pub type BlockChangeListener =
    Box<dyn Fn(&dyn Requester, CellPos, BlockValue, bool) -> bool + Send + Sync>;
/// Listener for movement; returning true cancels the move.
pub type MoveListener = Box<dyn Fn(&dyn Requester, Position, u8, u8) -> bool + Send + Sync>;
/// Listener for mouse clicks.
pub type ClickListener = Box<dyn Fn(&dyn Requester, &PlayerClick) + Send + Sync>;

/// Registered listeners, invoked in registration order.
#[derive(Default)]
pub struct EventBus {
    block_change: RwLock<Vec<BlockChangeListener>>,
    movement: RwLock<Vec<MoveListener>>,
    click: RwLock<Vec<ClickListener>>,
}

impl EventBus {
    /// Register a block change listener.
    pub fn on_block_change(
        &self,
        listener: impl Fn(&dyn Requester, CellPos, BlockValue, bool) -> bool + Send + Sync + 'static,
    ) {
        self.block_change
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(listener));
    }

    /// Register a movement listener.
    pub fn on_move(
        &self,
        listener: impl Fn(&dyn Requester, Position, u8, u8) -> bool + Send + Sync + 'static,
    ) {
        self.movement
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(listener));
    }

    /// Register a click listener.
    pub fn on_click(&self, listener: impl Fn(&dyn Requester, &PlayerClick) + Send + Sync + 'static) {
        self.click
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(listener));
    }

    /// Run every block change listener; true when any of them cancelled.
    pub fn block_change_cancelled(
        &self,
        who: &dyn Requester,
        cell: CellPos,
        block: BlockValue,
        placing: bool,
    ) -> bool {
        let listeners = self.block_change.read().unwrap_or_else(|e| e.into_inner());
        listeners
            .iter()
            .fold(false, |cancelled, l| l(who, cell, block, placing) || cancelled)
    }

    /// Run every movement listener; true when any of them cancelled.
    pub fn move_cancelled(&self, who: &dyn Requester, next: Position, yaw: u8, pitch: u8) -> bool {
        let listeners = self.movement.read().unwrap_or_else(|e| e.into_inner());
        listeners
            .iter()
            .fold(false, |cancelled, l| l(who, next, yaw, pitch) || cancelled)
    }

    /// Run every click listener.
    pub fn fire_click(&self, who: &dyn Requester, click: &PlayerClick) {
        for listener in self.click.read().unwrap_or_else(|e| e.into_inner()).iter() {
            listener(who, click);
        }
    }
}

/// A running round in which players can be knocked out.
pub trait EliminationGame: Send + Sync {
    /// True when `name` is out of the current round.
    fn is_eliminated(&self, name: &str) -> bool;
}
