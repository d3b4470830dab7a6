//! Capabilities the world hands out to per-block behaviour.

use crate::World;
use anyhow::Result;
use voxelgate_core::{BlockValue, CellPos, ConnectionId, Rank};

/// Whoever asked for an edit, as seen by world-side code.
pub trait Requester {
    fn connection_id(&self) -> ConnectionId;
    fn name(&self) -> &str;
    fn rank(&self) -> Rank;
    /// Send a chat line to the requester only.
    fn message(&self, text: &str);
}

/// Custom behaviour run instead of the generic apply when a block is placed.
pub trait PlaceHandler: Send + Sync {
    fn on_place(
        &self,
        world: &World,
        who: &dyn Requester,
        old: BlockValue,
        cell: CellPos,
    ) -> Result<()>;
}

/// Custom behaviour run instead of the generic apply when a block is deleted.
pub trait DeleteHandler: Send + Sync {
    fn on_delete(
        &self,
        world: &World,
        who: &dyn Requester,
        old: BlockValue,
        cell: CellPos,
    ) -> Result<()>;
}

impl<F> PlaceHandler for F
where
    F: Fn(&World, &dyn Requester, BlockValue, CellPos) -> Result<()> + Send + Sync,
{
    fn on_place(
        &self,
        world: &World,
        who: &dyn Requester,
        old: BlockValue,
        cell: CellPos,
    ) -> Result<()> {
        self(world, who, old, cell)
    }
}

impl<F> DeleteHandler for F
where
    F: Fn(&World, &dyn Requester, BlockValue, CellPos) -> Result<()> + Send + Sync,
{
    fn on_delete(
        &self,
        world: &World,
        who: &dyn Requester,
        old: BlockValue,
        cell: CellPos,
    ) -> Result<()> {
        self(world, who, old, cell)
    }
}

/// Receives block updates that other clients need to see.
pub trait BlockObserver: Send + Sync {
    fn observer_id(&self) -> ConnectionId;
    fn observe_block(&self, world: &World, cell: CellPos, block: BlockValue);
}
