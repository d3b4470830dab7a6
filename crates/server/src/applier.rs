//! Committing an accepted edit to the world.

use crate::Connection;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, warn};
use voxelgate_core::block;
use voxelgate_core::{BlockValue, CellPos};
use voxelgate_world::{
    AuditFlags, AuditRecord, MutationOutcome, World, WorldError, QUIESCENT_PHYSICS,
};

impl Connection {
    /// Store `block` at `cell` on behalf of this connection.
    ///
    /// Visible changes are sent to every other connection watching the world. Every applied
    /// change is written to the audit ledger and the connection's recent edits,
    /// and may turn the block underneath into grass or dirt.
    pub fn change_block(&mut self, cell: CellPos, block: BlockValue) -> Result<MutationOutcome> {
        let world = Arc::clone(self.world());
        let (outcome, old) = world.try_apply(cell, block)?;
        if outcome == MutationOutcome::NoOp {
            return Ok(outcome);
        }
        if outcome == MutationOutcome::AppliedVisual {
            world.broadcast(cell, block, Some(self.id()));
        }

        let flags = if self.painting && old.is_replaceable() {
            AuditFlags::PAINTED
        } else {
            AuditFlags::MANUAL_PLACE
        };
        world
            .audit()
            .append(AuditRecord::new(self.name.as_str(), cell, flags, old, block));
        self.recent.push(cell, old, block, flags);
        debug!(name = %self.name, %cell, %old, new = %block, "block changed");

        if let Err(err) = grow_terrain(&world, cell, block) {
            warn!(%cell, "terrain update failed: {}", err);
        }
        Ok(outcome)
    }
}

/// Grass grows on dirt uncovered to the sky and dies under opaque blocks.
fn grow_terrain(world: &World, cell: CellPos, placed: BlockValue) -> Result<(), WorldError> {
    let config = world.config();
    if !config.grass_grow || !QUIESCENT_PHYSICS.contains(&config.physics) {
        return Ok(());
    }
    let Some(below) = cell.below() else {
        return Ok(());
    };
    let under = world.get_block(below);
    if under.block == block::DIRT && placed.is_air() {
        world.blockchange(below, BlockValue::new(block::GRASS))?;
    } else if under.block == block::GRASS && !world.light_passes(placed) {
        world.blockchange(below, BlockValue::new(block::DIRT))?;
    }
    Ok(())
}
