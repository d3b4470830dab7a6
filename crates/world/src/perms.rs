//! Per-block access control.

use voxelgate_core::block::{self, BlockId};
use voxelgate_core::{BlockValue, Rank};

/// Who may place or remove one block id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPerm {
    /// Lowest rank allowed to use the block.
    pub min_rank: Rank,
    /// Ranks allowed even though they are below `min_rank`.
    pub allowed: Vec<Rank>,
    /// Ranks denied even though they are at or above `min_rank`.
    pub disallowed: Vec<Rank>,
}

impl BlockPerm {
    pub fn min(min_rank: Rank) -> Self {
        Self {
            min_rank,
            allowed: Vec::new(),
            disallowed: Vec::new(),
        }
    }

    pub fn usable_by(&self, rank: Rank) -> bool {
        if self.disallowed.contains(&rank) {
            return false;
        }
        rank >= self.min_rank || self.allowed.contains(&rank)
    }
}

/// Access table indexed by block id. Extended-palette blocks share the
/// [`block::CUSTOM_BLOCK`] entry.
#[derive(Debug, Clone)]
pub struct BlockPermissions {
    entries: Vec<BlockPerm>,
}

impl BlockPermissions {
    /// Every block usable by guests.
    pub fn permissive() -> Self {
        Self {
            entries: vec![BlockPerm::min(Rank::Guest); 256],
        }
    }

    /// Look up the entry for a block value.
    pub fn get(&self, value: BlockValue) -> &BlockPerm {
        &self.entries[value.block as usize]
    }

    pub fn set(&mut self, block: BlockId, perm: BlockPerm) {
        self.entries[block as usize] = perm;
    }

    pub fn usable_by(&self, rank: Rank, value: BlockValue) -> bool {
        self.get(value).usable_by(rank)
    }

    /// Message shown when `rank` may not use `value`.
    pub fn cannot_use_message(&self, value: BlockValue, action: &str) -> String {
        let perm = self.get(value);
        format!("Only {}+ can {} {}.", perm.min_rank, action, value)
    }
}

impl Default for BlockPermissions {
    fn default() -> Self {
        let mut perms = Self::permissive();
        for id in [block::BEDROCK, block::OP_AIR] {
            perms.set(id, BlockPerm::min(Rank::Operator));
        }
        for id in block::OP_GLASS..=block::OP_LAVA {
            perms.set(id, BlockPerm::min(Rank::Operator));
        }
        for id in [block::WATER, block::LAVA, block::LAVA_FAST, block::ACTIVE_WATER] {
            perms.set(id, BlockPerm::min(Rank::AdvBuilder));
        }
        perms.set(block::ACTIVE_LAVA, BlockPerm::min(Rank::AdvBuilder));
        perms.set(block::TNT, BlockPerm::min(Rank::Builder));
        for id in block::AIR_FLOOD..=block::DOOR_AIR_AIR {
            perms.set(id, BlockPerm::min(Rank::Nobody));
        }
        perms.set(block::INVALID, BlockPerm::min(Rank::Nobody));
        perms
    }
}
