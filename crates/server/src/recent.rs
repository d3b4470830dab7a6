//! Per-connection cache of recent edits.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use voxelgate_core::{BlockValue, CellPos};
use voxelgate_world::AuditFlags;

/// Number of edits remembered per connection.
pub const RECENT_ACTIONS: usize = 200;

/// One remembered edit.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentAction {
    /// Edited cell.
    pub cell: CellPos,
    /// Value before the edit.
    pub old: BlockValue,
    /// Value after the edit.
    pub new: BlockValue,
    /// How the edit came about.
    pub flags: AuditFlags,
    /// When it was applied.
    pub at: DateTime<Utc>,
}

/// Bounded history; the oldest entry is evicted first.
#[derive(Debug, Clone)]
pub struct RecentActions {
    entries: VecDeque<RecentAction>,
    capacity: usize,
}

impl Default for RecentActions {
    fn default() -> Self {
        Self::with_capacity(RECENT_ACTIONS)
    }
}

impl RecentActions {
    /// History holding at most `capacity` edits.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Remember an applied edit.
    pub fn push(&mut self, cell: CellPos, old: BlockValue, new: BlockValue, flags: AuditFlags) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(RecentAction {
            cell,
            old,
            new,
            flags,
            at: Utc::now(),
        });
    }

    /// Number of remembered edits.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been remembered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent edit.
    pub fn latest(&self) -> Option<&RecentAction> {
        self.entries.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &RecentAction> {
        self.entries.iter()
    }
}
