//! Core primitives shared across the workspace.

pub mod block;
mod pos;
mod rank;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use block::BlockValue;
pub use pos::{CellPos, Position};
pub use rank::{ParseRankError, Rank};

/// Stable identifier for a connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
