//! Block grid, per-world rules, permission tables, and the audit ledger.

mod audit;
mod grid;
mod handlers;
mod perms;

pub use audit::*;
pub use grid::*;
pub use handlers::*;
pub use perms::*;

use thiserror::Error;
use voxelgate_core::CellPos;

/// Errors raised by world operations.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("cell {0} is outside the world")]
    OutOfBounds(CellPos),
    #[error("block handler failed: {0}")]
    Handler(#[from] anyhow::Error),
}
