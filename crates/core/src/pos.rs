//! Cell addresses and entity positions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Height of a player's eyes above their feet, in 1/32 block units.
pub const EYE_HEIGHT: i32 = 51;

/// Address of one cell in a world grid.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellPos {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

impl CellPos {
    pub const fn new(x: u16, y: u16, z: u16) -> Self {
        Self { x, y, z }
    }

    /// The cell directly underneath, if any.
    pub fn below(self) -> Option<Self> {
        self.y.checked_sub(1).map(|y| Self { y, ..self })
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Entity position in fixed-point 1/32 block units; `y` is eye level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Position of an entity standing centered on the given block.
    pub const fn from_block(x: i32, y: i32, z: i32) -> Self {
        Self {
            x: x * 32 + 16,
            y: y * 32 + EYE_HEIGHT,
            z: z * 32 + 16,
        }
    }

    /// Block coordinates of the feet.
    ///
    /// Coordinates come straight off the wire, so the eye offset wraps.
    pub const fn block_coords(self) -> (i32, i32, i32) {
        (self.x >> 5, self.y.wrapping_sub(EYE_HEIGHT) >> 5, self.z >> 5)
    }

    /// Whole-block Euclidean distance to a cell, truncated toward zero.
    pub fn block_distance(self, cell: CellPos) -> i32 {
        let (bx, by, bz) = self.block_coords();
        let dx = (bx - i32::from(cell.x)) as f64;
        let dy = (by - i32::from(cell.y)) as f64;
        let dz = (bz - i32::from(cell.z)) as f64;
        (dx * dx + dy * dy + dz * dz).sqrt() as i32
    }
}
