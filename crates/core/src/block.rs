//! Block identifiers, visual conversion, and per-block properties.
//!
//! Clients only understand the base palette (`0..CPE_COUNT`). Ids above it are
//! server-side variants (physics/door blocks) that render as some base block, plus
//! the [`CUSTOM_BLOCK`] marker that selects an entry of the extended palette.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw block identifier.
pub type BlockId = u8;

pub const AIR: BlockId = 0;
pub const STONE: BlockId = 1;
pub const GRASS: BlockId = 2;
pub const DIRT: BlockId = 3;
pub const COBBLESTONE: BlockId = 4;
pub const WOOD: BlockId = 5;
pub const SAPLING: BlockId = 6;
pub const BEDROCK: BlockId = 7;
pub const WATER: BlockId = 8;
pub const STILL_WATER: BlockId = 9;
pub const LAVA: BlockId = 10;
pub const STILL_LAVA: BlockId = 11;
pub const SAND: BlockId = 12;
pub const GRAVEL: BlockId = 13;
pub const GOLD_ORE: BlockId = 14;
pub const IRON_ORE: BlockId = 15;
pub const COAL_ORE: BlockId = 16;
pub const LOG: BlockId = 17;
pub const LEAVES: BlockId = 18;
pub const SPONGE: BlockId = 19;
pub const GLASS: BlockId = 20;
pub const RED: BlockId = 21;
pub const ORANGE: BlockId = 22;
pub const YELLOW: BlockId = 23;
pub const LIME: BlockId = 24;
pub const GREEN: BlockId = 25;
pub const TEAL: BlockId = 26;
pub const AQUA: BlockId = 27;
pub const CYAN: BlockId = 28;
pub const BLUE: BlockId = 29;
pub const INDIGO: BlockId = 30;
pub const VIOLET: BlockId = 31;
pub const MAGENTA: BlockId = 32;
pub const PINK: BlockId = 33;
pub const BLACK: BlockId = 34;
pub const GRAY: BlockId = 35;
pub const WHITE: BlockId = 36;
pub const DANDELION: BlockId = 37;
pub const ROSE: BlockId = 38;
pub const BROWN_MUSHROOM: BlockId = 39;
pub const RED_MUSHROOM: BlockId = 40;
pub const GOLD: BlockId = 41;
pub const IRON: BlockId = 42;
pub const DOUBLE_SLAB: BlockId = 43;
pub const SLAB: BlockId = 44;
pub const BRICK: BlockId = 45;
pub const TNT: BlockId = 46;
pub const BOOKSHELF: BlockId = 47;
pub const MOSSY_ROCKS: BlockId = 48;
pub const OBSIDIAN: BlockId = 49;
pub const COBBLESTONE_SLAB: BlockId = 50;
pub const ROPE: BlockId = 51;
pub const SANDSTONE: BlockId = 52;
pub const SNOW: BlockId = 53;
pub const FIRE: BlockId = 54;
pub const LIGHT_PINK: BlockId = 55;
pub const FOREST_GREEN: BlockId = 56;
pub const BROWN: BlockId = 57;
pub const DEEP_BLUE: BlockId = 58;
pub const TURQUOISE: BlockId = 59;
pub const ICE: BlockId = 60;
pub const CERAMIC_TILE: BlockId = 61;
pub const MAGMA: BlockId = 62;
pub const PILLAR: BlockId = 63;
pub const CRATE: BlockId = 64;
pub const STONE_BRICK: BlockId = 65;

/// Number of ids in the base client palette.
pub const CPE_COUNT: BlockId = 66;
/// Last id of the original (pre-extension) palette.
pub const CLASSIC_MAX: BlockId = OBSIDIAN;

pub const OP_GLASS: BlockId = 100;
pub const OPSIDIAN: BlockId = 101;
pub const OP_BRICK: BlockId = 102;
pub const OP_STONE: BlockId = 103;
pub const OP_COBBLESTONE: BlockId = 104;
pub const OP_AIR: BlockId = 105;
pub const OP_WATER: BlockId = 106;
pub const OP_LAVA: BlockId = 107;
pub const LAVA_FAST: BlockId = 112;
pub const ACTIVE_WATER: BlockId = 140;
pub const ACTIVE_LAVA: BlockId = 141;

pub const DOOR_LOG: BlockId = 111;
pub const DOOR_OBSIDIAN: BlockId = 113;
pub const DOOR_GLASS: BlockId = 114;
pub const DOOR_STONE: BlockId = 115;
pub const DOOR_LEAVES: BlockId = 116;
pub const DOOR_SAND: BlockId = 117;
pub const DOOR_WOOD: BlockId = 118;
pub const DOOR_GREEN: BlockId = 119;
pub const DOOR_TNT: BlockId = 120;
pub const DOOR_SLAB: BlockId = 121;
pub const DOOR_IRON: BlockId = 122;
pub const DOOR_GOLD: BlockId = 123;
pub const DOOR_WHITE: BlockId = 124;
pub const SMALL_TNT: BlockId = 182;

/// Marker id: the real block lives in the extended palette.
pub const CUSTOM_BLOCK: BlockId = 163;

/// First id of the animated range (flood air and opened door air).
pub const AIR_FLOOD: BlockId = 200;
pub const DOOR_LOG_AIR: BlockId = 201;
pub const AIR_FLOOD_LAYER: BlockId = 202;
pub const AIR_FLOOD_DOWN: BlockId = 203;
pub const AIR_FLOOD_UP: BlockId = 204;
pub const DOOR_OBSIDIAN_AIR: BlockId = 205;
pub const DOOR_GLASS_AIR: BlockId = 206;
pub const DOOR_STONE_AIR: BlockId = 207;
pub const DOOR_LEAVES_AIR: BlockId = 208;
pub const DOOR_SAND_AIR: BlockId = 209;
pub const DOOR_WOOD_AIR: BlockId = 210;
pub const DOOR_GREEN_AIR: BlockId = 211;
pub const DOOR_TNT_AIR: BlockId = 212;
pub const DOOR_SLAB_AIR: BlockId = 213;
pub const DOOR_IRON_AIR: BlockId = 214;
/// Last id of the animated range.
pub const DOOR_AIR_AIR: BlockId = 215;

/// "No block" / out-of-range marker.
pub const INVALID: BlockId = 0xff;

/// Content of one cell: a block id plus the extended id used when `block` is
/// [`CUSTOM_BLOCK`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockValue {
    /// Base or server-side id.
    pub block: BlockId,
    /// Extended palette id, only meaningful for [`CUSTOM_BLOCK`].
    pub ext: BlockId,
}

impl BlockValue {
    /// Empty cell.
    pub const AIR: Self = Self::new(AIR);
    /// Returned for addresses outside the world.
    pub const INVALID: Self = Self::new(INVALID);

    /// Block from the base or server-side id space.
    pub const fn new(block: BlockId) -> Self {
        Self { block, ext: 0 }
    }

    /// Block from the extended palette.
    pub const fn custom(ext: BlockId) -> Self {
        Self {
            block: CUSTOM_BLOCK,
            ext,
        }
    }

    /// Decode the single byte a client sends for its held block.
    ///
    /// Anything past the base palette refers to the extended palette.
    pub const fn from_raw(raw: u8) -> Self {
        if raw < CPE_COUNT {
            Self::new(raw)
        } else {
            Self::custom(raw)
        }
    }

    /// Byte a client would use for this block.
    pub const fn raw_id(self) -> u8 {
        if self.is_custom() {
            self.ext
        } else {
            self.block
        }
    }

    /// Index into tables that cover both palettes (0..512).
    pub const fn index(self) -> usize {
        if self.is_custom() {
            256 + self.ext as usize
        } else {
            self.block as usize
        }
    }

    pub const fn is_custom(self) -> bool {
        self.block == CUSTOM_BLOCK
    }

    pub const fn is_invalid(self) -> bool {
        self.block == INVALID
    }

    pub const fn is_air(self) -> bool {
        self.block == AIR
    }

    /// The base block this value renders as.
    pub const fn visual(self) -> Self {
        if self.is_custom() {
            self
        } else {
            Self::new(convert(self.block))
        }
    }

    /// True when both values look the same to a client, even if their ids differ.
    pub fn visually_equals(self, other: Self) -> bool {
        self.visual() == other.visual()
    }

    /// Air and liquids: cells that painting may overwrite without it counting as a
    /// manual placement.
    pub const fn is_replaceable(self) -> bool {
        if self.is_custom() {
            return false;
        }
        let b = convert(self.block);
        b == AIR || (b >= WATER && b <= STILL_LAVA)
    }

    /// Liquid cells that anyone may build into.
    pub const fn is_buildable_over(self) -> bool {
        if self.is_custom() || self.block == OP_WATER || self.block == OP_LAVA {
            return false;
        }
        let b = convert(self.block);
        b >= WATER && b <= STILL_LAVA
    }

    /// Blocks that anyone may break regardless of rank (doors and small explosives).
    pub const fn is_breakable(self) -> bool {
        if self.is_custom() {
            return false;
        }
        matches!(self.block, DOOR_LOG..=DOOR_WHITE | SMALL_TNT) && self.block != LAVA_FAST
    }

    /// Blocks whose state is being animated by the server. Clients may not touch them.
    pub const fn is_active(self) -> bool {
        !self.is_custom() && self.block >= AIR_FLOOD && self.block <= DOOR_AIR_AIR
    }

    /// Light passes through transparent and non-solid base blocks.
    ///
    /// Custom blocks consult their world definition instead.
    pub const fn light_passes(self) -> bool {
        matches!(
            convert(self.block),
            AIR | SAPLING
                | LEAVES
                | GLASS
                | DANDELION
                | ROSE
                | BROWN_MUSHROOM
                | RED_MUSHROOM
                | ROPE
                | FIRE
                | ICE
        )
    }
}

impl Default for BlockValue {
    fn default() -> Self {
        Self::AIR
    }
}

impl fmt::Display for BlockValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_custom() {
            write!(f, "custom#{}", self.ext)
        } else {
            f.write_str(name(self.block))
        }
    }
}

/// Map a server-side id to the base block it renders as.
pub const fn convert(block: BlockId) -> BlockId {
    if block < CPE_COUNT {
        return block;
    }
    match block {
        OP_GLASS | DOOR_GLASS => GLASS,
        OPSIDIAN | DOOR_OBSIDIAN => OBSIDIAN,
        OP_BRICK => BRICK,
        OP_STONE | DOOR_STONE => STONE,
        OP_COBBLESTONE => COBBLESTONE,
        OP_AIR => AIR,
        OP_WATER | ACTIVE_WATER => WATER,
        OP_LAVA | ACTIVE_LAVA | LAVA_FAST => LAVA,
        DOOR_LOG => LOG,
        DOOR_LEAVES => LEAVES,
        DOOR_SAND => SAND,
        DOOR_WOOD => WOOD,
        DOOR_GREEN => GREEN,
        DOOR_TNT | SMALL_TNT => TNT,
        DOOR_SLAB => SLAB,
        DOOR_IRON => IRON,
        DOOR_GOLD => GOLD,
        DOOR_WHITE => WHITE,
        AIR_FLOOD..=DOOR_AIR_AIR => AIR,
        INVALID => INVALID,
        _ => ORANGE,
    }
}

/// Stand-in for extension-palette blocks when the client lacks support for them.
pub const fn classic_fallback(block: BlockId) -> BlockId {
    match block {
        COBBLESTONE_SLAB => SLAB,
        ROPE => BROWN_MUSHROOM,
        SANDSTONE => SAND,
        SNOW => AIR,
        FIRE => LAVA,
        LIGHT_PINK => PINK,
        FOREST_GREEN => GREEN,
        BROWN => DIRT,
        DEEP_BLUE => BLUE,
        TURQUOISE => CYAN,
        ICE => GLASS,
        CERAMIC_TILE => IRON,
        MAGMA => OBSIDIAN,
        PILLAR => WHITE,
        CRATE => WOOD,
        STONE_BRICK => STONE,
        other => other,
    }
}

/// Human readable name used in player-facing messages.
pub const fn name(block: BlockId) -> &'static str {
    match block {
        AIR => "Air",
        STONE => "Stone",
        GRASS => "Grass",
        DIRT => "Dirt",
        COBBLESTONE => "Cobblestone",
        WOOD => "Wood",
        SAPLING => "Sapling",
        BEDROCK => "Bedrock",
        WATER => "Active_Water",
        STILL_WATER => "Water",
        LAVA => "Active_Lava",
        STILL_LAVA => "Lava",
        SAND => "Sand",
        GRAVEL => "Gravel",
        LOG => "Log",
        LEAVES => "Leaves",
        GLASS => "Glass",
        TNT => "TNT",
        OBSIDIAN => "Obsidian",
        OP_GLASS => "Op_Glass",
        OPSIDIAN => "Opsidian",
        OP_BRICK => "Op_Brick",
        OP_STONE => "Op_Stone",
        OP_COBBLESTONE => "Op_Cobblestone",
        OP_AIR => "Op_Air",
        OP_WATER => "Op_Water",
        OP_LAVA => "Op_Lava",
        CUSTOM_BLOCK => "Custom_Block",
        DOOR_LOG..=DOOR_WHITE => "Door",
        SMALL_TNT => "Small_TNT",
        AIR_FLOOD..=DOOR_AIR_AIR => "Active_Air",
        INVALID => "Invalid",
        _ if block < CPE_COUNT => "Block",
        _ => "Unknown",
    }
}
