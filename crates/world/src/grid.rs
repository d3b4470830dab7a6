//! The world grid and its per-world rules.

use crate::{
    AuditLedger, BlockObserver, BlockPermissions, DeleteHandler, PlaceHandler, WorldError,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;
use voxelgate_core::block::{self, BlockId};
use voxelgate_core::{BlockValue, CellPos, ConnectionId, Rank};

/// Physics modes under which grass spreads and decays on manual edits.
pub const QUIESCENT_PHYSICS: [u8; 2] = [0, 5];

/// Per-world toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u16,
    pub height: u16,
    pub length: u16,
    /// Whether clients may place blocks.
    pub buildable: bool,
    /// Whether clients may delete blocks.
    pub deletable: bool,
    /// Dirt under air becomes grass, grass under solid blocks becomes dirt.
    pub grass_grow: bool,
    /// Read-mostly world; edits only reach raw edit handlers.
    pub museum: bool,
    /// Physics mode id.
    pub physics: u8,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 64,
            length: 128,
            buildable: true,
            deletable: true,
            grass_grow: true,
            museum: false,
            physics: 0,
        }
    }
}

/// Definition of an extended-palette block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomBlockDef {
    pub name: String,
    pub blocks_light: bool,
    /// Base block shown to clients that cannot render extended blocks.
    pub fallback: BlockId,
}

/// Result of [`World::try_apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The cell already held the value.
    NoOp,
    /// Stored, but renders the same as before.
    AppliedSilent,
    /// Stored and looks different; observers must be told.
    AppliedVisual,
}

impl MutationOutcome {
    pub fn applied(self) -> bool {
        !matches!(self, MutationOutcome::NoOp)
    }
}

struct Cells {
    blocks: Vec<u8>,
    ext: Vec<u8>,
}

/// A bounded 3D grid of blocks plus everything needed to judge edits to it.
///
/// Cell updates are serialized by an internal lock; [`World::try_apply`] is the
/// only place a cell is read and written as one step.
pub struct World {
    name: String,
    width: u16,
    height: u16,
    length: u16,
    config: RwLock<WorldConfig>,
    cells: Mutex<Cells>,
    waits: Mutex<HashSet<usize>>,
    perms: Arc<BlockPermissions>,
    custom_defs: RwLock<HashMap<BlockId, CustomBlockDef>>,
    place_handlers: HashMap<usize, Arc<dyn PlaceHandler>>,
    delete_handlers: HashMap<usize, Arc<dyn DeleteHandler>>,
    observers: Mutex<Vec<Arc<dyn BlockObserver>>>,
    audit: AuditLedger,
}

impl World {
    /// Create an all-air world sized by `config`.
    pub fn new(name: impl Into<String>, config: WorldConfig, perms: Arc<BlockPermissions>) -> Self {
        let volume = config.width as usize * config.height as usize * config.length as usize;
        Self {
            name: name.into(),
            width: config.width,
            height: config.height,
            length: config.length,
            config: RwLock::new(config),
            cells: Mutex::new(Cells {
                blocks: vec![block::AIR; volume],
                ext: vec![0; volume],
            }),
            waits: Mutex::new(HashSet::new()),
            perms,
            custom_defs: RwLock::new(HashMap::new()),
            place_handlers: HashMap::new(),
            delete_handlers: HashMap::new(),
            observers: Mutex::new(Vec::new()),
            audit: AuditLedger::new(),
        }
    }

    /// Create a world with dirt below the midpoint and a grass surface.
    pub fn flat(name: impl Into<String>, config: WorldConfig, perms: Arc<BlockPermissions>) -> Self {
        let world = Self::new(name, config, perms);
        let surface = world.height / 2;
        {
            let mut cells = world.cells.lock().unwrap_or_else(|e| e.into_inner());
            for y in 0..surface {
                let id = if y + 1 == surface {
                    block::GRASS
                } else {
                    block::DIRT
                };
                for z in 0..world.length {
                    for x in 0..world.width {
                        let index = world.raw_index(CellPos::new(x, y, z));
                        cells.blocks[index] = id;
                    }
                }
            }
        }
        world
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> (u16, u16, u16) {
        (self.width, self.height, self.length)
    }

    pub fn contains(&self, cell: CellPos) -> bool {
        cell.x < self.width && cell.y < self.height && cell.z < self.length
    }

    fn raw_index(&self, cell: CellPos) -> usize {
        (cell.y as usize * self.length as usize + cell.z as usize) * self.width as usize
            + cell.x as usize
    }

    fn index(&self, cell: CellPos) -> Option<usize> {
        self.contains(cell).then(|| self.raw_index(cell))
    }

    pub fn config(&self) -> WorldConfig {
        *self.config.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Change runtime toggles. Dimensions are fixed at creation and ignored here.
    pub fn update_config(&self, f: impl FnOnce(&mut WorldConfig)) {
        let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
        f(&mut config);
        config.width = self.width;
        config.height = self.height;
        config.length = self.length;
    }

    pub fn is_museum(&self) -> bool {
        self.config().museum
    }

    /// Current value of a cell, or [`BlockValue::INVALID`] outside the world.
    pub fn get_block(&self, cell: CellPos) -> BlockValue {
        let Some(index) = self.index(cell) else {
            return BlockValue::INVALID;
        };
        let cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        BlockValue {
            block: cells.blocks[index],
            ext: cells.ext[index],
        }
    }

    /// Store a value without classification, broadcasting, or auditing.
    pub fn set_block(&self, cell: CellPos, value: BlockValue) -> Result<(), WorldError> {
        let index = self.index(cell).ok_or(WorldError::OutOfBounds(cell))?;
        let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        cells.blocks[index] = value.block;
        cells.ext[index] = value.ext;
        Ok(())
    }

    /// Atomically compare-and-store a cell.
    ///
    /// Returns the classification together with the value the cell held when the
    /// store happened.
    pub fn try_apply(
        &self,
        cell: CellPos,
        value: BlockValue,
    ) -> Result<(MutationOutcome, BlockValue), WorldError> {
        let index = self.index(cell).ok_or(WorldError::OutOfBounds(cell))?;
        let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        let old = BlockValue {
            block: cells.blocks[index],
            ext: cells.ext[index],
        };
        if old == value {
            return Ok((MutationOutcome::NoOp, old));
        }
        cells.blocks[index] = value.block;
        cells.ext[index] = value.ext;
        drop(cells);

        self.waits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&index);
        let outcome = if old.visually_equals(value) {
            MutationOutcome::AppliedSilent
        } else {
            MutationOutcome::AppliedVisual
        };
        Ok((outcome, old))
    }

    /// Apply a change and show it to every observer when it is visible.
    ///
    /// Used for secondary effects that no client predicted.
    pub fn blockchange(
        &self,
        cell: CellPos,
        value: BlockValue,
    ) -> Result<MutationOutcome, WorldError> {
        let (outcome, _) = self.try_apply(cell, value)?;
        if outcome == MutationOutcome::AppliedVisual {
            self.broadcast(cell, value, None);
        }
        Ok(outcome)
    }

    pub fn add_observer(&self, observer: Arc<dyn BlockObserver>) {
        self.observers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(observer);
    }

    pub fn remove_observer(&self, id: ConnectionId) {
        self.observers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|o| o.observer_id() != id);
    }

    /// Send a cell update to every observer except `except`.
    pub fn broadcast(&self, cell: CellPos, value: BlockValue, except: Option<ConnectionId>) {
        let observers = self
            .observers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for observer in observers {
            if Some(observer.observer_id()) == except {
                continue;
            }
            observer.observe_block(self, cell, value);
        }
    }

    /// Mark a cell as waiting on a physics timer.
    pub fn schedule_wait(&self, cell: CellPos) {
        if let Some(index) = self.index(cell) {
            debug!(%cell, world = %self.name, "physics wait scheduled");
            self.waits
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(index);
        }
    }

    pub fn has_pending_wait(&self, cell: CellPos) -> bool {
        self.index(cell).is_some_and(|index| {
            self.waits
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .contains(&index)
        })
    }

    pub fn permissions(&self) -> &BlockPermissions {
        &self.perms
    }

    /// Whether `rank` may remove or overwrite `old`.
    pub fn can_affect(&self, rank: Rank, old: BlockValue) -> bool {
        self.perms.usable_by(rank, old) || old.is_buildable_over() || old.is_breakable()
    }

    /// Whether `rank` may place `value`.
    pub fn can_place(&self, rank: Rank, value: BlockValue) -> bool {
        self.perms.usable_by(rank, value)
    }

    pub fn define_custom(&self, ext: BlockId, def: CustomBlockDef) {
        self.custom_defs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(ext, def);
    }

    pub fn custom_def(&self, ext: BlockId) -> Option<CustomBlockDef> {
        self.custom_defs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&ext)
            .cloned()
    }

    pub fn light_passes(&self, value: BlockValue) -> bool {
        if value.is_custom() {
            return self.custom_def(value.ext).is_some_and(|def| !def.blocks_light);
        }
        value.light_passes()
    }

    /// Register custom placement behaviour. Must happen before the world is shared.
    pub fn set_place_handler(&mut self, value: BlockValue, handler: Arc<dyn PlaceHandler>) {
        self.place_handlers.insert(value.index(), handler);
    }

    /// Register custom deletion behaviour. Must happen before the world is shared.
    pub fn set_delete_handler(&mut self, value: BlockValue, handler: Arc<dyn DeleteHandler>) {
        self.delete_handlers.insert(value.index(), handler);
    }

    pub fn place_handler(&self, value: BlockValue) -> Option<Arc<dyn PlaceHandler>> {
        self.place_handlers.get(&value.index()).cloned()
    }

    pub fn delete_handler(&self, value: BlockValue) -> Option<Arc<dyn DeleteHandler>> {
        self.delete_handlers.get(&value.index()).cloned()
    }

    pub fn audit(&self) -> &AuditLedger {
        &self.audit
    }
}
