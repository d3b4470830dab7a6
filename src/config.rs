use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::warn;
use voxelgate_core::{block, Rank};
use voxelgate_server::ServerPolicy;
use voxelgate_world::{BlockPerm, BlockPermissions, WorldConfig};

pub const DEFAULT_CONFIG_PATH: &str = "config/server.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub world_name: String,
    pub world: WorldConfig,
    pub policy: ServerPolicy,
    /// Minimum rank per block name, applied over the built-in table.
    pub block_ranks: HashMap<String, Rank>,
    /// Append every applied edit to this file as JSON lines.
    pub audit_log: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 25565)),
            world_name: "main".to_string(),
            world: WorldConfig::default(),
            policy: ServerPolicy::default(),
            block_ranks: HashMap::new(),
            audit_log: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<ServerConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    ServerConfig::default()
                }
            },
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    warn!("Server config not found at {}. Using defaults", path.display());
                } else {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                ServerConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }

    /// Built-in block permissions with `block_ranks` applied. Unknown names are skipped.
    pub fn block_permissions(&self) -> BlockPermissions {
        let mut perms = BlockPermissions::default();
        for (name, rank) in &self.block_ranks {
            match block_by_name(name) {
                Some(id) => perms.set(id, BlockPerm::min(*rank)),
                None => warn!("Unknown block {:?} in block_ranks", name),
            }
        }
        perms
    }
}

fn block_by_name(name: &str) -> Option<block::BlockId> {
    (0..=u8::MAX).find(|&id| block::name(id).eq_ignore_ascii_case(name))
}
