//! Server-wide rules shared by every connection.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;
use voxelgate_core::Rank;

/// Slack added to the configured reach distance before a guest edit is rejected.
pub const REACH_SLACK: f32 = 4.0;

/// Server-wide policy, loaded from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerPolicy {
    /// Name sent in the identification packet.
    pub server_name: String,
    /// Message of the day sent in the identification packet.
    pub motd: String,
    /// Operators must confirm their identity before editing.
    pub verify_admins: bool,
    /// New connections must agree to the rules before editing or using commands.
    pub agree_to_rules_on_entry: bool,
    /// Rank of names not listed in `ranks`.
    pub default_rank: Rank,
    /// Per-name rank assignments.
    pub ranks: HashMap<String, Rank>,
    /// Reach distance in blocks before [`REACH_SLACK`] is added.
    pub reach_distance: f32,
    /// Edits allowed inside one spam interval; 0 disables the check.
    pub block_spam_count: usize,
    /// Length of the spam window in seconds.
    pub block_spam_interval_secs: u64,
    /// Peers treated as trusted non-interactive monitors.
    pub monitors: Vec<IpAddr>,
}

impl Default for ServerPolicy {
    fn default() -> Self {
        Self {
            server_name: "voxelgate".to_string(),
            motd: "Welcome!".to_string(),
            verify_admins: false,
            agree_to_rules_on_entry: false,
            default_rank: Rank::Guest,
            ranks: HashMap::new(),
            reach_distance: 5.0,
            block_spam_count: 200,
            block_spam_interval_secs: 5,
            monitors: Vec::new(),
        }
    }
}

impl ServerPolicy {
    /// Rank assigned to a name at login.
    pub fn rank_of(&self, name: &str) -> Rank {
        self.ranks
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, rank)| *rank)
            .unwrap_or(self.default_rank)
    }

    /// Length of the spam window.
    pub fn block_spam_interval(&self) -> Duration {
        Duration::from_secs(self.block_spam_interval_secs)
    }
}
