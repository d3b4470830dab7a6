//! Logged-in connections and chat fan-out.

use crate::Outbox;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::info;
use voxelgate_core::ConnectionId;
use voxelgate_net::ServerPacket;

/// Destination for chat lines.
pub trait ChatSink: Send + Sync {
    /// Deliver a chat line from `name`.
    fn chat(&self, from: ConnectionId, name: &str, text: &str);
}

/// Every logged-in connection, by id.
#[derive(Default)]
pub struct Roster {
    members: Mutex<BTreeMap<ConnectionId, (String, Arc<Outbox>)>>,
}

impl Roster {
    /// Add a connection after login.
    pub fn add(&self, name: &str, outbox: Arc<Outbox>) {
        self.members
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(outbox.id(), (name.to_string(), outbox));
    }

    /// Remove a connection; unknown ids are ignored.
    pub fn remove(&self, id: ConnectionId) {
        self.members
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
    }

    /// Number of logged-in connections.
    pub fn len(&self) -> usize {
        self.members.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True when nobody is logged in.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names in connection order.
    pub fn names(&self) -> Vec<String> {
        self.members
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Send a server message to everyone.
    pub fn announce(&self, text: &str) {
        let members = self.members.lock().unwrap_or_else(|e| e.into_inner());
        for (_, outbox) in members.values() {
            outbox.message(text);
        }
    }
}

impl ChatSink for Roster {
    fn chat(&self, _from: ConnectionId, name: &str, text: &str) {
        info!(target: "chat", "<{}> {}", name, text);
        self.announce(&format!("{name}: {text}"));
    }
}
