//! Command execution off the connection's read path.

use crate::Outbox;
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};
use voxelgate_core::{ConnectionId, Rank};
use voxelgate_world::Requester;

/// Snapshot of the connection that issued a command.
#[derive(Clone)]
pub struct CommandCaller {
    /// Issuing connection.
    pub id: ConnectionId,
    /// Account name.
    pub name: String,
    /// Rank when the command was issued.
    pub rank: Rank,
    outbox: Arc<Outbox>,
}

impl CommandCaller {
    /// Capture the caller's identity and reply channel.
    pub fn new(id: ConnectionId, name: impl Into<String>, rank: Rank, outbox: Arc<Outbox>) -> Self {
        Self {
            id,
            name: name.into(),
            rank,
            outbox,
        }
    }
}

impl Requester for CommandCaller {
    fn connection_id(&self) -> ConnectionId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn rank(&self) -> Rank {
        self.rank
    }

    fn message(&self, text: &str) {
        self.outbox.message(text);
    }
}

/// Runs chat commands.
pub trait CommandExecutor: Send + Sync {
    /// Execute `command` with its argument string.
    fn execute(&self, caller: &CommandCaller, command: &str, args: &str) -> Result<()>;
}

/// Executor used when no command system is installed.
pub struct NoCommands;

impl CommandExecutor for NoCommands {
    fn execute(&self, caller: &CommandCaller, command: &str, _args: &str) -> Result<()> {
        caller.message(&format!("Unknown command \"{command}\"."));
        Ok(())
    }
}

/// Run a command on its own named thread without waiting for it.
pub fn hand_off(
    executor: Arc<dyn CommandExecutor>,
    caller: CommandCaller,
    command: String,
    args: String,
) {
    let reply = caller.outbox.clone();
    let spawned = std::thread::Builder::new()
        .name(format!("command-{}", caller.name))
        .spawn(move || {
            info!("{} used /{} {}", caller.name, command, args);
            if let Err(e) = executor.execute(&caller, &command, &args) {
                error!("/{} from {} failed: {:#}", command, caller.name, e);
                caller.message("An error occurred when using the command!");
            }
        });
    if let Err(e) = spawned {
        error!("Failed to start command thread: {}", e);
        reply.message("Command failed.");
    }
}
