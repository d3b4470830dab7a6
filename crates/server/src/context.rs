//! State shared by every connection on a server.

use crate::{
    ChatSink, CommandExecutor, EliminationGame, EventBus, NoCommands, Roster, ServerPolicy,
};
use std::sync::Arc;

/// Policy, hooks and collaborators every connection consults.
pub struct ServerContext {
    /// Server-wide rules.
    pub policy: ServerPolicy,
    /// Plugin hooks.
    pub events: EventBus,
    /// Logged-in connections.
    pub roster: Arc<Roster>,
    chat: Arc<dyn ChatSink>,
    commands: Arc<dyn CommandExecutor>,
    game: Option<Arc<dyn EliminationGame>>,
}

impl ServerContext {
    /// Context with chat going to the roster and no commands or game.
    pub fn new(policy: ServerPolicy) -> Self {
        let roster = Arc::new(Roster::default());
        Self {
            policy,
            events: EventBus::default(),
            chat: roster.clone(),
            roster,
            commands: Arc::new(NoCommands),
            game: None,
        }
    }

    /// Replace the chat destination.
    pub fn with_chat(mut self, chat: Arc<dyn ChatSink>) -> Self {
        self.chat = chat;
        self
    }

    /// Install a command executor.
    pub fn with_commands(mut self, commands: Arc<dyn CommandExecutor>) -> Self {
        self.commands = commands;
        self
    }

    /// Install the running elimination game.
    pub fn with_game(mut self, game: Arc<dyn EliminationGame>) -> Self {
        self.game = Some(game);
        self
    }

    /// Where chat lines go.
    pub fn chat(&self) -> &Arc<dyn ChatSink> {
        &self.chat
    }

    /// Command executor.
    pub fn commands(&self) -> &Arc<dyn CommandExecutor> {
        &self.commands
    }

    /// Running elimination game, if any.
    pub fn game(&self) -> Option<&Arc<dyn EliminationGame>> {
        self.game.as_ref()
    }
}

impl Default for ServerContext {
    fn default() -> Self {
        Self::new(ServerPolicy::default())
    }
}
