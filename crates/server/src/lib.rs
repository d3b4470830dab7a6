#![warn(missing_docs)]
//! Connection handling for the voxel server.
//!
//! A [`Connection`] owns one client's state. Its frames are sliced by the
//! network crate and routed by the dispatcher; block edits run through the
//! mutation gate in [`gate`] and, once accepted, are committed by
//! [`Connection::change_block`].

mod applier;
pub mod commands;
mod connection;
mod context;
mod dispatch;
mod events;
pub mod gate;
mod outbox;
mod policy;
mod recent;
mod roster;
mod session;
mod spam;

pub use commands::{CommandCaller, CommandExecutor, NoCommands};
pub use connection::{Connection, LoginPhase, RawEdit, RawEditHandler};
pub use context::ServerContext;
pub use dispatch::{APP_NAME, HANDLER_FAULT};
pub use events::{BlockChangeListener, ClickListener, EliminationGame, EventBus, MoveListener};
pub use gate::{Commit, EditReport, GuardId, Verdict, GUARDS};
pub use outbox::Outbox;
pub use policy::{ServerPolicy, REACH_SLACK};
pub use recent::{RecentAction, RecentActions, RECENT_ACTIONS};
pub use roster::{ChatSink, Roster};
pub use session::serve;
pub use spam::{SpamChecker, BLOCK_SPAM_KICK};
