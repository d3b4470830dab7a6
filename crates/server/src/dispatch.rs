//! Routing decoded client messages to connection behaviour.

use crate::commands::{self, CommandCaller};
use crate::spam::BLOCK_SPAM_KICK;
use crate::{gate, Connection, LoginPhase};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};
use voxelgate_core::{BlockValue, CellPos, Position, Rank};
use voxelgate_net::{
    ClientPacket, Extensions, FrameContext, FrameHandler, PlayerClick, ProtocolError,
    ServerPacket, PROTOCOL_VERSION, SUPPORTED_EXTENSIONS,
};
use voxelgate_world::Requester;

/// Shown when a block handler fails.
pub const HANDLER_FAULT: &str = "An error occurred while changing that block.";
/// Software name sent during extension negotiation.
pub const APP_NAME: &str = "voxelgate";
/// User type byte marking operators in the identification packet.
const OPERATOR_USER_TYPE: u8 = 0x64;

impl FrameHandler for Connection {
    fn frame_context(&self) -> FrameContext {
        FrameContext {
            logged_in: self.is_logged_in(),
            extended_positions: self
                .extensions()
                .contains(Extensions::EXT_ENTITY_POSITIONS),
        }
    }

    fn tolerates_unknown(&self) -> bool {
        self.monitor
    }

    fn handle_frame(&mut self, frame: &[u8]) -> Result<(), ProtocolError> {
        let extended = self.frame_context().extended_positions;
        let packet = ClientPacket::decode(frame, extended)?;
        self.dispatch(packet)?;
        match self.kick_reason() {
            Some(reason) => Err(ProtocolError::Kicked(reason.to_string())),
            None => Ok(()),
        }
    }

    fn answer_probe(&mut self) {
        self.outbox().send(ServerPacket::ProbeReply);
    }
}

impl Connection {
    /// Act on one decoded message.
    pub fn dispatch(&mut self, packet: ClientPacket) -> Result<(), ProtocolError> {
        match packet {
            ClientPacket::Ping => {}
            ClientPacket::Handshake {
                version,
                name,
                supports_ext,
                ..
            } => self.handle_login(version, &name, supports_ext),
            ClientPacket::SetBlock {
                x,
                y,
                z,
                action,
                held,
            } => self.handle_block_change(CellPos::new(x, y, z), action, held)?,
            ClientPacket::Teleport {
                held,
                x,
                y,
                z,
                yaw,
                pitch,
            } => self.handle_movement(held, Position::new(x, y, z), yaw, pitch),
            ClientPacket::Message { text, .. } => self.handle_chat(&text),
            ClientPacket::ExtInfo { app_name, count } => {
                debug!(conn = %self.id(), "client software {} announces {} extensions", app_name, count);
                self.pending_ext_entries = count;
            }
            ClientPacket::ExtEntry { name, version } => {
                self.pending_ext_entries = self.pending_ext_entries.saturating_sub(1).max(0);
                if let Some(ext) = Extensions::from_ext_name(&name) {
                    self.add_extensions(ext);
                } else {
                    debug!(conn = %self.id(), "ignoring extension {} v{}", name, version);
                }
            }
            ClientPacket::CustomBlockSupportLevel { level } => self.custom_block_support = level,
            ClientPacket::PlayerClick(click) => self.handle_click(&click),
            ClientPacket::TwoWayPing {
                server_to_client,
                data,
            } => {
                if !server_to_client {
                    self.outbox().send(ServerPacket::TwoWayPing {
                        server_to_client: false,
                        data,
                    });
                }
            }
        }
        Ok(())
    }

    fn handle_login(&mut self, version: u8, name: &str, supports_ext: bool) {
        if self.is_logged_in() {
            return;
        }
        if version != PROTOCOL_VERSION {
            self.kick("Wrong version!");
            return;
        }
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            self.kick("Invalid player name");
            return;
        }

        let ctx = Arc::clone(self.context());
        let policy = &ctx.policy;
        self.name = name.to_string();
        self.rank = policy.rank_of(name);
        self.supports_ext = supports_ext;
        self.pending_verification = policy.verify_admins && self.rank >= Rank::Operator;
        self.phase = LoginPhase::Authenticated;

        let outbox = Arc::clone(self.outbox());
        outbox.send(ServerPacket::Identification {
            name: policy.server_name.clone(),
            motd: policy.motd.clone(),
            user_type: if self.rank >= Rank::Operator {
                OPERATOR_USER_TYPE
            } else {
                0
            },
        });
        if supports_ext {
            outbox.send(ServerPacket::ExtInfo {
                app_name: APP_NAME.to_string(),
                count: SUPPORTED_EXTENSIONS.len() as i16,
            });
            for (ext, version) in SUPPORTED_EXTENSIONS {
                outbox.send(ServerPacket::ExtEntry {
                    name: ext.to_string(),
                    version: *version,
                });
            }
        }
        self.world().add_observer(outbox.clone());
        ctx.roster.add(name, outbox);
        info!(conn = %self.id(), rank = %self.rank, "{} logged in", name);
    }

    /// Client edit: rate limit, level rules, then the gate.
    fn handle_block_change(
        &mut self,
        cell: CellPos,
        action: u8,
        held: u8,
    ) -> Result<(), ProtocolError> {
        if !self.is_logged_in() {
            return Ok(());
        }
        if self.spam.check_block_spam(Instant::now()) {
            self.kick(BLOCK_SPAM_KICK);
            return Ok(());
        }
        if self.frozen {
            self.revert_block(cell);
            return Ok(());
        }
        if action > 1 {
            return Err(ProtocolError::UnknownBlockAction(action));
        }

        let held = BlockValue::from_raw(held);
        self.raw_held = held;
        let placing = action == 1;
        let config = self.world().config();
        if (!placing || held.is_air()) && !config.deletable {
            self.message("Deleting blocks is disabled in this level.");
            self.revert_block(cell);
            return Ok(());
        }
        if placing && !config.buildable {
            self.message("Placing blocks is disabled in this level.");
            self.revert_block(cell);
            return Ok(());
        }
        if held.is_custom()
            && (!self.extensions().contains(Extensions::BLOCK_DEFINITIONS)
                || self.world().custom_def(held.ext).is_none())
        {
            self.message(&format!("Invalid block type: {}", held.ext));
            self.revert_block(cell);
            return Ok(());
        }

        if let Err(err) = self.manual_change(cell, held, placing, true) {
            error!(name = %self.name, %cell, "block change failed: {:#}", err);
            self.message(HANDLER_FAULT);
        }
        Ok(())
    }

    fn handle_movement(&mut self, held: u8, next: Position, yaw: u8, pitch: u8) {
        if !self.is_logged_in() {
            return;
        }
        if self.extensions().contains(Extensions::HELD_BLOCK) {
            self.raw_held = BlockValue::from_raw(held);
        }
        let ctx = Arc::clone(self.context());
        if ctx.events.move_cancelled(&*self, next, yaw, pitch) {
            return;
        }
        if yaw != self.yaw || pitch != self.pitch {
            self.last_action = Instant::now();
        }
        self.position = next;
        self.yaw = yaw;
        self.pitch = pitch;
    }

    fn handle_chat(&mut self, text: &str) {
        if !self.is_logged_in() {
            return;
        }
        self.last_action = Instant::now();
        let text = text.trim_end();
        if text.is_empty() {
            return;
        }
        // "//" escapes a leading slash.
        if let Some(rest) = text.strip_prefix("//") {
            self.send_chat(&format!("/{rest}"));
        } else if let Some(line) = text.strip_prefix('/') {
            self.run_command(line);
        } else {
            self.send_chat(text);
        }
    }

    fn send_chat(&mut self, text: &str) {
        if self.muted {
            self.message("You are muted.");
            return;
        }
        let ctx = Arc::clone(self.context());
        ctx.chat().chat(self.id(), &self.name, text);
    }

    fn run_command(&mut self, line: &str) {
        let (command, args) = match line.split_once(' ') {
            Some((command, args)) => (command, args.trim()),
            None => (line, ""),
        };
        let command = command.to_ascii_lowercase();
        if command.is_empty() {
            self.message("No command entered.");
            return;
        }
        let policy = &self.context().policy;
        if !self.agreed && !matches!(command.as_str(), "agree" | "rules" | "disagree") {
            self.message(gate::MUST_AGREE);
            return;
        }
        if self.jailed {
            self.message("You cannot use any commands while jailed.");
            return;
        }
        if policy.verify_admins
            && self.pending_verification
            && !matches!(command.as_str(), "pass" | "setpass")
        {
            self.message(gate::MUST_VERIFY);
            return;
        }

        let caller = CommandCaller::new(
            self.id(),
            self.name.as_str(),
            self.rank,
            Arc::clone(self.outbox()),
        );
        let executor = Arc::clone(self.context().commands());
        commands::hand_off(executor, caller, command, args.to_string());
    }

    fn handle_click(&mut self, click: &PlayerClick) {
        if !self.is_logged_in() {
            return;
        }
        let ctx = Arc::clone(self.context());
        ctx.events.fire_click(&*self, click);
    }
}
