//! Typed client and server messages.
//!
//! All integers are big-endian. Strings occupy [`STRING_SIZE`] bytes, padded with
//! spaces; only ASCII survives the trip.

use crate::{opcode, ProtocolError};

/// Protocol version sent in identification packets.
pub const PROTOCOL_VERSION: u8 = 7;

/// Fixed size of every string field.
pub const STRING_SIZE: usize = 64;

/// Handshake type byte announcing extension support.
const EXT_MAGIC: u8 = 0x42;

/// Mouse click report from a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerClick {
    /// Mouse button (0 left, 1 right, 2 middle).
    pub button: u8,
    /// 0 pressed, 1 released.
    pub action: u8,
    /// Yaw at the time of the click.
    pub yaw: i16,
    /// Pitch at the time of the click.
    pub pitch: i16,
    /// Entity under the cursor, 255 for none.
    pub target_entity: u8,
    /// Block under the cursor; -1 when none.
    pub target: (i16, i16, i16),
    /// Face of the block under the cursor.
    pub face: u8,
}

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientPacket {
    /// Login request.
    Handshake {
        /// Protocol version.
        version: u8,
        /// Account name.
        name: String,
        /// Verification key.
        key: String,
        /// Client announced extension support.
        supports_ext: bool,
    },
    /// Keep-alive.
    Ping,
    /// Place or delete a block.
    SetBlock {
        /// Cell x.
        x: u16,
        /// Cell y.
        y: u16,
        /// Cell z.
        z: u16,
        /// 0 delete, 1 place; other values are rejected by the server.
        action: u8,
        /// Raw held block byte.
        held: u8,
    },
    /// Position and orientation.
    Teleport {
        /// Held block when HeldBlock was negotiated, otherwise the self id.
        held: u8,
        /// Fixed-point x.
        x: i32,
        /// Fixed-point y (eye level).
        y: i32,
        /// Fixed-point z.
        z: i32,
        /// Yaw.
        yaw: u8,
        /// Pitch.
        pitch: u8,
    },
    /// Chat line.
    Message {
        /// Non-zero when more parts follow.
        continued: u8,
        /// Text with padding removed.
        text: String,
    },
    /// Extension negotiation header.
    ExtInfo {
        /// Client software name.
        app_name: String,
        /// Number of [`ClientPacket::ExtEntry`] messages that follow.
        count: i16,
    },
    /// One supported extension.
    ExtEntry {
        /// Extension name.
        name: String,
        /// Extension version.
        version: i32,
    },
    /// Custom block support level.
    CustomBlockSupportLevel {
        /// Level.
        level: u8,
    },
    /// Mouse click report.
    PlayerClick(PlayerClick),
    /// Latency probe.
    TwoWayPing {
        /// Direction: true when the server initiated it.
        server_to_client: bool,
        /// Probe payload.
        data: u16,
    },
}

impl ClientPacket {
    /// Decode one complete message as sliced by the frame reader.
    pub fn decode(frame: &[u8], extended_positions: bool) -> Result<Self, ProtocolError> {
        let r = Reader::new(frame);
        let op = r.u8(0)?;
        let packet = match op {
            opcode::HANDSHAKE => ClientPacket::Handshake {
                version: r.u8(1)?,
                name: r.string(2)?,
                key: r.string(66)?,
                supports_ext: r.u8(130)? == EXT_MAGIC,
            },
            opcode::PING => ClientPacket::Ping,
            opcode::SET_BLOCK_CLIENT => ClientPacket::SetBlock {
                x: r.u16(1)?,
                y: r.u16(3)?,
                z: r.u16(5)?,
                action: r.u8(7)?,
                held: r.u8(8)?,
            },
            opcode::ENTITY_TELEPORT => {
                let held = r.u8(1)?;
                let (x, y, z, rot) = if extended_positions {
                    (r.i32(2)?, r.i32(6)?, r.i32(10)?, 14)
                } else {
                    (
                        i32::from(r.i16(2)?),
                        i32::from(r.i16(4)?),
                        i32::from(r.i16(6)?),
                        8,
                    )
                };
                ClientPacket::Teleport {
                    held,
                    x,
                    y,
                    z,
                    yaw: r.u8(rot)?,
                    pitch: r.u8(rot + 1)?,
                }
            }
            opcode::MESSAGE => ClientPacket::Message {
                continued: r.u8(1)?,
                text: r.string(2)?,
            },
            opcode::EXT_INFO => ClientPacket::ExtInfo {
                app_name: r.string(1)?,
                count: r.i16(65)?,
            },
            opcode::EXT_ENTRY => ClientPacket::ExtEntry {
                name: r.string(1)?,
                version: r.i32(65)?,
            },
            opcode::CUSTOM_BLOCK_SUPPORT_LEVEL => {
                ClientPacket::CustomBlockSupportLevel { level: r.u8(1)? }
            }
            opcode::PLAYER_CLICK => ClientPacket::PlayerClick(PlayerClick {
                button: r.u8(1)?,
                action: r.u8(2)?,
                yaw: r.i16(3)?,
                pitch: r.i16(5)?,
                target_entity: r.u8(7)?,
                target: (r.i16(8)?, r.i16(10)?, r.i16(12)?),
                face: r.u8(14)?,
            }),
            opcode::TWO_WAY_PING => ClientPacket::TwoWayPing {
                server_to_client: r.u8(1)? != 0,
                data: r.u16(2)?,
            },
            other => return Err(ProtocolError::UnknownOpcode { opcode: other }),
        };
        Ok(packet)
    }
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerPacket {
    /// Reply to a handshake.
    Identification {
        /// Server name.
        name: String,
        /// Message of the day.
        motd: String,
        /// 0x64 for operators, 0 otherwise.
        user_type: u8,
    },
    /// Keep-alive.
    Ping,
    /// A cell's value.
    SetBlock {
        /// Cell x.
        x: u16,
        /// Cell y.
        y: u16,
        /// Cell z.
        z: u16,
        /// Block byte the client understands.
        block: u8,
    },
    /// Chat line.
    Message {
        /// Sender id, or 0 for server messages.
        id: i8,
        /// Text (truncated to one line).
        text: String,
    },
    /// Disconnect with a reason.
    Kick {
        /// Reason shown to the client.
        reason: String,
    },
    /// Extension negotiation header.
    ExtInfo {
        /// Server software name.
        app_name: String,
        /// Number of entries that follow.
        count: i16,
    },
    /// One supported extension.
    ExtEntry {
        /// Extension name.
        name: String,
        /// Extension version.
        version: i32,
    },
    /// Latency probe.
    TwoWayPing {
        /// Direction: true when the server initiated it.
        server_to_client: bool,
        /// Probe payload.
        data: u16,
    },
    /// Answer to the legacy probe.
    ProbeReply,
}

impl ServerPacket {
    /// Append the wire form of this packet to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            ServerPacket::Identification {
                name,
                motd,
                user_type,
            } => {
                out.push(opcode::HANDSHAKE);
                out.push(PROTOCOL_VERSION);
                write_string(out, name);
                write_string(out, motd);
                out.push(*user_type);
            }
            ServerPacket::Ping => out.push(opcode::PING),
            ServerPacket::SetBlock { x, y, z, block } => {
                out.push(opcode::SET_BLOCK);
                out.extend_from_slice(&x.to_be_bytes());
                out.extend_from_slice(&y.to_be_bytes());
                out.extend_from_slice(&z.to_be_bytes());
                out.push(*block);
            }
            ServerPacket::Message { id, text } => {
                out.push(opcode::MESSAGE);
                out.push(*id as u8);
                write_string(out, text);
            }
            ServerPacket::Kick { reason } => {
                out.push(opcode::KICK);
                write_string(out, reason);
            }
            ServerPacket::ExtInfo { app_name, count } => {
                out.push(opcode::EXT_INFO);
                write_string(out, app_name);
                out.extend_from_slice(&count.to_be_bytes());
            }
            ServerPacket::ExtEntry { name, version } => {
                out.push(opcode::EXT_ENTRY);
                write_string(out, name);
                out.extend_from_slice(&version.to_be_bytes());
            }
            ServerPacket::TwoWayPing {
                server_to_client,
                data,
            } => {
                out.push(opcode::TWO_WAY_PING);
                out.push(u8::from(*server_to_client));
                out.extend_from_slice(&data.to_be_bytes());
            }
            ServerPacket::ProbeReply => out.push(opcode::LEGACY_PROBE_REPLY),
        }
    }

    /// Wire form as a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }
}

fn write_string(out: &mut Vec<u8>, text: &str) {
    let mut written = 0;
    for ch in text.chars().take(STRING_SIZE) {
        out.push(if ch.is_ascii() { ch as u8 } else { b'?' });
        written += 1;
    }
    out.extend(std::iter::repeat(b' ').take(STRING_SIZE - written));
}

struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn bytes<const N: usize>(&self, at: usize) -> Result<[u8; N], ProtocolError> {
        self.buf
            .get(at..at + N)
            .and_then(|s| s.try_into().ok())
            .ok_or(ProtocolError::Truncated {
                opcode: self.buf.first().copied().unwrap_or_default(),
                len: self.buf.len(),
            })
    }

    fn u8(&self, at: usize) -> Result<u8, ProtocolError> {
        Ok(self.bytes::<1>(at)?[0])
    }

    fn u16(&self, at: usize) -> Result<u16, ProtocolError> {
        Ok(u16::from_be_bytes(self.bytes(at)?))
    }

    fn i16(&self, at: usize) -> Result<i16, ProtocolError> {
        Ok(i16::from_be_bytes(self.bytes(at)?))
    }

    fn i32(&self, at: usize) -> Result<i32, ProtocolError> {
        Ok(i32::from_be_bytes(self.bytes(at)?))
    }

    fn string(&self, at: usize) -> Result<String, ProtocolError> {
        let raw = self.bytes::<STRING_SIZE>(at)?;
        let text: String = raw
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { '?' })
            .collect();
        Ok(text.trim_end_matches(' ').to_string())
    }
}
