//! Message identifiers.

/// Client login / server identification.
pub const HANDSHAKE: u8 = 0x00;
/// Keep-alive.
pub const PING: u8 = 0x01;
/// Client asks to place or delete a block.
pub const SET_BLOCK_CLIENT: u8 = 0x05;
/// Server tells a client what a cell holds.
pub const SET_BLOCK: u8 = 0x06;
/// Absolute position and orientation update.
pub const ENTITY_TELEPORT: u8 = 0x08;
/// Chat line.
pub const MESSAGE: u8 = 0x0d;
/// Server disconnects a client.
pub const KICK: u8 = 0x0e;
/// Extension negotiation header.
pub const EXT_INFO: u8 = 0x10;
/// One negotiated extension.
pub const EXT_ENTRY: u8 = 0x11;
/// Client's custom block support level.
pub const CUSTOM_BLOCK_SUPPORT_LEVEL: u8 = 0x13;
/// Mouse click report.
pub const PLAYER_CLICK: u8 = 0x22;
/// Latency probe in either direction.
pub const TWO_WAY_PING: u8 = 0x2b;
/// Legacy one-byte probe sent by some old clients ('G').
pub const LEGACY_PROBE: u8 = b'G';

/// Byte written in answer to [`LEGACY_PROBE`].
pub const LEGACY_PROBE_REPLY: u8 = 0x00;
