//! Stream framing.
//!
//! The stream carries no length prefix: the first byte of each message selects a
//! length from a static table, refined by the connection's login phase and
//! negotiated extensions. Bytes of an incomplete message stay buffered until the
//! next read.

use crate::opcode;
use crate::ProtocolError;

/// Connection state that influences message lengths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameContext {
    /// Handshake completed.
    pub logged_in: bool,
    /// Positions use 32-bit coordinates.
    pub extended_positions: bool,
}

/// How many bytes the message starting with a given opcode occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSize {
    /// A message of exactly this many bytes, opcode included.
    Fixed(usize),
    /// The one-byte legacy probe.
    Probe,
    /// Not a message the client may send right now.
    Unknown,
}

/// Length of the message introduced by `opcode`.
pub fn frame_size(opcode: u8, ctx: FrameContext) -> FrameSize {
    match opcode {
        opcode::LEGACY_PROBE => FrameSize::Probe,
        opcode::HANDSHAKE => FrameSize::Fixed(131),
        opcode::SET_BLOCK_CLIENT if ctx.logged_in => FrameSize::Fixed(9),
        opcode::ENTITY_TELEPORT if ctx.logged_in => {
            FrameSize::Fixed(if ctx.extended_positions { 16 } else { 10 })
        }
        opcode::MESSAGE if ctx.logged_in => FrameSize::Fixed(66),
        opcode::EXT_INFO => FrameSize::Fixed(67),
        opcode::EXT_ENTRY => FrameSize::Fixed(69),
        opcode::CUSTOM_BLOCK_SUPPORT_LEVEL => FrameSize::Fixed(2),
        opcode::PLAYER_CLICK => FrameSize::Fixed(15),
        opcode::PING => FrameSize::Fixed(1),
        opcode::TWO_WAY_PING => FrameSize::Fixed(4),
        _ => FrameSize::Unknown,
    }
}

/// Receives the messages sliced off a stream.
///
/// The context is queried again before every message, so a handshake or
/// extension entry takes effect for the very next message in the same read.
pub trait FrameHandler {
    /// State used to size the next message.
    fn frame_context(&self) -> FrameContext;

    /// Trusted non-interactive connections survive unknown opcodes.
    fn tolerates_unknown(&self) -> bool {
        false
    }

    /// Handle one complete message. An error ends the session.
    fn handle_frame(&mut self, frame: &[u8]) -> Result<(), ProtocolError>;

    /// Answer the legacy probe.
    fn answer_probe(&mut self);
}

/// Per-connection reassembly buffer.
#[derive(Debug, Default)]
pub struct FrameReader {
    remainder: Vec<u8>,
}

impl FrameReader {
    /// Create an empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes waiting for the rest of their message.
    pub fn remainder(&self) -> &[u8] {
        &self.remainder
    }

    /// Append `data` and dispatch every complete message.
    ///
    /// Returns the number of messages dispatched. An unknown opcode is an error
    /// unless the handler tolerates it, in which case everything buffered is
    /// discarded.
    pub fn feed<H: FrameHandler>(
        &mut self,
        data: &[u8],
        handler: &mut H,
    ) -> Result<usize, ProtocolError> {
        self.remainder.extend_from_slice(data);

        let mut pos = 0;
        let mut dispatched = 0;
        let result = loop {
            let Some(&op) = self.remainder.get(pos) else {
                break Ok(());
            };
            match frame_size(op, handler.frame_context()) {
                FrameSize::Probe => {
                    handler.answer_probe();
                    pos += 1;
                }
                FrameSize::Fixed(len) => {
                    if self.remainder.len() - pos < len {
                        break Ok(());
                    }
                    if let Err(err) = handler.handle_frame(&self.remainder[pos..pos + len]) {
                        break Err(err);
                    }
                    pos += len;
                    dispatched += 1;
                }
                FrameSize::Unknown => {
                    if handler.tolerates_unknown() {
                        pos = self.remainder.len();
                        break Ok(());
                    }
                    break Err(ProtocolError::UnknownOpcode { opcode: op });
                }
            }
        };

        self.remainder.drain(..pos);
        result.map(|()| dispatched)
    }
}
