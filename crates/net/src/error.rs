//! Protocol error taxonomy.

use thiserror::Error;

/// Failures that end a client's session.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// First byte of a frame names no known (or no currently legal) message.
    #[error("Unhandled message id \"{opcode}\"!")]
    UnknownOpcode {
        /// The offending byte.
        opcode: u8,
    },
    /// Frame shorter than its opcode requires.
    #[error("truncated frame for opcode {opcode}: {len} bytes")]
    Truncated {
        /// Opcode of the frame.
        opcode: u8,
        /// Bytes available.
        len: usize,
    },
    /// Block-change message with an action other than delete/place.
    #[error("Unknown block action!")]
    UnknownBlockAction(u8),
    /// Server decided to disconnect the client.
    #[error("{0}")]
    Kicked(String),
    /// Socket failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
