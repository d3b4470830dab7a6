#![warn(missing_docs)]
//! Wire protocol for classic voxel clients: opcode table, stream framing, and
//! packet encoding.

mod error;
mod ext;
mod framing;
pub mod opcode;
mod protocol;
mod transport;

pub use error::ProtocolError;
pub use ext::{Extensions, SUPPORTED_EXTENSIONS};
pub use framing::{frame_size, FrameContext, FrameHandler, FrameReader, FrameSize};
pub use protocol::{ClientPacket, PlayerClick, ServerPacket, PROTOCOL_VERSION, STRING_SIZE};
pub use transport::{spawn_writer, ServerEndpoint, READ_CHUNK};
