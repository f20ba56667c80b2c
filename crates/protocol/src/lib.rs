//! Wire types shared by chunk senders and receivers.
//!
//! A payload crosses the transport as a sequence of [`Chunk`] records. The
//! record is plain JSON so any peer that speaks `{id, total, index, data}`
//! can take part in a transfer.

pub mod chunk;
pub mod constants;

pub use chunk::{Chunk, ChunkData, Encoding};
pub use constants::{MAX_SAFE_INTEGER, MIN_TEXT_CHUNK_SIZE};
