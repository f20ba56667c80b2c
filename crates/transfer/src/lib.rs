//! Size-bounded chunking and out-of-order reassembly of binary payloads.
//!
//! Senders turn a payload into [`Chunk`]s with [`create_chunks`]. Receivers
//! feed chunks, in any order, into a [`SingleTransferReceiver`] (one known
//! transfer) or a [`TransferReceiver`] (many concurrent transfers with
//! per-transfer timeouts) and get the original bytes back.

mod compress;
mod config;
mod hash;
mod receiver;
mod sender;
mod split;
mod text;

use std::time::Duration;

pub use chunkwire_protocol::{Chunk, ChunkData, Encoding, MAX_SAFE_INTEGER, MIN_TEXT_CHUNK_SIZE};
pub use compress::{MIN_COMPRESS_SIZE, compress, decompress, is_gzip};
pub use config::{ChunkOptions, ReceiverConfig};
pub use hash::{content_id, verify_content};
pub use receiver::{ChunkStatus, ReceiverEvent, SingleTransferReceiver, TransferReceiver};
pub use sender::{create_chunks, join_chunks};
pub use split::{Base64Strategy, RawStrategy, SplitStrategy, Splitter, join, strategy};
pub use text::{join_str, split_str};

/// Default time a receiver waits for an incomplete transfer: 60 s.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Default capacity of the receiver event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("missing chunk to add")]
    MissingChunk,

    #[error("chunk id mismatch: expected {expected}, got {actual}")]
    IdMismatch { expected: String, actual: String },

    #[error("invalid chunk index {index} (total {total})")]
    InvalidIndex { index: String, total: u64 },

    #[error("all chunks already received: {0}")]
    AlreadyComplete(String),

    #[error("timeout when receiving chunks: {0}")]
    TimeoutExpired(String),

    #[error("transfer cancelled: {0}")]
    Cancelled(String),

    #[error("transfer incomplete: {received}/{total} chunks")]
    Incomplete { received: u64, total: u64 },

    #[error("reconstruction failed: {0}")]
    ReconstructionFailure(String),
}
