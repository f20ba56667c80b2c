use chunkwire_protocol::Chunk;

use super::state::TransferState;
use super::{ChunkStatus, parse_chunk};
use crate::{TransferError, hash};

/// Receiver bound to one transfer whose `id` and `total` are known up front.
///
/// Completion is queried synchronously with [`done`](Self::done). The
/// completed state stays resident, so late chunks are rejected with
/// [`TransferError::AlreadyComplete`] instead of starting over.
#[derive(Debug)]
pub struct SingleTransferReceiver {
    state: TransferState,
}

impl SingleTransferReceiver {
    /// Creates a receiver for transfer `id` made of `total` chunks.
    pub fn new(id: impl Into<String>, total: u64) -> Result<Self, TransferError> {
        Ok(Self {
            state: TransferState::new(id.into(), total)?,
        })
    }

    pub fn id(&self) -> &str {
        self.state.id()
    }

    pub fn total(&self) -> u64 {
        self.state.total()
    }

    /// Number of distinct chunks received so far.
    pub fn received(&self) -> u64 {
        self.state.received()
    }

    /// Returns `true` once every index has been received.
    pub fn done(&self) -> bool {
        self.state.is_complete()
    }

    /// Adds a chunk of this transfer.
    pub fn add_chunk(&mut self, chunk: Chunk) -> Result<ChunkStatus, TransferError> {
        if self.done() {
            return Err(TransferError::AlreadyComplete(self.id().to_string()));
        }
        if chunk.id != self.id() {
            return Err(TransferError::IdMismatch {
                expected: self.id().to_string(),
                actual: chunk.id,
            });
        }
        self.state.accept(chunk)
    }

    /// Parses a JSON chunk message and adds it.
    pub fn add_json(&mut self, json: &str) -> Result<ChunkStatus, TransferError> {
        self.add_chunk(parse_chunk(json)?)
    }

    /// Reassembles and decompresses the payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransferError> {
        self.state.assemble()
    }

    /// Reassembles the payload and decodes it as UTF-8.
    pub fn to_text(&self) -> Result<String, TransferError> {
        String::from_utf8(self.to_bytes()?)
            .map_err(|e| TransferError::ReconstructionFailure(format!("utf-8: {e}")))
    }

    /// Returns `true` if the reassembled payload hashes to the transfer id.
    ///
    /// A mismatch is reported as `Ok(false)`; only a failure to reassemble
    /// is an error.
    pub fn verify(&self) -> Result<bool, TransferError> {
        Ok(hash::verify_content(&self.to_bytes()?, self.id()))
    }
}
