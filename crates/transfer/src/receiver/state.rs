use std::collections::BTreeMap;

use chunkwire_protocol::{Chunk, ChunkData, MAX_SAFE_INTEGER};
use tracing::{debug, trace};

use super::ChunkStatus;
use crate::{TransferError, compress, split};

/// Fragments collected so far for one transfer.
///
/// Slots are sparse so a large advertised `total` costs nothing until the
/// fragments actually arrive.
#[derive(Debug)]
pub(crate) struct TransferState {
    id: String,
    total: u64,
    slots: BTreeMap<u64, ChunkData>,
}

impl TransferState {
    pub(crate) fn new(id: String, total: u64) -> Result<Self, TransferError> {
        if total == 0 || total > MAX_SAFE_INTEGER {
            return Err(TransferError::InvalidParameter(format!(
                "total must be a positive safe integer, got {total}"
            )));
        }
        Ok(Self {
            id,
            total,
            slots: BTreeMap::new(),
        })
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct indices stored.
    pub(crate) fn received(&self) -> u64 {
        self.slots.len() as u64
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.received() == self.total
    }

    /// Stores `chunk` in its slot. The caller has already matched the id.
    pub(crate) fn accept(&mut self, chunk: Chunk) -> Result<ChunkStatus, TransferError> {
        if chunk.index >= self.total {
            return Err(TransferError::InvalidIndex {
                index: chunk.index.to_string(),
                total: self.total,
            });
        }
        if chunk.total != self.total {
            return Err(TransferError::InvalidParameter(format!(
                "chunk total {} differs from transfer total {}",
                chunk.total, self.total
            )));
        }
        if let Some(first) = self.slots.values().next()
            && first.encoding() != chunk.data.encoding()
        {
            return Err(TransferError::InvalidInput(format!(
                "{:?} fragment in a {:?} transfer",
                chunk.data.encoding(),
                first.encoding()
            )));
        }

        let index = chunk.index;
        let duplicate = self.slots.insert(index, chunk.data).is_some();
        let received = self.received();

        if duplicate {
            debug!(id = %self.id, index, "duplicate chunk replaced");
            return Ok(ChunkStatus::Duplicate {
                received,
                total: self.total,
            });
        }

        trace!(id = %self.id, index, received, total = self.total, "chunk stored");
        if self.is_complete() {
            Ok(ChunkStatus::Completed)
        } else {
            Ok(ChunkStatus::Accepted {
                received,
                total: self.total,
            })
        }
    }

    /// Joins the fragments in index order and decompresses the result.
    pub(crate) fn assemble(&self) -> Result<Vec<u8>, TransferError> {
        if !self.is_complete() {
            return Err(TransferError::Incomplete {
                received: self.received(),
                total: self.total,
            });
        }
        let parts: Vec<&ChunkData> = self.slots.values().collect();
        let joined = split::join_refs(&parts)?;
        compress::decompress(joined)
    }
}
