//! Reassembly of chunked transfers.
//!
//! Both receivers share the same acceptance rules through `TransferState`:
//! indices must fall in `[0, total)`, `total` is fixed by the first chunk,
//! and a re-delivered index overwrites its fragment without counting twice.

mod multi;
mod single;
mod state;

use chunkwire_protocol::{Chunk, ChunkData, MAX_SAFE_INTEGER};
use serde::Deserialize;
use serde_json::Value;

pub use multi::{ReceiverEvent, TransferReceiver};
pub use single::SingleTransferReceiver;

use crate::TransferError;

/// Outcome of a successful `add_chunk` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    /// A new index was stored.
    Accepted { received: u64, total: u64 },
    /// The index was already present; its fragment was replaced.
    Duplicate { received: u64, total: u64 },
    /// This chunk completed the transfer.
    Completed,
}

/// A chunk message with `total` and `index` still untyped, so an
/// out-of-range counter is reported as such rather than as bad JSON.
#[derive(Deserialize)]
struct ChunkMessage {
    id: String,
    total: Value,
    index: Value,
    data: ChunkData,
}

/// Parses a JSON chunk message. JSON `null` is a missing chunk.
///
/// A `total` that is not a positive safe integer is an invalid parameter;
/// an `index` that is not a non-negative safe integer is an invalid index.
pub(crate) fn parse_chunk(json: &str) -> Result<Chunk, TransferError> {
    let message: Option<ChunkMessage> = serde_json::from_str(json)
        .map_err(|e| TransferError::InvalidInput(format!("malformed chunk: {e}")))?;
    let message = message.ok_or(TransferError::MissingChunk)?;

    let total = safe_integer(&message.total)
        .filter(|&total| total > 0)
        .ok_or_else(|| {
            TransferError::InvalidParameter(format!(
                "total must be a positive safe integer, got {}",
                message.total
            ))
        })?;
    let index = safe_integer(&message.index).ok_or_else(|| TransferError::InvalidIndex {
        index: message.index.to_string(),
        total,
    })?;

    Ok(Chunk::new(message.id, total, index, message.data))
}

/// Reads a JSON number as an integer in `[0, 2^53 - 1]`. Integral floats
/// such as `2.0` count.
fn safe_integer(value: &Value) -> Option<u64> {
    let n = match value.as_u64() {
        Some(n) => n,
        None => {
            let f = value.as_f64()?;
            if f < 0.0 || f.fract() != 0.0 || f > MAX_SAFE_INTEGER as f64 {
                return None;
            }
            f as u64
        }
    };
    (n <= MAX_SAFE_INTEGER).then_some(n)
}
