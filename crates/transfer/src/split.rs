//! Splitting a payload into size-bounded fragments and joining them back.
//!
//! Two strategies share one interface:
//!
//! - [`RawStrategy`]: consecutive byte slices of at most `chunk_size` bytes.
//! - [`Base64Strategy`]: the payload is base64-encoded first and the text is
//!   cut on character boundaries so every fragment stays within
//!   `chunk_size` UTF-8 bytes. `chunk_size` must be even and at least 4.
//!
//! Both always produce at least one fragment, so an empty payload still
//! makes a transfer with `total == 1`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chunkwire_protocol::{ChunkData, Encoding, MAX_SAFE_INTEGER};
use tracing::trace;

use crate::TransferError;
use crate::text::{pack_chars, validate_text_chunk_size};

/// A reversible way of cutting a payload into fragments.
pub trait SplitStrategy: Send + Sync {
    /// The encoding of the fragments this strategy produces.
    fn encoding(&self) -> Encoding;

    /// Checks that `chunk_size` is acceptable for this strategy.
    fn validate(&self, chunk_size: usize) -> Result<(), TransferError>;

    /// Splits `payload`. `chunk_size` must have passed [`validate`](Self::validate).
    fn split(&self, payload: &[u8], chunk_size: usize) -> Vec<ChunkData>;

    /// Concatenates fragments in order and reverses the encoding.
    fn join(&self, parts: &[&ChunkData]) -> Result<Vec<u8>, TransferError>;
}

/// Plain byte slicing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawStrategy;

/// Base64 text split on character boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Strategy;

static RAW: RawStrategy = RawStrategy;
static BASE64: Base64Strategy = Base64Strategy;

/// Returns the strategy for `encoding`.
pub fn strategy(encoding: Encoding) -> &'static dyn SplitStrategy {
    match encoding {
        Encoding::Raw => &RAW,
        Encoding::Base64 => &BASE64,
    }
}

impl SplitStrategy for RawStrategy {
    fn encoding(&self) -> Encoding {
        Encoding::Raw
    }

    fn validate(&self, chunk_size: usize) -> Result<(), TransferError> {
        if chunk_size == 0 || chunk_size as u64 > MAX_SAFE_INTEGER {
            return Err(TransferError::InvalidParameter(format!(
                "chunk size must be a positive safe integer, got {chunk_size}"
            )));
        }
        Ok(())
    }

    fn split(&self, payload: &[u8], chunk_size: usize) -> Vec<ChunkData> {
        if payload.len() <= chunk_size {
            return vec![ChunkData::Bytes(payload.to_vec())];
        }
        payload
            .chunks(chunk_size)
            .map(|slice| ChunkData::Bytes(slice.to_vec()))
            .collect()
    }

    fn join(&self, parts: &[&ChunkData]) -> Result<Vec<u8>, TransferError> {
        let mut out = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
        for part in parts {
            match part {
                ChunkData::Bytes(bytes) => out.extend_from_slice(bytes),
                ChunkData::Text(_) => {
                    return Err(TransferError::InvalidInput(
                        "text fragment in a raw transfer".into(),
                    ));
                }
            }
        }
        Ok(out)
    }
}

impl SplitStrategy for Base64Strategy {
    fn encoding(&self) -> Encoding {
        Encoding::Base64
    }

    fn validate(&self, chunk_size: usize) -> Result<(), TransferError> {
        validate_text_chunk_size(chunk_size)
    }

    fn split(&self, payload: &[u8], chunk_size: usize) -> Vec<ChunkData> {
        let encoded = STANDARD.encode(payload);
        pack_chars(&encoded, chunk_size)
            .into_iter()
            .map(|part| ChunkData::Text(part.to_string()))
            .collect()
    }

    fn join(&self, parts: &[&ChunkData]) -> Result<Vec<u8>, TransferError> {
        let mut encoded = String::with_capacity(parts.iter().map(|p| p.len()).sum());
        for part in parts {
            match part {
                ChunkData::Text(text) => encoded.push_str(text),
                ChunkData::Bytes(_) => {
                    return Err(TransferError::InvalidInput(
                        "byte fragment in a base64 transfer".into(),
                    ));
                }
            }
        }
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| TransferError::ReconstructionFailure(format!("base64: {e}")))
    }
}

/// Splits payloads with a fixed strategy and byte budget.
#[derive(Clone, Copy)]
pub struct Splitter {
    strategy: &'static dyn SplitStrategy,
    chunk_size: usize,
}

impl Splitter {
    /// Creates a splitter, validating `chunk_size` for `encoding`.
    pub fn new(encoding: Encoding, chunk_size: usize) -> Result<Self, TransferError> {
        let strategy = strategy(encoding);
        strategy.validate(chunk_size)?;
        Ok(Self {
            strategy,
            chunk_size,
        })
    }

    /// Splits `payload` into ordered fragments. Deterministic.
    pub fn split(&self, payload: &[u8]) -> Vec<ChunkData> {
        let parts = self.strategy.split(payload, self.chunk_size);
        trace!(
            bytes = payload.len(),
            chunk_size = self.chunk_size,
            parts = parts.len(),
            "payload split"
        );
        parts
    }

    pub fn encoding(&self) -> Encoding {
        self.strategy.encoding()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl std::fmt::Debug for Splitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Splitter")
            .field("encoding", &self.encoding())
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

/// Joins fragments in the given order, picking the strategy from the
/// fragments themselves.
///
/// Fails with [`TransferError::InvalidInput`] on an empty slice or when
/// fragment kinds are mixed.
pub fn join(parts: &[ChunkData]) -> Result<Vec<u8>, TransferError> {
    let refs: Vec<&ChunkData> = parts.iter().collect();
    join_refs(&refs)
}

pub(crate) fn join_refs(parts: &[&ChunkData]) -> Result<Vec<u8>, TransferError> {
    let Some(first) = parts.first() else {
        return Err(TransferError::InvalidInput("no fragments to join".into()));
    };
    strategy(first.encoding()).join(parts)
}
