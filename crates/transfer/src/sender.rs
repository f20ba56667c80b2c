use std::borrow::Cow;

use chunkwire_protocol::Chunk;
use tracing::debug;

use crate::split::Splitter;
use crate::{ChunkOptions, SingleTransferReceiver, TransferError, compress, hash};

/// Splits `content` into chunks ready for transport.
///
/// The transfer id is the content address of `content` itself, so a
/// receiver can verify the payload after decompression. The payload is
/// gzipped first when `options.compress` is set and it is large enough to
/// benefit.
pub fn create_chunks(content: &[u8], options: &ChunkOptions) -> Result<Vec<Chunk>, TransferError> {
    let splitter = Splitter::new(options.encoding, options.chunk_size)?;
    let id = hash::content_id(content);

    let payload = if options.compress {
        compress::compress(content)?
    } else {
        Cow::Borrowed(content)
    };

    let parts = splitter.split(&payload);
    let total = parts.len() as u64;
    debug!(
        id = %id,
        bytes = content.len(),
        encoded = payload.len(),
        total,
        encoding = ?options.encoding,
        "chunks created"
    );

    Ok(parts
        .into_iter()
        .enumerate()
        .map(|(index, data)| Chunk {
            id: id.clone(),
            total,
            index: index as u64,
            data,
        })
        .collect())
}

/// Reassembles a complete set of chunks, in any order, into the payload.
///
/// Every chunk must belong to the transfer named by the first one.
pub fn join_chunks<I>(chunks: I) -> Result<Vec<u8>, TransferError>
where
    I: IntoIterator<Item = Chunk>,
{
    let mut chunks = chunks.into_iter().peekable();
    let first = chunks.peek().ok_or(TransferError::MissingChunk)?;
    let mut receiver = SingleTransferReceiver::new(first.id.clone(), first.total)?;
    for chunk in chunks {
        receiver.add_chunk(chunk)?;
    }
    receiver.to_bytes()
}
