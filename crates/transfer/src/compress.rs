//! Opportunistic gzip compression.
//!
//! Small payloads pass through untouched. Decompression sniffs the gzip
//! header, so a receiver never needs to be told whether the sender
//! compressed.

use std::borrow::Cow;
use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::TransferError;

/// Payloads shorter than this are sent uncompressed: below ~860 bytes the
/// gzip framing costs more than it saves.
pub const MIN_COMPRESS_SIZE: usize = 860;

/// gzip magic bytes followed by the deflate method id.
const GZIP_HEADER: [u8; 3] = [0x1f, 0x8b, 0x08];

/// Returns `true` if `data` starts with a gzip header.
pub fn is_gzip(data: &[u8]) -> bool {
    data.starts_with(&GZIP_HEADER)
}

/// Gzips `data` unless it is shorter than [`MIN_COMPRESS_SIZE`].
pub fn compress(data: &[u8]) -> Result<Cow<'_, [u8]>, TransferError> {
    if data.len() < MIN_COMPRESS_SIZE {
        return Ok(Cow::Borrowed(data));
    }
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data)?;
    Ok(Cow::Owned(encoder.finish()?))
}

/// Gunzips `data` if it carries a gzip header, otherwise returns it as is.
pub fn decompress(data: Vec<u8>) -> Result<Vec<u8>, TransferError> {
    if !is_gzip(&data) {
        return Ok(data);
    }
    let mut out = Vec::with_capacity(data.len() * 2);
    GzDecoder::new(data.as_slice())
        .read_to_end(&mut out)
        .map_err(|e| TransferError::ReconstructionFailure(format!("gunzip: {e}")))?;
    Ok(out)
}
