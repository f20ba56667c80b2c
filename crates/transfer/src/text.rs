//! UTF-8 text splitting under a byte budget.

use chunkwire_protocol::{MAX_SAFE_INTEGER, MIN_TEXT_CHUNK_SIZE};

use crate::TransferError;

/// Checks that `max_bytes` is usable for text splitting: even, at least
/// [`MIN_TEXT_CHUNK_SIZE`] and within the safe integer range.
pub(crate) fn validate_text_chunk_size(max_bytes: usize) -> Result<(), TransferError> {
    if max_bytes < MIN_TEXT_CHUNK_SIZE || max_bytes % 2 != 0 || max_bytes as u64 > MAX_SAFE_INTEGER
    {
        return Err(TransferError::InvalidParameter(format!(
            "chunk size must be even and at least {MIN_TEXT_CHUNK_SIZE}, got {max_bytes}"
        )));
    }
    Ok(())
}

/// Splits `text` into pieces of at most `max_bytes` UTF-8 bytes each,
/// never cutting a character in two.
///
/// Characters are packed greedily: a new piece starts only when the next
/// character would overflow the current one. Empty input yields a single
/// empty piece.
pub fn split_str(text: &str, max_bytes: usize) -> Result<Vec<String>, TransferError> {
    validate_text_chunk_size(max_bytes)?;
    Ok(pack_chars(text, max_bytes)
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Joins pieces produced by [`split_str`].
pub fn join_str<S: AsRef<str>>(parts: &[S]) -> String {
    let mut out = String::new();
    for part in parts {
        out.push_str(part.as_ref());
    }
    out
}

/// Greedy character packing. `max_bytes` must already be validated, which
/// guarantees every character fits in an empty piece.
pub(crate) fn pack_chars(text: &str, max_bytes: usize) -> Vec<&str> {
    let mut parts = Vec::with_capacity(text.len() / max_bytes + 1);
    let mut start = 0;
    for (offset, ch) in text.char_indices() {
        if offset + ch.len_utf8() - start > max_bytes {
            parts.push(&text[start..offset]);
            start = offset;
        }
    }
    parts.push(&text[start..]);
    parts
}
