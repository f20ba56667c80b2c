/// Largest value a peer may send for `index`, `total` or a chunk size.
///
/// JSON peers that store numbers as IEEE doubles cannot represent integers
/// above 2^53 - 1 exactly.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Smallest byte budget accepted when splitting text.
///
/// A single UTF-8 scalar value takes up to four bytes.
pub const MIN_TEXT_CHUNK_SIZE: usize = 4;
