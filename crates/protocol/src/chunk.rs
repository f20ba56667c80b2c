use serde::{Deserialize, Serialize};

/// How a payload is represented inside chunk fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Consecutive byte slices, sent as JSON integer arrays.
    Raw,
    /// Base64 text split on character boundaries, sent as JSON strings.
    #[default]
    Base64,
}

/// The encoded fragment carried by a single chunk.
///
/// Untagged on the wire: a JSON string is a base64 fragment, a JSON array of
/// integers is a raw byte fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChunkData {
    Text(String),
    Bytes(Vec<u8>),
}

impl ChunkData {
    /// Returns the encoding this fragment was produced with.
    pub fn encoding(&self) -> Encoding {
        match self {
            ChunkData::Text(_) => Encoding::Base64,
            ChunkData::Bytes(_) => Encoding::Raw,
        }
    }

    /// Encoded size of the fragment in bytes.
    pub fn len(&self) -> usize {
        match self {
            ChunkData::Text(s) => s.len(),
            ChunkData::Bytes(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for ChunkData {
    fn from(s: String) -> Self {
        ChunkData::Text(s)
    }
}

impl From<&str> for ChunkData {
    fn from(s: &str) -> Self {
        ChunkData::Text(s.to_string())
    }
}

impl From<Vec<u8>> for ChunkData {
    fn from(b: Vec<u8>) -> Self {
        ChunkData::Bytes(b)
    }
}

/// One fragment of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Content address of the whole payload this chunk belongs to.
    pub id: String,
    /// Number of chunks in the transfer. Identical on every chunk.
    pub total: u64,
    /// Zero-based position of this fragment, in `[0, total)`.
    pub index: u64,
    pub data: ChunkData,
}

impl Chunk {
    /// Creates a chunk record.
    pub fn new(id: impl Into<String>, total: u64, index: u64, data: impl Into<ChunkData>) -> Self {
        Self {
            id: id.into(),
            total,
            index,
            data: data.into(),
        }
    }

    /// Parses a chunk from a JSON message.
    ///
    /// A JSON `null` parses to `None` so callers can tell an absent chunk
    /// apart from a malformed one.
    pub fn parse(json: &str) -> Result<Option<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the chunk to its JSON wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
