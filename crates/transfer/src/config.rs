use std::time::Duration;

use chunkwire_protocol::Encoding;
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_EVENT_CAPACITY, DEFAULT_TIMEOUT, TransferError};

/// Sender-side options for [`create_chunks`](crate::create_chunks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkOptions {
    /// Maximum encoded size of one chunk's data, in bytes.
    pub chunk_size: usize,
    /// Gzip the payload before splitting (skipped for small payloads).
    #[serde(default = "default_compress")]
    pub compress: bool,
    #[serde(default)]
    pub encoding: Encoding,
}

fn default_compress() -> bool {
    true
}

impl ChunkOptions {
    /// Options with compression on and base64 encoding.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            compress: true,
            encoding: Encoding::default(),
        }
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Configuration for the multi-transfer [`TransferReceiver`](crate::TransferReceiver).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReceiverConfig {
    /// Time allowed between the first chunk of a transfer and its
    /// completion. Started once, never reset.
    #[serde(with = "duration_ms")]
    pub timeout: Duration,
    /// Fail a completed transfer whose payload does not hash to its id.
    pub verify: bool,
    /// Capacity of the event channel.
    pub event_capacity: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            verify: false,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ReceiverConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), TransferError> {
        if self.timeout.is_zero() {
            return Err(TransferError::InvalidParameter(
                "timeout must be greater than zero".into(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(TransferError::InvalidParameter(
                "event capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Serializes a [`Duration`] as whole milliseconds.
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
