use crate::commitlog::{Index, LogError};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A single record of the log.
///
/// Encoded form is one JSON object, e.g. `{"index":3,"value":[102,111,111]}`. The encoding never
/// contains a newline, so the file backend can frame records by `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub index: Index,
    pub value: Bytes,
}

impl Entry {
    pub fn new(index: Index, value: Bytes) -> Self {
        Entry { index, value }
    }

    pub fn encode(&self) -> Result<Vec<u8>, LogError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, LogError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
