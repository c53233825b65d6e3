use crate::commitlog::Entry;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{fmt, io};

/// Index is an index of an entry in the log; i.e. a log entry's index.
#[derive(Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Index(u64);

impl Index {
    pub fn new(index: u64) -> Self {
        Index(index)
    }

    pub fn new_usize(index: usize) -> Self {
        Self::new(index as u64)
    }

    pub fn start_index() -> Self {
        Self::new(0)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }

    pub fn plus(&self, delta: u64) -> Index {
        Index::new(self.0 + delta)
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Log is an append only log whose operations are synchronized internally, so a single instance
/// can be shared by any number of threads.
///
/// Log indexes entries starting from 0. Every successful append uses the next index; there are
/// never gaps and an index is never reused.
///
/// Lifecycle: a log starts closed. `open()` acquires the backend's resources (and recovers any
/// persisted entries), and `close()` releases them. Every other operation on a closed log fails
/// with [`LogError::Closed`]. Closing twice also fails with [`LogError::Closed`].
pub trait Log: Send + Sync {
    /// Acquire the resources at `path`. What `path` means is up to the backend.
    fn open(&self, path: &Path) -> Result<(), LogError>;

    /// append() appends a value to the log at the next log entry index, then returns the log
    /// entry index that was just used to append the entry.
    fn append(&self, value: Bytes) -> Result<Index, LogError>;

    /// Read log entry at specified index.
    fn get(&self, index: Index) -> Result<Entry, LogError>;

    /// next_index returns the next index that will be used to append an entry.
    fn next_index(&self) -> Result<Index, LogError>;

    fn close(&self) -> Result<(), LogError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to open log at {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: StorageError,
    },
    #[error("log is already open")]
    AlreadyOpen,
    #[error("log has been closed")]
    Closed,
    #[error("no entry at index {0}")]
    NotFound(Index),
    #[error("log is not consistent with entries: looked up index {requested}, found index {stored}")]
    Inconsistent { requested: Index, stored: Index },
    #[error("malformed entry: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl LogError {
    pub(crate) fn open(path: &Path, source: impl Into<StorageError>) -> Self {
        LogError::Open {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

impl From<io::Error> for LogError {
    fn from(e: io::Error) -> Self {
        LogError::Storage(StorageError::Io(e))
    }
}

impl From<lmdb::Error> for LogError {
    fn from(e: lmdb::Error) -> Self {
        LogError::Storage(StorageError::Kv(e))
    }
}

/// Failure of the primitive underneath a backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("kv store: {0}")]
    Kv(#[from] lmdb::Error),
}

/// Rejects an entry whose stored index disagrees with the index it was looked up by.
pub(crate) fn check_consistent(requested: Index, entry: Entry) -> Result<Entry, LogError> {
    if entry.index != requested {
        return Err(LogError::Inconsistent {
            requested,
            stored: entry.index,
        });
    }

    Ok(entry)
}
