use crate::commitlog::{Entry, FileLog, Index, InMemoryLog, KvLog, Log, LogConfig, LogError};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

// -- Log kinds --

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LogKind {
    InMemory,
    File,
    Kv,
}

impl LogKind {
    pub const ALL: [LogKind; 3] = [LogKind::InMemory, LogKind::File, LogKind::Kv];

    /// Where a log of this kind lives under `base_directory`. The in-memory log ignores it.
    pub fn default_path(&self, base_directory: &Path) -> PathBuf {
        match self {
            LogKind::InMemory => PathBuf::new(),
            LogKind::File => base_directory.join("entries.log"),
            LogKind::Kv => base_directory.join("entries.lmdb"),
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogKind::InMemory => "memory",
            LogKind::File => "file",
            LogKind::Kv => "kv",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown log kind '{0}', expected one of: memory, file, kv")]
pub struct UnknownLogKind(String);

impl FromStr for LogKind {
    type Err = UnknownLogKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(LogKind::InMemory),
            "file" => Ok(LogKind::File),
            "kv" => Ok(LogKind::Kv),
            other => Err(UnknownLogKind(other.to_string())),
        }
    }
}

// -- Any log --

/// One of the backends, picked at runtime.
pub enum AnyLog {
    InMemory(InMemoryLog),
    File(FileLog),
    Kv(KvLog),
}

impl AnyLog {
    pub fn kind(&self) -> LogKind {
        match self {
            AnyLog::InMemory(_) => LogKind::InMemory,
            AnyLog::File(_) => LogKind::File,
            AnyLog::Kv(_) => LogKind::Kv,
        }
    }

    fn inner(&self) -> &dyn Log {
        match self {
            AnyLog::InMemory(log) => log,
            AnyLog::File(log) => log,
            AnyLog::Kv(log) => log,
        }
    }
}

impl Log for AnyLog {
    fn open(&self, path: &Path) -> Result<(), LogError> {
        self.inner().open(path)
    }

    fn append(&self, value: Bytes) -> Result<Index, LogError> {
        self.inner().append(value)
    }

    fn get(&self, index: Index) -> Result<Entry, LogError> {
        self.inner().get(index)
    }

    fn next_index(&self) -> Result<Index, LogError> {
        self.inner().next_index()
    }

    fn close(&self) -> Result<(), LogError> {
        self.inner().close()
    }
}

// -- Log factory --

pub struct LogFactory {
    logger: slog::Logger,
    config: LogConfig,
}

impl LogFactory {
    pub fn new(logger: slog::Logger, config: LogConfig) -> Self {
        LogFactory { logger, config }
    }

    /// Creates a closed log of the given kind.
    pub fn create(&self, kind: LogKind) -> AnyLog {
        let logger = self.logger.new(slog::o!("Log" => kind.to_string()));

        match kind {
            LogKind::InMemory => AnyLog::InMemory(InMemoryLog::new(logger)),
            LogKind::File => AnyLog::File(FileLog::new(logger)),
            LogKind::Kv => AnyLog::Kv(KvLog::new(logger, self.config.clone())),
        }
    }
}
