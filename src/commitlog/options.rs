use std::convert::TryFrom;

/// How hard the kv store works to make each write durable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KvSyncMode {
    /// Flush data and metadata on every commit.
    Full,
    /// Flush data on commit, leave metadata to the OS.
    NoMetaSync,
    /// Leave all flushing to the OS.
    NoSync,
}

#[derive(Clone, Debug, Default)]
pub struct LogOptions {
    pub kv_map_size: Option<usize>,
    pub kv_sync_mode: Option<KvSyncMode>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub kv_map_size: usize,
    pub kv_sync_mode: KvSyncMode,
}

impl LogConfig {
    fn validate(&self) -> Result<(), &'static str> {
        if self.kv_map_size == 0 {
            return Err("KV map size must be greater than zero");
        }

        Ok(())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            kv_map_size: 1 << 30,
            kv_sync_mode: KvSyncMode::Full,
        }
    }
}

impl TryFrom<LogOptions> for LogConfig {
    type Error = &'static str;

    fn try_from(options: LogOptions) -> Result<Self, Self::Error> {
        let defaults = LogConfig::default();
        let values = LogConfig {
            kv_map_size: options.kv_map_size.unwrap_or(defaults.kv_map_size),
            kv_sync_mode: options.kv_sync_mode.unwrap_or(defaults.kv_sync_mode),
        };

        values.validate()?;
        Ok(values)
    }
}
