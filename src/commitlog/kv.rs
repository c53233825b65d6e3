use crate::commitlog::log::check_consistent;
use crate::commitlog::options::{KvSyncMode, LogConfig};
use crate::commitlog::{Entry, Index, Log, LogError};
use bytes::Bytes;
use lmdb::{Cursor, Database, DatabaseFlags, Environment, EnvironmentFlags, Transaction, WriteFlags};
use parking_lot::RwLock;
use std::fs;
use std::path::Path;

/// Format an index as big-endian bytes, so the store's byte order is numeric order.
pub fn index_to_key(index: Index) -> [u8; 8] {
    index.as_u64().to_be_bytes()
}

/// Parse an index from big-endian bytes. Keys of any other width are not ours.
pub fn key_to_index(bytes: &[u8]) -> Option<Index> {
    let mut raw = [0u8; 8];
    if bytes.len() != raw.len() {
        return None;
    }
    raw.copy_from_slice(bytes);

    Some(Index::new(u64::from_be_bytes(raw)))
}

/// Log stored in an embedded LMDB environment, one entry per key.
///
/// Nothing is cached in memory besides the next index; every `get()` is a store lookup.
/// Durability of an append is whatever the environment's sync mode gives.
pub struct KvLog {
    logger: slog::Logger,
    config: LogConfig,
    // None while closed.
    state: RwLock<Option<OpenStore>>,
}

struct OpenStore {
    env: Environment,
    db: Database,
    next_index: Index,
}

impl KvLog {
    pub fn new(logger: slog::Logger, config: LogConfig) -> Self {
        KvLog {
            logger,
            config,
            state: RwLock::new(None),
        }
    }

    fn open_env(&self, path: &Path) -> Result<(Environment, Database), LogError> {
        fs::create_dir_all(path).map_err(|e| LogError::open(path, e))?;

        let mut flags = EnvironmentFlags::empty();
        match self.config.kv_sync_mode {
            KvSyncMode::Full => {}
            KvSyncMode::NoMetaSync => flags.insert(EnvironmentFlags::NO_META_SYNC),
            KvSyncMode::NoSync => flags.insert(EnvironmentFlags::NO_SYNC),
        }

        let env = Environment::new()
            .set_map_size(self.config.kv_map_size)
            .set_flags(flags)
            .open(path)
            .map_err(|e| LogError::open(path, e))?;
        let db = env
            .create_db(None, DatabaseFlags::empty())
            .map_err(|e| LogError::open(path, e))?;

        Ok((env, db))
    }

    /// Scans every key for the largest index. Returns the index after it, or the start index if
    /// the store holds no entries.
    fn recover_next_index(env: &Environment, db: Database) -> Result<Index, lmdb::Error> {
        let txn = env.begin_ro_txn()?;
        let mut last_index: Option<Index> = None;
        {
            let mut cursor = txn.open_ro_cursor(db)?;
            // An unpositioned cursor steps to the first key, and yields nothing on an empty store.
            for (key, _) in cursor.iter() {
                if let Some(index) = key_to_index(key) {
                    last_index = last_index.max(Some(index));
                }
            }
        }
        txn.commit()?;

        Ok(last_index.map_or_else(Index::start_index, |index| index.plus(1)))
    }
}

impl Log for KvLog {
    fn open(&self, path: &Path) -> Result<(), LogError> {
        let mut state = self.state.write();
        if state.is_some() {
            return Err(LogError::AlreadyOpen);
        }

        let (env, db) = self.open_env(path)?;
        let next_index = Self::recover_next_index(&env, db).map_err(|e| LogError::open(path, e))?;

        slog::info!(self.logger, "Opened kv log {:?}: next index is {}.", path, next_index);
        state.replace(OpenStore { env, db, next_index });

        Ok(())
    }

    fn append(&self, value: Bytes) -> Result<Index, LogError> {
        let mut state = self.state.write();
        let store = state.as_mut().ok_or(LogError::Closed)?;

        let entry = Entry::new(store.next_index, value);
        let data = entry.encode()?;

        let mut txn = store.env.begin_rw_txn()?;
        txn.put(store.db, &index_to_key(entry.index), &data, WriteFlags::empty())?;
        txn.commit()?;

        // Only advance once the entry is in the store.
        store.next_index = entry.index.plus(1);
        Ok(entry.index)
    }

    fn get(&self, index: Index) -> Result<Entry, LogError> {
        let state = self.state.read();
        let store = state.as_ref().ok_or(LogError::Closed)?;

        let txn = store.env.begin_ro_txn()?;
        let entry = match txn.get(store.db, &index_to_key(index)) {
            Ok(bytes) => Entry::decode(bytes)?,
            Err(lmdb::Error::NotFound) => return Err(LogError::NotFound(index)),
            Err(e) => return Err(e.into()),
        };
        txn.abort();

        check_consistent(index, entry)
    }

    fn next_index(&self) -> Result<Index, LogError> {
        let state = self.state.read();
        Ok(state.as_ref().ok_or(LogError::Closed)?.next_index)
    }

    fn close(&self) -> Result<(), LogError> {
        let OpenStore { env, next_index, .. } = self.state.write().take().ok_or(LogError::Closed)?;
        drop(env);

        slog::info!(self.logger, "Closed kv log; next index was {}.", next_index);
        Ok(())
    }
}
