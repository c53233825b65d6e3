use crate::commitlog::log::check_consistent;
use crate::commitlog::{Entry, Index, Log, LogError};
use bytes::Bytes;
use parking_lot::RwLock;
use std::path::Path;

/// Ordered entries held in RAM, where an entry's position is its index. Not synchronized; the
/// owning log provides locking.
pub(super) struct Entries {
    entries: Vec<Entry>,
}

impl Entries {
    pub(super) fn new() -> Self {
        Entries { entries: vec![] }
    }

    /// Creates an entry for `value` at the next index and appends it.
    pub(super) fn create(&mut self, value: Bytes) -> &Entry {
        let entry = Entry::new(self.next_index(), value);
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Appends an already-indexed entry as is. Used by recovery.
    pub(super) fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub(super) fn get(&self, index: Index) -> Result<Entry, LogError> {
        let entry = self
            .entries
            .get(index.as_usize())
            .cloned()
            .ok_or(LogError::NotFound(index))?;

        check_consistent(index, entry)
    }

    pub(super) fn next_index(&self) -> Index {
        Index::new_usize(self.entries.len())
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Volatile log. Nothing is persisted, so `open()` always starts empty and `close()` discards
/// the entries.
pub struct InMemoryLog {
    logger: slog::Logger,
    // None while closed.
    entries: RwLock<Option<Entries>>,
}

impl InMemoryLog {
    pub fn new(logger: slog::Logger) -> Self {
        InMemoryLog {
            logger,
            entries: RwLock::new(None),
        }
    }
}

impl Log for InMemoryLog {
    fn open(&self, _: &Path) -> Result<(), LogError> {
        let mut entries = self.entries.write();
        if entries.is_some() {
            return Err(LogError::AlreadyOpen);
        }

        entries.replace(Entries::new());
        slog::debug!(self.logger, "Opened in-memory log.");
        Ok(())
    }

    fn append(&self, value: Bytes) -> Result<Index, LogError> {
        let mut entries = self.entries.write();
        let entries = entries.as_mut().ok_or(LogError::Closed)?;

        Ok(entries.create(value).index)
    }

    fn get(&self, index: Index) -> Result<Entry, LogError> {
        let entries = self.entries.read();
        entries.as_ref().ok_or(LogError::Closed)?.get(index)
    }

    fn next_index(&self) -> Result<Index, LogError> {
        let entries = self.entries.read();
        Ok(entries.as_ref().ok_or(LogError::Closed)?.next_index())
    }

    fn close(&self) -> Result<(), LogError> {
        let closed = self.entries.write().take().ok_or(LogError::Closed)?;
        slog::debug!(self.logger, "Closed in-memory log holding {} entries.", closed.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened() -> InMemoryLog {
        let log = InMemoryLog::new(slog::Logger::root(slog::Discard, slog::o!()));
        log.open(Path::new("")).unwrap();
        log
    }

    #[test]
    fn append_assigns_sequential_indexes() {
        let log = opened();

        for i in 0..5u64 {
            let index = log.append(Bytes::from(format!("v{}", i))).unwrap();
            assert_eq!(index, Index::new(i));
        }

        let entry = log.get(Index::new(3)).unwrap();
        assert_eq!(entry.index, Index::new(3));
        assert_eq!(entry.value, Bytes::from("v3"));
        assert_eq!(log.next_index().unwrap(), Index::new(5));
    }

    #[test]
    fn missing_index_is_not_found() {
        let log = opened();
        log.append(Bytes::from_static(b"a")).unwrap();

        assert!(matches!(log.get(Index::new(1)), Err(LogError::NotFound(i)) if i == Index::new(1)));
    }

    #[test]
    fn lifecycle_guards() {
        let log = InMemoryLog::new(slog::Logger::root(slog::Discard, slog::o!()));
        assert!(matches!(log.append(Bytes::new()), Err(LogError::Closed)));

        log.open(Path::new("")).unwrap();
        assert!(matches!(log.open(Path::new("")), Err(LogError::AlreadyOpen)));
        log.append(Bytes::new()).unwrap();

        log.close().unwrap();
        assert!(matches!(log.append(Bytes::new()), Err(LogError::Closed)));
        assert!(matches!(log.get(Index::start_index()), Err(LogError::Closed)));
        assert!(matches!(log.close(), Err(LogError::Closed)));
    }

    #[test]
    fn reopen_starts_empty() {
        let log = opened();
        log.append(Bytes::from_static(b"gone")).unwrap();
        log.close().unwrap();

        log.open(Path::new("")).unwrap();
        assert_eq!(log.next_index().unwrap(), Index::start_index());
    }

    #[test]
    fn entries_detect_index_mismatch() {
        let mut entries = Entries::new();
        entries.push(Entry::new(Index::new(9), Bytes::new()));

        assert!(matches!(entries.get(Index::new(0)), Err(LogError::Inconsistent { .. })));
    }
}
