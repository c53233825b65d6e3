use crate::commitlog::in_memory::Entries;
use crate::commitlog::{Entry, Index, Log, LogError};
use bytes::Bytes;
use parking_lot::RwLock;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

const RECORD_DELIMITER: u8 = b'\n';

/// Log that writes one encoded entry per line to a file opened in append mode.
///
/// ```text
/// {"index":0,"value":[...]}\n
/// {"index":1,"value":[...]}\n
/// ...
/// ```
///
/// All entries are also kept in memory; after recovery the file is write-only and every read is
/// served from memory. Appends are handed to the OS write buffer without an fsync.
pub struct FileLog {
    logger: slog::Logger,
    // None while closed.
    state: RwLock<Option<OpenFile>>,
}

struct OpenFile {
    entries: Entries,
    file: File,
}

/// What recovery found in an existing log file.
struct Recovered {
    entries: Entries,
    // Length of the prefix made of decodable records.
    valid_len: u64,
    file_len: u64,
    // The last recovered record ended at end of file without its delimiter.
    missing_delimiter: bool,
}

impl Recovered {
    fn empty() -> Self {
        Recovered {
            entries: Entries::new(),
            valid_len: 0,
            file_len: 0,
            missing_delimiter: false,
        }
    }
}

impl FileLog {
    pub fn new(logger: slog::Logger) -> Self {
        FileLog {
            logger,
            state: RwLock::new(None),
        }
    }

    /// Replays the entries in the file at `path`. A file that is missing or cannot be opened is
    /// an empty log. A read failure part way through is returned, and the file is left alone.
    fn recover(&self, path: &Path) -> Result<Recovered, io::Error> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                slog::info!(self.logger, "No existing log file to recover ({}).", e);
                return Ok(Recovered::empty());
            }
        };
        let file_len = file.metadata()?.len();

        let mut recovered = self.replay(BufReader::new(file))?;
        recovered.file_len = file_len;
        Ok(recovered)
    }

    /// Decodes one record per line until end of input or the first record that fails to decode;
    /// a record that fails to decode is what an interrupted write leaves behind. The last line
    /// may lack its delimiter and is still recovered if it decodes.
    fn replay<R: BufRead>(&self, mut reader: R) -> Result<Recovered, io::Error> {
        let mut recovered = Recovered::empty();
        let mut line = Vec::new();
        loop {
            line.clear();
            let n = reader.read_until(RECORD_DELIMITER, &mut line)?;
            if n == 0 {
                break;
            }

            let terminated = line.last() == Some(&RECORD_DELIMITER);
            let record = if terminated { &line[..n - 1] } else { &line[..] };
            match Entry::decode(record) {
                Ok(entry) => {
                    recovered.entries.push(entry);
                    recovered.valid_len += n as u64;
                    recovered.missing_delimiter = !terminated;
                }
                Err(e) => {
                    slog::warn!(
                        self.logger,
                        "Stopping recovery at byte {} on malformed record: {}",
                        recovered.valid_len,
                        e
                    );
                    break;
                }
            }
        }

        Ok(recovered)
    }

    fn open_for_append(path: &Path, recovered: &Recovered) -> Result<File, io::Error> {
        let mut file = OpenOptions::new().append(true).create(true).open(path)?;

        // Cut off the discarded tail and close off the last record, so that what we append next
        // starts on its own line.
        if recovered.valid_len < recovered.file_len {
            file.set_len(recovered.valid_len)?;
        }
        if recovered.missing_delimiter {
            file.write_all(&[RECORD_DELIMITER])?;
        }

        Ok(file)
    }
}

impl Log for FileLog {
    fn open(&self, path: &Path) -> Result<(), LogError> {
        let mut state = self.state.write();
        if state.is_some() {
            return Err(LogError::AlreadyOpen);
        }

        let recovered = self.recover(path).map_err(|e| LogError::open(path, e))?;
        let file = Self::open_for_append(path, &recovered).map_err(|e| LogError::open(path, e))?;

        slog::info!(
            self.logger,
            "Opened file log {:?}: recovered {} entries, discarded {} bytes.",
            path,
            recovered.entries.len(),
            recovered.file_len.saturating_sub(recovered.valid_len)
        );
        state.replace(OpenFile {
            entries: recovered.entries,
            file,
        });

        Ok(())
    }

    fn append(&self, value: Bytes) -> Result<Index, LogError> {
        let mut state = self.state.write();
        let OpenFile { entries, file } = state.as_mut().ok_or(LogError::Closed)?;

        // The entry is visible in memory even if the write below fails.
        let entry = entries.create(value);
        let mut record = entry.encode()?;
        record.push(RECORD_DELIMITER);
        file.write_all(&record)?;

        Ok(entry.index)
    }

    fn get(&self, index: Index) -> Result<Entry, LogError> {
        let state = self.state.read();
        state.as_ref().ok_or(LogError::Closed)?.entries.get(index)
    }

    fn next_index(&self) -> Result<Index, LogError> {
        let state = self.state.read();
        Ok(state.as_ref().ok_or(LogError::Closed)?.entries.next_index())
    }

    fn close(&self) -> Result<(), LogError> {
        let OpenFile { entries, file } = self.state.write().take().ok_or(LogError::Closed)?;
        drop(file);

        slog::info!(self.logger, "Closed file log holding {} entries.", entries.len());
        Ok(())
    }
}
