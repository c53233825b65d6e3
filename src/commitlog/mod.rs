mod entry;
mod factory;
mod file;
mod in_memory;
mod kv;
mod log;
mod options;

pub use entry::Entry;
pub use factory::AnyLog;
pub use factory::LogFactory;
pub use factory::LogKind;
pub use factory::UnknownLogKind;
pub use file::FileLog;
pub use in_memory::InMemoryLog;
pub use kv::index_to_key;
pub use kv::key_to_index;
pub use kv::KvLog;
pub use log::Index;
pub use log::Log;
pub use log::LogError;
pub use log::StorageError;
pub use options::KvSyncMode;
pub use options::LogConfig;
pub use options::LogOptions;
