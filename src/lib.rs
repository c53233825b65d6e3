mod bench;
mod commitlog;

pub use bench::BenchmarkConfig;
pub use bench::BenchmarkError;
pub use bench::BenchmarkOptions;
pub use bench::BenchmarkReport;
pub use bench::Benchmarker;
pub use bench::SuiteCell;
pub use bench::SuiteConfig;
pub use bench::SuiteError;
pub use bench::SuiteOptions;
pub use bench::ThroughputSuite;
pub use commitlog::index_to_key;
pub use commitlog::key_to_index;
pub use commitlog::AnyLog;
pub use commitlog::Entry;
pub use commitlog::FileLog;
pub use commitlog::InMemoryLog;
pub use commitlog::Index;
pub use commitlog::KvLog;
pub use commitlog::KvSyncMode;
pub use commitlog::Log;
pub use commitlog::LogConfig;
pub use commitlog::LogError;
pub use commitlog::LogFactory;
pub use commitlog::LogKind;
pub use commitlog::LogOptions;
pub use commitlog::StorageError;
pub use commitlog::UnknownLogKind;

// `crate::{root_mod}` holds no code, only `mod` and `pub use` statements. Modules are never
// `pub`; types are exported individually.
