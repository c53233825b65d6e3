//! Concurrent append throughput measurement for any `Log`.
mod close_guard;
mod harness;
mod options;
mod start_gate;
mod suite;

pub use harness::BenchmarkError;
pub use harness::BenchmarkReport;
pub use harness::Benchmarker;
pub use options::BenchmarkConfig;
pub use options::BenchmarkOptions;
pub use options::SuiteConfig;
pub use options::SuiteOptions;
pub use suite::SuiteCell;
pub use suite::SuiteError;
pub use suite::ThroughputSuite;
