use crate::bench::close_guard::CloseGuard;
use crate::bench::start_gate::StartGate;
use crate::bench::{BenchmarkConfig, BenchmarkOptions};
use crate::commitlog::{Log, LogError};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::convert::TryFrom;
use std::io;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// Outcome of one successful run.
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub started_at: DateTime<Utc>,
    pub workers: usize,
    pub operations: usize,
    /// One wall-clock span, from releasing the workers until the last one finished.
    pub elapsed: Duration,
    /// Appends per second over `elapsed`.
    pub throughput: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum BenchmarkError {
    #[error("Illegal benchmark options: {0}")]
    InvalidOptions(&'static str),
    #[error("Failed to open log: {0}")]
    Open(#[source] LogError),
    #[error("Worker {worker} failed: {source}")]
    Worker {
        worker: usize,
        #[source]
        source: LogError,
    },
    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),
    #[error("Failed to start worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: io::Error,
    },
}

/// Measures append throughput of a log under concurrent writers.
#[derive(Clone)]
pub struct Benchmarker {
    logger: slog::Logger,
}

impl Benchmarker {
    pub fn new(logger: slog::Logger) -> Self {
        Benchmarker { logger }
    }

    /// Opens `log` at `path`, has `threads` workers append `n` values each, closes the log and
    /// returns appends per second.
    pub fn benchmark<L: Log + ?Sized>(
        &self,
        log: &L,
        path: &Path,
        n: usize,
        threads: usize,
    ) -> Result<f64, BenchmarkError> {
        let config = BenchmarkConfig::try_from(BenchmarkOptions {
            ops_per_worker: Some(n),
            workers: Some(threads),
            payload: None,
        })
        .map_err(BenchmarkError::InvalidOptions)?;

        let report = self.run(log, path, &config)?;
        Ok(report.throughput)
    }

    /// Same as [`Benchmarker::benchmark`], with the full config and report.
    pub fn run<L: Log + ?Sized>(
        &self,
        log: &L,
        path: &Path,
        config: &BenchmarkConfig,
    ) -> Result<BenchmarkReport, BenchmarkError> {
        log.open(path).map_err(BenchmarkError::Open)?;
        let _close = CloseGuard::new(&self.logger, log);

        self.measure(log, config)
    }

    /// Drives an already open log, leaving it open. All workers start together and the run
    /// only ends once every one of them has returned.
    pub fn measure<L: Log + ?Sized>(&self, log: &L, config: &BenchmarkConfig) -> Result<BenchmarkReport, BenchmarkError> {
        let workers = config.workers;
        let gate = StartGate::new();
        let started_at = Utc::now();

        let (outcomes, elapsed) = thread::scope(|scope| {
            // Abandons the run unless released, so an early return or panic here never leaves
            // spawned workers waiting.
            let keeper = gate.keeper();

            let mut handles = Vec::with_capacity(workers);
            for worker in 0..workers {
                let gate = &gate;
                let spawned = thread::Builder::new()
                    .name(worker_thread_name(worker))
                    .spawn_scoped(scope, move || {
                        if !gate.wait() {
                            return Ok(());
                        }
                        append_repeatedly(log, config.ops_per_worker, &config.payload)
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        slog::error!(self.logger, "Failed to start worker {}: {}", worker, e);
                        return Err(BenchmarkError::Spawn { worker, source: e });
                    }
                }
            }

            keeper.release();
            let start = Instant::now();
            // Joined in worker order, which is the order failures are reported in.
            let outcomes: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();

            Ok((outcomes, start.elapsed()))
        })?;

        let mut first_failure = None;
        for (worker, outcome) in outcomes.into_iter().enumerate() {
            let failure = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => {
                    slog::error!(self.logger, "Worker {} failed: {}", worker, e);
                    BenchmarkError::Worker { worker, source: e }
                }
                Err(_) => {
                    slog::error!(self.logger, "Worker {} panicked.", worker);
                    BenchmarkError::WorkerPanicked(worker)
                }
            };
            first_failure.get_or_insert(failure);
        }
        if let Some(failure) = first_failure {
            return Err(failure);
        }

        let operations = config.total_operations();
        let report = BenchmarkReport {
            started_at,
            workers,
            operations,
            elapsed,
            throughput: operations as f64 / elapsed.as_secs_f64(),
        };
        slog::info!(
            self.logger,
            "{} appends by {} workers in {:?}: {:.0} ops/sec",
            report.operations,
            report.workers,
            report.elapsed,
            report.throughput
        );

        Ok(report)
    }
}

fn worker_thread_name(worker: usize) -> String {
    format!("bench-worker-{}", worker)
}

fn append_repeatedly<L: Log + ?Sized>(log: &L, n: usize, payload: &Bytes) -> Result<(), LogError> {
    for _ in 0..n {
        log.append(payload.clone())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitlog::{Entry, Index, InMemoryLog};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn benchmarker() -> Benchmarker {
        Benchmarker::new(slog::Logger::root(slog::Discard, slog::o!()))
    }

    fn discard() -> slog::Logger {
        slog::Logger::root(slog::Discard, slog::o!())
    }

    /// Fails every append after the first `budget` appends.
    struct FailingLog {
        inner: InMemoryLog,
        budget: AtomicUsize,
        opens: AtomicUsize,
        closes: AtomicUsize,
        fail_open: bool,
    }

    impl FailingLog {
        fn new(budget: usize, fail_open: bool) -> Self {
            FailingLog {
                inner: InMemoryLog::new(discard()),
                budget: AtomicUsize::new(budget),
                opens: AtomicUsize::new(0),
                closes: AtomicUsize::new(0),
                fail_open,
            }
        }
    }

    impl Log for FailingLog {
        fn open(&self, path: &Path) -> Result<(), LogError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if self.fail_open {
                return Err(LogError::AlreadyOpen);
            }
            self.inner.open(path)
        }

        fn append(&self, value: Bytes) -> Result<Index, LogError> {
            let left = self.budget.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |b| b.checked_sub(1));
            if left.is_err() {
                return Err(LogError::Closed);
            }
            self.inner.append(value)
        }

        fn get(&self, index: Index) -> Result<Entry, LogError> {
            self.inner.get(index)
        }

        fn next_index(&self) -> Result<Index, LogError> {
            self.inner.next_index()
        }

        fn close(&self) -> Result<(), LogError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            self.inner.close()
        }
    }

    #[test]
    fn measure_appends_every_operation() {
        let log = InMemoryLog::new(discard());
        log.open(Path::new("")).unwrap();
        let config = BenchmarkConfig::try_from(BenchmarkOptions {
            ops_per_worker: Some(250),
            workers: Some(4),
            payload: None,
        })
        .unwrap();

        let report = benchmarker().measure(&log, &config).unwrap();

        assert_eq!(report.operations, 1000);
        assert!(report.throughput.is_finite() && report.throughput > 0.0);
        assert_eq!(log.next_index().unwrap(), Index::new(1000));
        assert_eq!(log.get(Index::new(999)).unwrap().value, Bytes::from_static(b"foo"));
    }

    #[test]
    fn benchmark_closes_log_afterwards() {
        let log = FailingLog::new(usize::MAX, false);

        let throughput = benchmarker().benchmark(&log, Path::new(""), 10, 2).unwrap();

        assert!(throughput > 0.0);
        assert_eq!(log.closes.load(Ordering::SeqCst), 1);
        assert!(matches!(log.inner.next_index(), Err(LogError::Closed)));
    }

    #[test]
    fn open_failure_is_returned_without_running() {
        let log = FailingLog::new(usize::MAX, true);

        let err = benchmarker().benchmark(&log, Path::new(""), 10, 2).unwrap_err();

        assert!(matches!(err, BenchmarkError::Open(_)));
        assert_eq!(log.closes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn worker_failure_is_reported_after_join() {
        let log = FailingLog::new(15, false);

        let err = benchmarker().benchmark(&log, Path::new(""), 10, 3).unwrap_err();

        assert!(matches!(err, BenchmarkError::Worker { source: LogError::Closed, .. }));
        assert_eq!(log.opens.load(Ordering::SeqCst), 1);
        assert_eq!(log.closes.load(Ordering::SeqCst), 1);
    }

    /// Fails every append made from one of the named worker threads.
    struct FailingWorkers {
        inner: InMemoryLog,
        failing: Vec<String>,
    }

    impl Log for FailingWorkers {
        fn open(&self, path: &Path) -> Result<(), LogError> {
            self.inner.open(path)
        }

        fn append(&self, value: Bytes) -> Result<Index, LogError> {
            let name = thread::current().name().map(str::to_string);
            if name.as_ref() == self.failing.first() {
                // Let the later workers fail first.
                thread::sleep(Duration::from_millis(50));
            }
            if name.map_or(false, |name| self.failing.contains(&name)) {
                return Err(LogError::NotFound(Index::start_index()));
            }
            self.inner.append(value)
        }

        fn get(&self, index: Index) -> Result<Entry, LogError> {
            self.inner.get(index)
        }

        fn next_index(&self) -> Result<Index, LogError> {
            self.inner.next_index()
        }

        fn close(&self) -> Result<(), LogError> {
            self.inner.close()
        }
    }

    #[test]
    fn first_failure_in_worker_order_is_reported() {
        let log = FailingWorkers {
            inner: InMemoryLog::new(discard()),
            failing: vec![worker_thread_name(0), worker_thread_name(2)],
        };

        let err = benchmarker().benchmark(&log, Path::new(""), 5, 4).unwrap_err();

        assert!(matches!(
            err,
            BenchmarkError::Worker {
                worker: 0,
                source: LogError::NotFound(_)
            }
        ));
    }

    #[test]
    fn workers_run_on_named_threads() {
        let log = FailingWorkers {
            inner: InMemoryLog::new(discard()),
            failing: vec![worker_thread_name(1)],
        };

        let err = benchmarker().benchmark(&log, Path::new(""), 5, 3).unwrap_err();

        assert!(matches!(err, BenchmarkError::Worker { worker: 1, .. }));
    }

    #[test]
    fn zero_workers_rejected_before_open() {
        let log = FailingLog::new(usize::MAX, false);

        let err = benchmarker().benchmark(&log, Path::new(""), 10, 0).unwrap_err();

        assert!(matches!(err, BenchmarkError::InvalidOptions(_)));
        assert_eq!(log.opens.load(Ordering::SeqCst), 0);
    }
}
