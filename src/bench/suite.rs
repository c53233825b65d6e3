use crate::bench::{BenchmarkConfig, BenchmarkError, Benchmarker, SuiteConfig};
use crate::commitlog::{LogFactory, LogKind};
use std::io;
use std::path::Path;

/// Throughput samples for one backend at one worker count.
#[derive(Debug, Clone)]
pub struct SuiteCell {
    pub kind: LogKind,
    pub workers: usize,
    pub ops_per_worker: usize,
    pub throughputs: Vec<f64>,
}

impl SuiteCell {
    pub fn mean(&self) -> f64 {
        self.throughputs.iter().sum::<f64>() / self.throughputs.len() as f64
    }

    pub fn min(&self) -> f64 {
        self.throughputs.iter().cloned().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.throughputs.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    #[error("Failed to prepare run directory: {0}")]
    RunDirectory(#[from] io::Error),
    #[error("{kind} log with {workers} workers: {source}")]
    Run {
        kind: LogKind,
        workers: usize,
        #[source]
        source: BenchmarkError,
    },
}

/// Sweeps every configured backend over every worker count. Each sample runs against a fresh
/// log at a fresh path under the base directory, so persistent backends always start empty.
pub struct ThroughputSuite {
    logger: slog::Logger,
    config: SuiteConfig,
}

impl ThroughputSuite {
    pub fn new(logger: slog::Logger, config: SuiteConfig) -> Self {
        ThroughputSuite { logger, config }
    }

    pub fn run(&self, factory: &LogFactory, base_directory: &Path) -> Result<Vec<SuiteCell>, SuiteError> {
        let mut cells = Vec::with_capacity(self.config.kinds.len() * self.config.worker_counts.len());

        for kind in self.config.kinds.iter().cloned() {
            for workers in self.config.worker_counts.iter().cloned() {
                let cell = self.run_cell(factory, base_directory, kind, workers)?;
                slog::info!(
                    self.logger,
                    "{} log, {} workers: mean {:.0} ops/sec (min {:.0}, max {:.0})",
                    cell.kind,
                    cell.workers,
                    cell.mean(),
                    cell.min(),
                    cell.max()
                );
                cells.push(cell);
            }
        }

        Ok(cells)
    }

    fn run_cell(
        &self,
        factory: &LogFactory,
        base_directory: &Path,
        kind: LogKind,
        workers: usize,
    ) -> Result<SuiteCell, SuiteError> {
        let logger = self.logger.new(slog::o!("Log" => kind.to_string(), "Workers" => workers));
        let benchmarker = Benchmarker::new(logger);
        let config = BenchmarkConfig {
            ops_per_worker: self.config.total_operations / workers,
            workers,
            payload: self.config.payload.clone(),
        };

        let mut throughputs = Vec::with_capacity(self.config.samples);
        for sample in 0..self.config.samples {
            let run_directory = base_directory.join(format!("{}-{}-{}", kind, workers, sample));
            std::fs::create_dir_all(&run_directory)?;

            let log = factory.create(kind);
            let report = benchmarker
                .run(&log, &kind.default_path(&run_directory), &config)
                .map_err(|source| SuiteError::Run { kind, workers, source })?;
            throughputs.push(report.throughput);
        }

        Ok(SuiteCell {
            kind,
            workers,
            ops_per_worker: config.ops_per_worker,
            throughputs,
        })
    }
}
