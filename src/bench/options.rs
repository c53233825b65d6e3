use crate::commitlog::LogKind;
use bytes::Bytes;
use std::convert::TryFrom;

const DEFAULT_PAYLOAD: &[u8] = b"foo";

#[derive(Clone, Debug, Default)]
pub struct BenchmarkOptions {
    pub ops_per_worker: Option<usize>,
    pub workers: Option<usize>,
    pub payload: Option<Bytes>,
}

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub ops_per_worker: usize,
    pub workers: usize,
    /// Value every append writes.
    pub payload: Bytes,
}

impl BenchmarkConfig {
    fn validate(&self) -> Result<(), &'static str> {
        if self.ops_per_worker == 0 {
            return Err("Operations per worker must be greater than zero");
        }
        if self.workers == 0 {
            return Err("Worker count must be greater than zero");
        }

        Ok(())
    }

    pub fn total_operations(&self) -> usize {
        self.ops_per_worker * self.workers
    }
}

impl TryFrom<BenchmarkOptions> for BenchmarkConfig {
    type Error = &'static str;

    fn try_from(options: BenchmarkOptions) -> Result<Self, Self::Error> {
        let values = BenchmarkConfig {
            ops_per_worker: options.ops_per_worker.unwrap_or(1000),
            workers: options.workers.unwrap_or(1),
            payload: options.payload.unwrap_or_else(|| Bytes::from_static(DEFAULT_PAYLOAD)),
        };

        values.validate()?;
        Ok(values)
    }
}

/// Options for sweeping every backend over several worker counts.
#[derive(Clone, Debug, Default)]
pub struct SuiteOptions {
    pub kinds: Option<Vec<LogKind>>,
    /// Operations per run, split evenly across the workers.
    pub total_operations: Option<usize>,
    pub worker_counts: Option<Vec<usize>>,
    pub samples: Option<usize>,
    pub payload: Option<Bytes>,
}

#[derive(Clone, Debug)]
pub struct SuiteConfig {
    pub kinds: Vec<LogKind>,
    pub total_operations: usize,
    pub worker_counts: Vec<usize>,
    pub samples: usize,
    pub payload: Bytes,
}

impl SuiteConfig {
    fn validate(&self) -> Result<(), &'static str> {
        if self.kinds.is_empty() {
            return Err("At least one log kind is required");
        }
        if self.samples == 0 {
            return Err("Sample count must be greater than zero");
        }
        if self.worker_counts.is_empty() {
            return Err("At least one worker count is required");
        }
        for workers in self.worker_counts.iter() {
            if *workers == 0 || *workers > self.total_operations {
                return Err("Worker counts must be between one and the total operation count");
            }
        }

        Ok(())
    }
}

impl TryFrom<SuiteOptions> for SuiteConfig {
    type Error = &'static str;

    fn try_from(options: SuiteOptions) -> Result<Self, Self::Error> {
        let values = SuiteConfig {
            kinds: options.kinds.unwrap_or_else(|| LogKind::ALL.to_vec()),
            total_operations: options.total_operations.unwrap_or(100_000),
            worker_counts: options.worker_counts.unwrap_or_else(|| vec![1, 2, 4, 8, 16]),
            samples: options.samples.unwrap_or(3),
            payload: options.payload.unwrap_or_else(|| Bytes::from_static(DEFAULT_PAYLOAD)),
        };

        values.validate()?;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn benchmark_defaults() {
        let config = BenchmarkConfig::try_from(BenchmarkOptions::default()).unwrap();
        assert_eq!(config.payload, Bytes::from_static(b"foo"));
        assert_eq!(config.total_operations(), 1000);
    }

    #[test]
    fn zero_workers_rejected() {
        let options = BenchmarkOptions {
            workers: Some(0),
            ..BenchmarkOptions::default()
        };
        assert!(BenchmarkConfig::try_from(options).is_err());
    }

    #[test]
    fn suite_rejects_more_workers_than_operations() {
        let options = SuiteOptions {
            total_operations: Some(4),
            worker_counts: Some(vec![2, 8]),
            ..SuiteOptions::default()
        };
        assert!(SuiteConfig::try_from(options).is_err());
    }
}
