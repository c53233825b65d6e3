/// Per-operation append cost of each backend, one append per iteration.
///
/// The concurrent throughput sweep lives in the binary; these isolate the single-writer path.
use bytes::Bytes;
use criterion::{criterion_group, criterion_main, Criterion};
use std::convert::TryFrom;
use syncwrite::{Log, LogConfig, LogFactory, LogKind, LogOptions};

fn append(c: &mut Criterion) {
    let config = LogConfig::try_from(LogOptions::default()).expect("default log options");
    let factory = LogFactory::new(slog::Logger::root(slog::Discard, slog::o!()), config);
    let payload = Bytes::from_static(b"foo");

    let mut group = c.benchmark_group("append");
    for kind in LogKind::ALL.iter() {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let log = factory.create(*kind);
        log.open(&kind.default_path(temp_dir.path())).expect("failed to open log");

        group.bench_function(kind.to_string(), |b| {
            b.iter(|| log.append(payload.clone()).expect("append failed"))
        });

        log.close().expect("failed to close log");
    }
    group.finish();
}

criterion_group!(benches, append);
criterion_main!(benches);
