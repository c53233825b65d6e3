use slog::Drain;
use std::convert::TryFrom;
use std::error::Error;
use std::{fs, process};
use syncwrite::{LogConfig, LogFactory, LogOptions, SuiteConfig, SuiteOptions, ThroughputSuite};

fn main() {
    let logger = create_root_logger_for_stdout();

    if let Err(e) = run(&logger) {
        slog::error!(logger, "Throughput suite failed: {}", e);
        // Let the async drain flush before exiting.
        drop(logger);
        process::exit(1);
    }
}

fn run(logger: &slog::Logger) -> Result<(), Box<dyn Error>> {
    let base_directory = std::env::temp_dir().join(format!("syncwrite-{}", process::id()));
    fs::create_dir_all(&base_directory)?;
    slog::info!(logger, "Writing logs under {:?}", base_directory);

    let log_config = LogConfig::try_from(LogOptions::default())?;
    let suite_config = SuiteConfig::try_from(SuiteOptions::default())?;

    let factory = LogFactory::new(logger.clone(), log_config);
    let result = ThroughputSuite::new(logger.clone(), suite_config).run(&factory, &base_directory);

    fs::remove_dir_all(&base_directory)?;
    result?;
    Ok(())
}

fn create_root_logger_for_stdout() -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!())
}
