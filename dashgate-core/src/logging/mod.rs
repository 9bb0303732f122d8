//! Dashgate Declarative Logging System
//!
//! A small logger on the standard `log` facade. Describe the outputs once in a
//! [`LoggingConfig`], call [`init_logging`] at startup, then use the usual
//! `log::info!`/`log::debug!` macros everywhere.
//!
//! The library itself logs authorization transitions at `info`, denied or
//! discarded work at `debug` and rejected transitions at `warn`.
//!
//! # Example
//!
//! ```rust,no_run
//! use dashgate_core::logging::{LoggingConfig, LogLevel};
//!
//! let config = LoggingConfig::production()
//!     .with_file_output("./logs/dashgate.log")
//!     .with_context_field("service", "dashgate")
//!     .with_level(LogLevel::Debug);
//!
//! dashgate_core::logging::init_logging(&config).unwrap();
//! log::info!("Navigation core ready");
//! ```

pub mod config;
pub mod destinations;
pub mod formatter;

pub use config::{LogLevel, LoggingConfig};
pub use destinations::{LogDestination, LogEntry, LogOutput};
pub use formatter::LogFormat;

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

static INSTALLED: Mutex<bool> = Mutex::new(false);

/// Initialize the logging system
///
/// Safe to call more than once; only the first successful call installs a
/// logger. A failed call leaves nothing installed and may be retried.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    install_once(&INSTALLED, || install(config))
}

fn install_once(
    installed: &Mutex<bool>,
    install: impl FnOnce() -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let mut installed = installed.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if *installed {
        return Ok(());
    }
    install()?;
    *installed = true;
    Ok(())
}

fn install(config: &LoggingConfig) -> anyhow::Result<()> {
    let logger = DashgateLogger::new(config.clone())?;
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(config.level.to_level_filter());
    Ok(())
}

/// `log::Log` implementation fanning entries out to every configured output
struct DashgateLogger {
    config: LoggingConfig,
    destinations: Vec<Box<dyn LogDestination>>,
}

impl DashgateLogger {
    fn new(config: LoggingConfig) -> anyhow::Result<Self> {
        let mut destinations: Vec<Box<dyn LogDestination>> = Vec::new();

        for output in &config.outputs {
            match output {
                LogOutput::Stdout { format } => destinations.push(Box::new(StdoutDestination {
                    format: format.clone().unwrap_or_else(|| config.format.clone()),
                })),
                LogOutput::Stderr { format } => destinations.push(Box::new(StderrDestination {
                    format: format.clone().unwrap_or_else(|| config.format.clone()),
                })),
                LogOutput::File { path, format } => destinations.push(Box::new(
                    FileDestination::open(
                        path,
                        format.clone().unwrap_or_else(|| config.format.clone()),
                    )?,
                )),
            }
        }

        if destinations.is_empty() {
            destinations.push(Box::new(StdoutDestination { format: config.format.clone() }));
        }

        Ok(Self { config, destinations })
    }
}

impl log::Log for DashgateLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::from(self.config.level)
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry::from_log_record(record, &self.config);
        for destination in &self.destinations {
            let _ = destination.write_log(&entry);
        }
    }

    fn flush(&self) {
        for destination in &self.destinations {
            let _ = destination.flush();
        }
    }
}

struct StdoutDestination {
    format: LogFormat,
}

impl LogDestination for StdoutDestination {
    fn write_log(&self, entry: &LogEntry) -> anyhow::Result<()> {
        writeln!(io::stdout().lock(), "{}", self.format.format_entry(entry))?;
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        io::stdout().flush()?;
        Ok(())
    }
}

struct StderrDestination {
    format: LogFormat,
}

impl LogDestination for StderrDestination {
    fn write_log(&self, entry: &LogEntry) -> anyhow::Result<()> {
        writeln!(io::stderr().lock(), "{}", self.format.format_entry(entry))?;
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        io::stderr().flush()?;
        Ok(())
    }
}

/// Append-only file output
struct FileDestination {
    writer: Mutex<BufWriter<File>>,
    format: LogFormat,
}

impl FileDestination {
    fn open(path: &str, format: LogFormat) -> anyhow::Result<Self> {
        let path = Path::new(path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { writer: Mutex::new(BufWriter::new(file)), format })
    }
}

impl LogDestination for FileDestination {
    fn write_log(&self, entry: &LogEntry) -> anyhow::Result<()> {
        let mut writer =
            self.writer.lock().map_err(|_| anyhow::anyhow!("log file writer poisoned"))?;
        writeln!(writer, "{}", self.format.format_entry(entry))?;
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        let mut writer =
            self.writer.lock().map_err(|_| anyhow::anyhow!("log file writer poisoned"))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn test_failed_install_can_be_retried() {
        let installed = Mutex::new(false);

        let err = install_once(&installed, || Err(anyhow::anyhow!("no log directory")));
        assert!(err.is_err());
        assert!(!*installed.lock().unwrap());

        let mut calls = 0;
        install_once(&installed, || {
            calls += 1;
            Ok(())
        })
        .unwrap();
        install_once(&installed, || {
            calls += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(calls, 1);
        assert!(*installed.lock().unwrap());
    }

    #[test]
    fn test_file_destination_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dashgate.log");
        let path_str = path.to_str().unwrap();

        let config = LoggingConfig {
            level: LogLevel::Info,
            outputs: vec![LogOutput::File { path: path_str.to_string(), format: None }],
            format: LogFormat::Custom("{level} {message}".into()),
            context_fields: Default::default(),
        };
        let logger = DashgateLogger::new(config).unwrap();

        logger.log(
            &log::Record::builder()
                .level(log::Level::Info)
                .args(format_args!("Session authenticated"))
                .build(),
        );
        logger.log(
            &log::Record::builder()
                .level(log::Level::Debug)
                .args(format_args!("filtered out"))
                .build(),
        );
        logger.flush();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "INFO Session authenticated\n");
    }

    #[test]
    fn test_defaults_to_stdout() {
        let config = LoggingConfig { outputs: vec![], ..LoggingConfig::default() };
        let logger = DashgateLogger::new(config).unwrap();
        assert_eq!(logger.destinations.len(), 1);
    }
}
