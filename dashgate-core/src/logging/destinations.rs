//! Log output destinations - where logs are sent

use crate::logging::{LogFormat, LogLevel, LoggingConfig};
use serde_json::Value;
use std::collections::BTreeMap;

/// Where logs should be sent
#[derive(Clone, Debug, PartialEq)]
pub enum LogOutput {
    /// Write to stdout
    Stdout {
        /// Override the default format for this output
        format: Option<LogFormat>,
    },
    /// Write to stderr
    Stderr {
        /// Override the default format for this output
        format: Option<LogFormat>,
    },
    /// Append to a file (parent directories are created)
    File {
        path: String,
        /// Override the default format for this output
        format: Option<LogFormat>,
    },
}

/// Sink for formatted log entries
pub trait LogDestination: Send + Sync {
    /// Write a log entry to this destination
    fn write_log(&self, entry: &LogEntry) -> anyhow::Result<()>;

    /// Flush any buffered logs
    fn flush(&self) -> anyhow::Result<()>;
}

/// A structured log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Target (usually module path)
    pub target: String,
    /// Additional structured fields, sorted by key
    pub fields: BTreeMap<String, Value>,
    /// Source file and line number
    pub location: Option<LogLocation>,
}

/// Source code location for a log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            level,
            message: message.into(),
            target: target.into(),
            fields: BTreeMap::new(),
            location: None,
        }
    }

    /// Create a LogEntry from a standard log::Record
    pub fn from_log_record(record: &log::Record, config: &LoggingConfig) -> Self {
        let mut entry =
            Self::new(record.level().into(), record.args().to_string(), record.target());

        if let (Some(file), Some(line)) = (record.file(), record.line()) {
            entry.location = Some(LogLocation { file: file.to_string(), line });
        }

        for (key, value) in &config.context_fields {
            entry.fields.insert(key.clone(), Value::String(value.clone()));
        }

        entry
    }

    /// Add a structured field to the log entry
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn with_location(mut self, file: &str, line: u32) -> Self {
        self.location = Some(LogLocation { file: file.to_string(), line });
        self
    }
}
