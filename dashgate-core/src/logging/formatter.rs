//! Log formatting options for different output styles

use crate::logging::destinations::LogEntry;
use serde_json::{Map, Value};
use std::str::FromStr;

/// How logs should be formatted
#[derive(Clone, Debug, PartialEq)]
pub enum LogFormat {
    /// `{"timestamp":"...","level":"INFO","target":"...","message":"Session authenticated"}`
    Json,

    /// `2024-01-15 10:30:00.123 INFO  [dashgate_core::rbac] Session authenticated`
    Human,

    /// `timestamp=... level=INFO target=dashgate_core::rbac message="Session authenticated"`
    Logfmt,

    /// Template with `{timestamp}`, `{level}`, `{target}`, `{message}`, `{file}`,
    /// `{line}` and `{<context field>}` placeholders
    Custom(String),
}

impl LogFormat {
    /// Format a log entry according to this format
    pub fn format_entry(&self, entry: &LogEntry) -> String {
        match self {
            LogFormat::Json => format_json(entry),
            LogFormat::Human => format_human(entry),
            LogFormat::Logfmt => format_logfmt(entry),
            LogFormat::Custom(template) => format_custom(entry, template),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    /// `json`, `human`, `logfmt`, or any template containing a `{placeholder}`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "human" | "text" => Ok(LogFormat::Human),
            "logfmt" => Ok(LogFormat::Logfmt),
            _ if s.contains('{') => Ok(LogFormat::Custom(s.to_string())),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

fn plain_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\\\""))
}

fn format_json(entry: &LogEntry) -> String {
    let mut json = Map::new();
    json.insert("timestamp".into(), Value::String(entry.timestamp.to_rfc3339()));
    json.insert("level".into(), Value::String(entry.level.as_str().into()));
    json.insert("target".into(), Value::String(entry.target.clone()));
    json.insert("message".into(), Value::String(entry.message.clone()));

    if let Some(location) = &entry.location {
        json.insert("file".into(), Value::String(location.file.clone()));
        json.insert("line".into(), Value::from(location.line));
    }

    for (key, value) in &entry.fields {
        json.insert(key.clone(), value.clone());
    }

    serde_json::to_string(&json).unwrap_or_else(|_| entry.message.clone())
}

fn format_human(entry: &LogEntry) -> String {
    let mut line = format!(
        "{} {:5} [{}] {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        entry.level.as_str(),
        entry.target,
        entry.message
    );

    for (key, value) in &entry.fields {
        line.push_str(&format!(" {}={}", key, plain_value(value)));
    }

    line
}

fn format_logfmt(entry: &LogEntry) -> String {
    let mut parts = vec![
        format!("timestamp={}", entry.timestamp.to_rfc3339()),
        format!("level={}", entry.level.as_str()),
        format!("target={}", entry.target),
        format!("message={}", quoted(&entry.message)),
    ];

    if let Some(location) = &entry.location {
        parts.push(format!("file={}", quoted(&location.file)));
        parts.push(format!("line={}", location.line));
    }

    for (key, value) in &entry.fields {
        let rendered = match value {
            Value::Number(_) | Value::Bool(_) => value.to_string(),
            other => quoted(&plain_value(other)),
        };
        parts.push(format!("{}={}", key, rendered));
    }

    parts.join(" ")
}

fn format_custom(entry: &LogEntry, template: &str) -> String {
    let (file, line) = match &entry.location {
        Some(location) => (location.file.clone(), location.line.to_string()),
        None => (String::new(), String::new()),
    };

    let mut result = template
        .replace("{timestamp}", &entry.timestamp.to_rfc3339())
        .replace("{level}", entry.level.as_str())
        .replace("{target}", &entry.target)
        .replace("{message}", &entry.message)
        .replace("{file}", &file)
        .replace("{line}", &line);

    for (key, value) in &entry.fields {
        result = result.replace(&format!("{{{}}}", key), &plain_value(value));
    }

    result
}
