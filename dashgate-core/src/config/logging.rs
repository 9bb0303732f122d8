//! Logging configuration

use crate::logging::{LogFormat, LogLevel, LogOutput};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Env: DG_LOG_LEVEL
    /// Default: "info"
    pub level: String,

    /// "human", "json", "logfmt" or a template
    /// Env: DG_LOG_FORMAT
    /// Default: "human"
    pub format: String,

    pub file_enabled: bool,
    pub file_path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "human".to_string(),
            file_enabled: false,
            file_path: "./logs/dashgate.log".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(level) = var("DG_LOG_LEVEL") {
            self.level = level;
        }
        if let Some(format) = var("DG_LOG_FORMAT") {
            self.format = format;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.to_logging_config().map(|_| ())
    }

    /// Logger description for [`crate::logging::init_logging`], writing to `output`
    pub fn to_logging_config_with(
        &self,
        output: LogOutput,
    ) -> Result<crate::logging::LoggingConfig> {
        let level: LogLevel = self.level.parse().map_err(|e: String| anyhow!(e))?;
        let format: LogFormat = self.format.parse().map_err(|e: String| anyhow!(e))?;

        let mut config = crate::logging::LoggingConfig {
            level,
            outputs: vec![output],
            format,
            context_fields: Default::default(),
        };
        if self.file_enabled {
            config = config.with_file_output(&self.file_path);
        }
        Ok(config)
    }

    /// Logger description writing to stdout
    pub fn to_logging_config(&self) -> Result<crate::logging::LoggingConfig> {
        self.to_logging_config_with(LogOutput::Stdout { format: None })
    }
}
