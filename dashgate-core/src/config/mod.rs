//! Configuration system for Dashgate
//!
//! Configuration values are resolved in the following order (highest priority wins):
//!
//! 1. **Code** (Builder pattern) - Highest priority
//! 2. **Environment Variables** (`DG_*`) - Override file config
//! 3. **Config File** (dashgate.toml) - Override defaults
//! 4. **Defaults** - Lowest priority
//!
//! # Example
//!
//! ```no_run
//! use dashgate_core::config::DashgateConfig;
//!
//! let config = DashgateConfig::load()?;
//! let registry = config.navigation.registry()?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ```toml
//! [navigation]
//! sign_in_path = "/sign-in"
//! public_routes = ["/profile"]
//!
//! [[navigation.routes]]
//! name = "Dashboard"
//! path = "/"
//! permissions = ["Dashboard"]
//! icon = "Home"
//!
//! [identity]
//! api_base_url = "https://api.example.com/api/v1"
//! timeout_secs = 15
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

pub mod identity;
pub mod logging;
pub mod navigation;

pub use identity::IdentityConfig;
pub use logging::LoggingConfig;
pub use navigation::NavigationConfig;

use crate::navigation::{RouteGuard, RouteRegistry};
use crate::rbac::AuthorizationContext;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "dashgate.toml";

/// Complete Dashgate configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashgateConfig {
    pub navigation: NavigationConfig,
    pub identity: IdentityConfig,
    pub logging: LoggingConfig,
}

impl DashgateConfig {
    /// Load configuration with full supersedence chain from `dashgate.toml`
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file (skipped when missing)
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.merge(file_config);
        }

        config.apply_env_vars();

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.navigation.merge(other.navigation);
        self.identity.merge(other.identity);
        self.logging.merge(other.logging);
    }

    /// Apply environment variables to configuration
    pub fn apply_env_vars(&mut self) {
        self.navigation.apply_env_vars();
        self.identity.apply_env_vars();
        self.logging.apply_env_vars();
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.navigation.validate().context("Invalid [navigation] section")?;
        self.identity.validate().context("Invalid [identity] section")?;
        self.logging.validate().context("Invalid [logging] section")?;
        Ok(())
    }

    /// Route registry described by the navigation section
    pub fn build_registry(&self) -> Result<Arc<RouteRegistry>> {
        let registry = self.navigation.registry().context("Invalid route registry")?;
        Ok(Arc::new(registry))
    }

    /// Route guard over the configured registry and boundary paths
    pub fn build_guard(&self) -> Result<RouteGuard> {
        Ok(RouteGuard::new(self.build_registry()?).with_paths(self.navigation.paths()))
    }

    /// Fresh authorization context using the configured resolution timeout
    pub fn build_context(&self) -> AuthorizationContext {
        AuthorizationContext::new().with_timeout(self.identity.timeout())
    }
}
