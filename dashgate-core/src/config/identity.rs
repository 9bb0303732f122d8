//! Identity provider configuration

use crate::rbac::providers::{ProviderConfig, DEFAULT_ME_ENDPOINT};
use crate::rbac::DEFAULT_RESOLUTION_TIMEOUT;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identity configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Dashboard API base URL (unset = no remote identity)
    /// Env: DG_API_BASE_URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// "Get me" endpoint, relative to the base URL
    /// Env: DG_ME_ENDPOINT
    /// Default: "/settings/user/get-me"
    pub me_endpoint: String,

    /// Bound on one identity resolution, in seconds
    /// Env: DG_IDENTITY_TIMEOUT
    /// Default: 15
    pub timeout_secs: u64,

    /// Bearer token of the session (normally only set through the environment)
    /// Env: DG_API_TOKEN
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("api_base_url", &self.api_base_url)
            .field("me_endpoint", &self.me_endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            me_endpoint: DEFAULT_ME_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_RESOLUTION_TIMEOUT.as_secs(),
            token: None,
        }
    }
}

impl IdentityConfig {
    pub fn merge(&mut self, other: Self) {
        if other.api_base_url.is_some() {
            self.api_base_url = other.api_base_url;
        }
        self.me_endpoint = other.me_endpoint;
        self.timeout_secs = other.timeout_secs;
        if other.token.is_some() {
            self.token = other.token;
        }
    }

    pub fn apply_env_vars(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("DG_API_BASE_URL") {
            self.api_base_url = Some(url);
        }

        if let Some(endpoint) = var("DG_ME_ENDPOINT") {
            self.me_endpoint = endpoint;
        }

        if let Some(timeout) = var("DG_IDENTITY_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }

        if let Some(token) = var("DG_API_TOKEN") {
            self.token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            bail!("Invalid timeout_secs: must be greater than 0");
        }

        if !self.me_endpoint.starts_with('/') {
            bail!("Invalid me_endpoint: {:?} must start with '/'", self.me_endpoint);
        }

        if let Some(url) = &self.api_base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("Invalid api_base_url: {:?} must be an http(s) URL", url);
            }
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Provider described by this section
    pub fn provider_config(&self) -> ProviderConfig {
        match &self.api_base_url {
            Some(base_url) => ProviderConfig::Remote {
                base_url: base_url.clone(),
                endpoint: self.me_endpoint.clone(),
                token: self.token.clone(),
            },
            None => ProviderConfig::None,
        }
    }
}
