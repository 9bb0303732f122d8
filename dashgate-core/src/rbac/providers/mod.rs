//! Identity providers

pub mod remote;
pub mod static_provider;

pub use remote::{normalize_me_response, RemoteIdentityProvider, DEFAULT_ME_ENDPOINT};
pub use static_provider::StaticIdentityProvider;

use crate::rbac::roles::Role;
use crate::rbac::traits::IdentityProvider;

/// Provider configuration
#[derive(Clone, Default)]
pub enum ProviderConfig {
    /// No identity source, every resolution ends unauthenticated
    #[default]
    None,

    /// Fixed role, for development and demos
    Static { role: Role },

    /// Dashboard REST API
    Remote { base_url: String, endpoint: String, token: Option<String> },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::None => f.write_str("None"),
            ProviderConfig::Static { role } => f.debug_struct("Static").field("role", role).finish(),
            ProviderConfig::Remote { base_url, endpoint, token } => f
                .debug_struct("Remote")
                .field("base_url", base_url)
                .field("endpoint", endpoint)
                .field("token", &token.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}

impl ProviderConfig {
    /// Create a provider from configuration
    pub fn create_provider(&self) -> Option<Box<dyn IdentityProvider>> {
        match self {
            ProviderConfig::None => None,
            ProviderConfig::Static { role } => {
                Some(Box::new(StaticIdentityProvider::new(role.clone())))
            }
            ProviderConfig::Remote { base_url, endpoint, token } => {
                let mut provider =
                    RemoteIdentityProvider::new(base_url.clone()).with_endpoint(endpoint.clone());
                if let Some(token) = token {
                    provider = provider.with_token(token.clone());
                }
                Some(Box::new(provider))
            }
        }
    }
}
