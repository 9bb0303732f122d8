//! Dashgate - Core
//!
//! Authorization and navigation core for permission-gated admin dashboards.
//!
//! # Overview
//!
//! A dashboard user signs in, the backend tells us which permissions their
//! role grants, and from then on every navigation and every menu render is a
//! pure function of that permission set. Dashgate owns that model:
//!
//! - [`rbac`] - permission catalog, roles, the session-scoped
//!   [`AuthorizationContext`](rbac::AuthorizationContext) and identity providers
//! - [`navigation`] - route registry, route guard and menu derivation
//! - [`config`] - TOML + environment configuration
//! - [`logging`] - declarative logger on the `log` facade
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dashgate_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DashgateConfig::load()?;
//!     let guard = config.build_guard()?;
//!     let context = config.build_context();
//!
//!     if let Some(provider) = config.identity.provider_config().create_provider() {
//!         context.resolve_with(provider.as_ref()).await?;
//!     }
//!
//!     let state = context.snapshot();
//!     let menu = derive_menu(guard.registry(), state.permissions());
//!     match guard.evaluate("/users-management", &state) {
//!         GuardDecision::Render => println!("{} menu entries", menu.len()),
//!         GuardDecision::Suspend => println!("loading"),
//!         GuardDecision::Redirect(to) => println!("redirect to {}", to),
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod logging;
pub mod navigation;
pub mod rbac;

// Prelude module for convenient imports
pub mod prelude;

use thiserror::Error;

pub use config::DashgateConfig;
pub use navigation::{derive_menu, GuardDecision, MenuItem, Route, RouteGuard, RouteRegistry};
pub use rbac::{AuthorizationContext, AuthorizationState, Permission, PermissionSet};

/// Main result type for the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Dashgate
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] rbac::CatalogError),

    #[error(transparent)]
    Registry(#[from] navigation::RegistryError),

    #[error(transparent)]
    Auth(#[from] rbac::AuthError),

    #[error(transparent)]
    Identity(#[from] rbac::IdentityError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Config(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::Module;

    fn module(key: &str) -> Result<Module> {
        Ok(key.parse::<Module>()?)
    }

    #[test]
    fn test_error_conversion() {
        assert_eq!(module("settings").unwrap(), Module::Settings);

        let err = module("Billing").unwrap_err();
        assert!(matches!(err, Error::Catalog(_)));
        assert!(err.to_string().contains("Billing"));
    }

    #[test]
    fn test_config_error_keeps_context() {
        let err: Error = anyhow::anyhow!("bad value").context("Invalid [identity] section").into();
        assert_eq!(err.to_string(), "configuration error: Invalid [identity] section: bad value");
    }
}
