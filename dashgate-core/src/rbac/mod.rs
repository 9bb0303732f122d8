//! Dashgate RBAC module
//!
//! Permission model and session authorization state for the dashboard.
//!
//! # Features
//! - Fixed permission catalog with module groupings
//! - Role definitions (named permission bundles)
//! - Session-scoped [`AuthorizationContext`] state machine with epoch tickets
//! - Pluggable identity providers (REST endpoint, static role)
//!
//! # Example
//! ```rust,ignore
//! let context = AuthorizationContext::new();
//! let provider = StaticIdentityProvider::new(Role::new("Support").with_permission(USERS));
//!
//! context.resolve_with(&provider).await?;
//! assert!(context.has_permission(&USERS));
//! ```

pub mod catalog;
mod context;
mod permissions;
pub mod providers;
mod roles;
mod traits;

// Public exports
pub use catalog::{can_view_module, CatalogError, Module, PermissionCatalog};
pub use context::{
    AuthError, AuthEvent, AuthStatus, AuthorizationContext, AuthorizationState, Completion,
    ResolutionTicket, DEFAULT_RESOLUTION_TIMEOUT,
};
pub use permissions::{
    filter_by_permissions, has_all_permissions, has_any_permission, missing_permissions,
    Permission, PermissionSet, RequiresPermissions,
};
pub use providers::{ProviderConfig, RemoteIdentityProvider, StaticIdentityProvider};
pub use roles::Role;
pub use traits::{IdentityError, IdentityProvider, ResolvedIdentity, UserProfile};
