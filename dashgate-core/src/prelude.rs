//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use dashgate_core::prelude::*;
//! ```

// === Configuration ===
pub use crate::config::DashgateConfig;
pub use crate::logging::{init_logging, LoggingConfig};

// === Permissions and session state ===
pub use crate::rbac::catalog::{
    ANALYSIS, DASHBOARD, FEEDBACK, NOTIFICATION, PAYMENT, REVENUE, SETTINGS, SUBSCRIPTION, USERS,
};
pub use crate::rbac::{
    AuthStatus, AuthorizationContext, AuthorizationState, IdentityProvider, Module, Permission,
    PermissionCatalog, PermissionSet, Role,
};

// === Navigation ===
pub use crate::navigation::{
    derive_menu, ComponentGate, GuardDecision, Icon, Menu, MenuItem, NavigationPaths, Route,
    RouteGuard, RouteRegistry,
};

// === Errors ===
pub use crate::{Error, Result};
