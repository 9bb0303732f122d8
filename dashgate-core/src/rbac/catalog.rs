//! Static permission catalog and module groups
//!
//! The permission names match the backend's `permission.name` values exactly.
//! Each dashboard module is currently guarded by a single permission, but a
//! module may list several (any one of them grants visibility).

use super::permissions::{Permission, PermissionSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DASHBOARD: Permission = Permission::from_static("Dashboard");
pub const REVENUE: Permission = Permission::from_static("Revenue");
pub const ANALYSIS: Permission = Permission::from_static("Analysis");
pub const SUBSCRIPTION: Permission = Permission::from_static("Subscription");
pub const PAYMENT: Permission = Permission::from_static("Payment");
pub const USERS: Permission = Permission::from_static("Users");
pub const NOTIFICATION: Permission = Permission::from_static("Notification");
pub const FEEDBACK: Permission = Permission::from_static("Feedback");
pub const SETTINGS: Permission = Permission::from_static("Settings");

/// Catalog lookup errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A module key that is not part of the catalog
    #[error("unknown module: {0}")]
    UnknownModule(String),
}

/// Logical dashboard module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Module {
    Dashboard,
    Revenue,
    Analysis,
    Subscription,
    Payment,
    Users,
    Notification,
    Feedback,
    Settings,
}

impl Module {
    /// Every module, in catalog order
    pub const ALL: [Module; 9] = [
        Module::Dashboard,
        Module::Revenue,
        Module::Analysis,
        Module::Subscription,
        Module::Payment,
        Module::Users,
        Module::Notification,
        Module::Feedback,
        Module::Settings,
    ];

    /// Symbolic key, as used in configuration files
    pub fn key(&self) -> &'static str {
        match self {
            Module::Dashboard => "DASHBOARD",
            Module::Revenue => "REVENUE",
            Module::Analysis => "ANALYSIS",
            Module::Subscription => "SUBSCRIPTION",
            Module::Payment => "PAYMENT",
            Module::Users => "USERS",
            Module::Notification => "NOTIFICATION",
            Module::Feedback => "FEEDBACK",
            Module::Settings => "SETTINGS",
        }
    }

    /// Permissions that grant visibility of this module
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Module::Dashboard => &DASHBOARD_GROUP,
            Module::Revenue => &REVENUE_GROUP,
            Module::Analysis => &ANALYSIS_GROUP,
            Module::Subscription => &SUBSCRIPTION_GROUP,
            Module::Payment => &PAYMENT_GROUP,
            Module::Users => &USERS_GROUP,
            Module::Notification => &NOTIFICATION_GROUP,
            Module::Feedback => &FEEDBACK_GROUP,
            Module::Settings => &SETTINGS_GROUP,
        }
    }
}

// Module groups
static DASHBOARD_GROUP: [Permission; 1] = [DASHBOARD];
static REVENUE_GROUP: [Permission; 1] = [REVENUE];
static ANALYSIS_GROUP: [Permission; 1] = [ANALYSIS];
static SUBSCRIPTION_GROUP: [Permission; 1] = [SUBSCRIPTION];
static PAYMENT_GROUP: [Permission; 1] = [PAYMENT];
static USERS_GROUP: [Permission; 1] = [USERS];
static NOTIFICATION_GROUP: [Permission; 1] = [NOTIFICATION];
static FEEDBACK_GROUP: [Permission; 1] = [FEEDBACK];
static SETTINGS_GROUP: [Permission; 1] = [SETTINGS];

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Module {
    type Err = CatalogError;

    /// Case-insensitive on the symbolic key
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| CatalogError::UnknownModule(s.to_string()))
    }
}

/// Immutable view over the permission catalog
pub struct PermissionCatalog;

impl PermissionCatalog {
    /// Every catalog permission, in declaration order
    pub fn all() -> Vec<Permission> {
        Module::ALL.iter().flat_map(|m| m.permissions().iter().cloned()).collect()
    }

    /// Look up a catalog permission by its exact name
    pub fn lookup(name: &str) -> Option<Permission> {
        Self::all().into_iter().find(|p| p.as_str() == name)
    }

    /// Permissions satisfying `module`
    pub fn permissions_for_module(module: Module) -> PermissionSet {
        module.permissions().iter().cloned().collect()
    }

    /// String entry point for [`Self::permissions_for_module`]
    pub fn permissions_for_module_key(key: &str) -> Result<PermissionSet, CatalogError> {
        let module: Module = key.parse()?;
        Ok(Self::permissions_for_module(module))
    }
}

/// Check if `granted` may view `module`
pub fn can_view_module(granted: &PermissionSet, module: Module) -> bool {
    granted.intersects(module.permissions())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_one_to_one() {
        for module in Module::ALL {
            assert_eq!(module.permissions().len(), 1, "{module} should map to one permission");
        }
        assert_eq!(PermissionCatalog::all().len(), 9);
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let all = PermissionCatalog::all();
        let unique: PermissionSet = all.iter().cloned().collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn test_permissions_for_module() {
        let users = PermissionCatalog::permissions_for_module(Module::Users);
        assert!(users.contains_name("Users"));
        assert_eq!(users.len(), 1);

        let settings = PermissionCatalog::permissions_for_module_key("settings").unwrap();
        assert!(settings.contains(&SETTINGS));
    }

    #[test]
    fn test_unknown_module_is_an_error() {
        let err = PermissionCatalog::permissions_for_module_key("KIDS").unwrap_err();
        assert_eq!(err, CatalogError::UnknownModule("KIDS".to_string()));
        assert_eq!(err.to_string(), "unknown module: KIDS");
    }

    #[test]
    fn test_can_view_module() {
        let granted: PermissionSet = ["Feedback"].into_iter().collect();
        assert!(can_view_module(&granted, Module::Feedback));
        assert!(!can_view_module(&granted, Module::Revenue));
        assert!(!can_view_module(&PermissionSet::new(), Module::Dashboard));
    }

    #[test]
    fn test_lookup() {
        assert_eq!(PermissionCatalog::lookup("Payment"), Some(PAYMENT));
        assert_eq!(PermissionCatalog::lookup("payment"), None);
    }
}
