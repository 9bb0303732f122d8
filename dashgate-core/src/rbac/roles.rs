//! Dashboard roles
//!
//! A role is a named bundle of permissions. Roles are managed by the backend;
//! the client only ever sees the resolved role of the signed-in user.

use crate::rbac::permissions::{Permission, PermissionSet};
use serde::{Deserialize, Serialize};

/// Role definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role name
    pub name: String,

    /// Permissions granted by this role
    #[serde(default)]
    pub permissions: PermissionSet,
}

impl Role {
    /// Create a new role without permissions
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), permissions: PermissionSet::new() }
    }

    /// Add a permission
    pub fn with_permission(mut self, permission: impl Into<Permission>) -> Self {
        self.permissions.insert(permission);
        self
    }

    /// Add several permissions
    pub fn with_permissions<I, P>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        for permission in permissions {
            self.permissions.insert(permission);
        }
        self
    }

    /// Check if role has a permission
    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }
}
