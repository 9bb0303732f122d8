//! Permission identifiers and permission sets

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

/// Opaque capability identifier (e.g. `"Users"`, `"Settings"`).
///
/// Permissions are flat and compared by exact string equality. They are named
/// exactly as the backend returns them in a role's permission list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    /// Permission from a static catalog literal
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Permission from any string
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&'static str> for Permission {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for Permission {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Unordered, membership-only set of permissions
///
/// Backed by a `BTreeSet` so that debug output and iteration are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, permission: impl Into<Permission>) -> bool {
        self.0.insert(permission.into())
    }

    pub fn contains(&self, permission: &Permission) -> bool {
        self.0.contains(permission)
    }

    /// Membership test by raw name
    pub fn contains_name(&self, name: &str) -> bool {
        self.0.iter().any(|p| p.as_str() == name)
    }

    /// True when at least one of `required` is held (OR semantics)
    pub fn intersects<'a, I>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = &'a Permission>,
    {
        required.into_iter().any(|p| self.contains(p))
    }

    /// True when every one of `required` is held (AND semantics)
    pub fn contains_all<'a, I>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = &'a Permission>,
    {
        required.into_iter().all(|p| self.contains(p))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        Self(iter.into_iter().map(|s| Permission::new(s.to_string())).collect())
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a Permission;
    type IntoIter = std::collections::btree_set::Iter<'a, Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Anything gated by an OR-list of permissions (menu entries, buttons, table actions)
pub trait RequiresPermissions {
    fn required_permissions(&self) -> &[Permission];
}

/// Check if `granted` holds ANY of `required`
pub fn has_any_permission(granted: &PermissionSet, required: &[Permission]) -> bool {
    granted.intersects(required)
}

/// Check if `granted` holds ALL of `required`
pub fn has_all_permissions(granted: &PermissionSet, required: &[Permission]) -> bool {
    granted.contains_all(required)
}

/// Permissions from `required` that `granted` is missing, in `required` order
pub fn missing_permissions(granted: &PermissionSet, required: &[Permission]) -> Vec<Permission> {
    required.iter().filter(|p| !granted.contains(p)).cloned().collect()
}

/// Keep the items the holder of `granted` may see.
///
/// Items without any requirement are always kept.
pub fn filter_by_permissions<T: RequiresPermissions>(items: Vec<T>, granted: &PermissionSet) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| {
            let required = item.required_permissions();
            required.is_empty() || granted.intersects(required)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&'static str]) -> PermissionSet {
        names.iter().copied().collect()
    }

    #[test]
    fn test_exact_string_equality() {
        let granted = set(&["Users"]);
        assert!(granted.contains(&Permission::from_static("Users")));
        assert!(!granted.contains(&Permission::from_static("users")));
        assert!(!granted.contains(&Permission::from_static("User")));
        assert!(granted.contains_name("Users"));
    }

    #[test]
    fn test_any_and_all() {
        let granted = set(&["Dashboard", "Users"]);
        let required = vec![Permission::from("Users"), Permission::from("Settings")];

        assert!(has_any_permission(&granted, &required));
        assert!(!has_all_permissions(&granted, &required));
        assert_eq!(missing_permissions(&granted, &required), vec![Permission::from("Settings")]);

        // Vacuous cases
        assert!(!has_any_permission(&granted, &[]));
        assert!(has_all_permissions(&granted, &[]));
    }

    #[test]
    fn test_filter_by_permissions() {
        struct Action(&'static str, Vec<Permission>);
        impl RequiresPermissions for Action {
            fn required_permissions(&self) -> &[Permission] {
                &self.1
            }
        }

        let items = vec![
            Action("export", vec![]),
            Action("delete-user", vec![Permission::from("Users")]),
            Action("edit-role", vec![Permission::from("Settings")]),
        ];

        let visible = filter_by_permissions(items, &set(&["Users"]));
        let names: Vec<_> = visible.iter().map(|a| a.0).collect();
        assert_eq!(names, vec!["export", "delete-user"]);
    }

    #[test]
    fn test_serde_transparent() {
        let granted = set(&["Users", "Dashboard"]);
        let json = serde_json::to_string(&granted).unwrap();
        assert_eq!(json, r#"["Dashboard","Users"]"#);

        let back: PermissionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, granted);
    }
}
