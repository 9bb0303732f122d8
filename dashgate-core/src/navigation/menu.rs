//! Menu deriver
//!
//! The navigation menu is a filtered projection of the route registry: only
//! the routes the current permissions open, in registry order.

use crate::navigation::paths::{matches_under_root, ROOT_PATH};
use crate::navigation::registry::RouteRegistry;
use crate::rbac::{AuthorizationState, PermissionSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Menu icon identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Icon {
    Home,
    Revenues,
    Analysis,
    Subscriptions,
    Payment,
    Users,
    Notifications,
    Feedback,
    Settings,
}

impl Icon {
    pub const ALL: [Icon; 9] = [
        Icon::Home,
        Icon::Revenues,
        Icon::Analysis,
        Icon::Subscriptions,
        Icon::Payment,
        Icon::Users,
        Icon::Notifications,
        Icon::Feedback,
        Icon::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Icon::Home => "Home",
            Icon::Revenues => "Revenues",
            Icon::Analysis => "Analysis",
            Icon::Subscriptions => "Subscriptions",
            Icon::Payment => "Payment",
            Icon::Users => "Users",
            Icon::Notifications => "Notifications",
            Icon::Feedback => "Feedback",
            Icon::Settings => "Settings",
        }
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Icon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Icon::ALL
            .into_iter()
            .find(|icon| icon.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown icon: {}", s))
    }
}

/// One entry of the navigation menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub path: String,
    pub icon: Icon,
}

impl MenuItem {
    /// Whether this entry should be highlighted for `pathname`
    pub fn is_active(&self, pathname: &str) -> bool {
        self.is_active_under(ROOT_PATH, pathname)
    }

    /// [`Self::is_active`] for a dashboard mounted at `root`
    pub fn is_active_under(&self, root: &str, pathname: &str) -> bool {
        matches_under_root(root, &self.path, pathname)
    }
}

/// Derive the menu for `granted`
pub fn derive_menu(registry: &RouteRegistry, granted: &PermissionSet) -> Vec<MenuItem> {
    registry
        .accessible_routes(granted)
        .into_iter()
        .map(|route| MenuItem { name: route.name.clone(), path: route.path.clone(), icon: route.icon })
        .collect()
}

/// Menu that only recomputes when the permission set changes
#[derive(Debug)]
pub struct Menu {
    registry: Arc<RouteRegistry>,
    granted: Option<PermissionSet>,
    items: Vec<MenuItem>,
    recomputations: usize,
}

impl Menu {
    pub fn new(registry: Arc<RouteRegistry>) -> Self {
        Self { registry, granted: None, items: Vec::new(), recomputations: 0 }
    }

    /// Menu items for `granted`
    pub fn items(&mut self, granted: &PermissionSet) -> &[MenuItem] {
        if self.granted.as_ref() != Some(granted) {
            self.items = derive_menu(&self.registry, granted);
            self.granted = Some(granted.clone());
            self.recomputations += 1;
            log::debug!("Menu recomputed: {} entries", self.items.len());
        }
        &self.items
    }

    /// Menu items for an authorization snapshot (empty unless authenticated)
    pub fn items_for(&mut self, state: &AuthorizationState) -> &[MenuItem] {
        self.items(state.permissions())
    }

    /// Entry to highlight for `pathname`, from the last derived items
    pub fn active_item(&self, pathname: &str) -> Option<&MenuItem> {
        let root = self.registry.root();
        self.items.iter().find(|item| item.is_active_under(root, pathname))
    }

    /// Number of times the items were derived
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&'static str]) -> PermissionSet {
        names.iter().copied().collect()
    }

    #[test]
    fn test_menu_for_dashboard_and_users() {
        let registry = RouteRegistry::dashboard();
        let menu = derive_menu(&registry, &set(&["Users", "Dashboard"]));

        assert_eq!(
            menu,
            vec![
                MenuItem { name: "Dashboard".into(), path: "/".into(), icon: Icon::Home },
                MenuItem {
                    name: "Users Management".into(),
                    path: "/users-management".into(),
                    icon: Icon::Users
                },
            ]
        );
    }

    #[test]
    fn test_menu_empty_without_permissions() {
        let registry = RouteRegistry::dashboard();
        assert!(derive_menu(&registry, &PermissionSet::new()).is_empty());
        assert!(derive_menu(&registry, &set(&["Unknown"])).is_empty());
    }

    #[test]
    fn test_menu_does_not_touch_registry() {
        let registry = RouteRegistry::dashboard();
        let before = registry.clone();
        let _ = derive_menu(&registry, &set(&["Settings"]));
        assert_eq!(registry, before);
    }

    #[test]
    fn test_is_active() {
        let home = MenuItem { name: "Dashboard".into(), path: "/".into(), icon: Icon::Home };
        let users = MenuItem {
            name: "Users Management".into(),
            path: "/users-management".into(),
            icon: Icon::Users,
        };

        assert!(home.is_active("/"));
        assert!(!home.is_active("/users-management"));
        assert!(users.is_active("/users-management"));
        assert!(users.is_active("/users-management/kids/7"));
        assert!(!users.is_active("/users-managementx"));

        let home = MenuItem { path: "/home".into(), ..home };
        assert!(home.is_active_under("/home", "/home"));
        assert!(!home.is_active_under("/home", "/home/7"));
    }

    #[test]
    fn test_menu_cache() {
        let mut menu = Menu::new(Arc::new(RouteRegistry::dashboard()));
        let granted = set(&["Dashboard", "Settings"]);

        assert_eq!(menu.items(&granted).len(), 2);
        assert_eq!(menu.items(&granted.clone()).len(), 2);
        assert_eq!(menu.recomputations(), 1);

        assert_eq!(menu.items(&set(&["Feedback"])).len(), 1);
        assert_eq!(menu.recomputations(), 2);
        assert_eq!(menu.active_item("/feedback/12").unwrap().name, "Feedback");
        assert!(menu.active_item("/").is_none());
    }

    #[test]
    fn test_menu_for_unauthenticated_state() {
        let mut menu = Menu::new(Arc::new(RouteRegistry::dashboard()));
        assert!(menu.items_for(&AuthorizationState::unauthenticated()).is_empty());
        assert!(menu.items_for(&AuthorizationState::loading()).is_empty());
    }

    #[test]
    fn test_icon_parse() {
        assert_eq!("users".parse::<Icon>(), Ok(Icon::Users));
        assert_eq!("Home".parse::<Icon>(), Ok(Icon::Home));
        assert!("Rocket".parse::<Icon>().is_err());
    }
}
