//! Route registry
//!
//! Ordered, immutable list of the dashboard's top-level destinations. The
//! order matters: it is the menu order and decides the landing page of a
//! freshly signed-in user.

use crate::navigation::menu::Icon;
use crate::navigation::paths::{matches_under_root, ROOT_PATH};
use crate::rbac::catalog::{
    ANALYSIS, DASHBOARD, FEEDBACK, NOTIFICATION, PAYMENT, REVENUE, SETTINGS, SUBSCRIPTION, USERS,
};
use crate::rbac::{Permission, PermissionSet, RequiresPermissions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Registry construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("route registry must contain at least one route")]
    Empty,

    #[error("route path must start with '/': {0:?}")]
    InvalidPath(String),

    #[error("duplicate route path: {0}")]
    DuplicatePath(String),

    #[error("route {0} does not require any permission")]
    NoPermissions(String),

    #[error("route {child} is shadowed by route {parent}")]
    OverlappingPaths { parent: String, child: String },
}

/// One navigable destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Display name
    pub name: String,

    /// Path pattern (root matches exactly, others by segment prefix)
    pub path: String,

    /// Any one of these grants access
    #[serde(rename = "permissions")]
    pub required_permissions: Vec<Permission>,

    /// Menu icon
    pub icon: Icon,
}

impl Route {
    pub fn new(name: impl Into<String>, path: impl Into<String>, icon: Icon) -> Self {
        Self { name: name.into(), path: path.into(), required_permissions: Vec::new(), icon }
    }

    /// Add an accepted permission
    pub fn requires(mut self, permission: impl Into<Permission>) -> Self {
        self.required_permissions.push(permission.into());
        self
    }

    /// Whether `granted` opens this route
    pub fn is_accessible(&self, granted: &PermissionSet) -> bool {
        granted.intersects(&self.required_permissions)
    }

    /// Whether `pathname` falls under this route, for a dashboard mounted at `root`
    pub fn matches(&self, root: &str, pathname: &str) -> bool {
        matches_under_root(root, &self.path, pathname)
    }
}

impl RequiresPermissions for Route {
    fn required_permissions(&self) -> &[Permission] {
        &self.required_permissions
    }
}

/// Ordered route registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRegistry {
    routes: Vec<Route>,

    /// Path matched only exactly
    root: String,

    /// Landing path when no route is accessible
    fallback: String,
}

impl RouteRegistry {
    /// Start building a registry
    pub fn builder() -> RouteRegistryBuilder {
        RouteRegistryBuilder::default()
    }

    /// The shipped dashboard registry
    pub fn dashboard() -> Self {
        Self {
            routes: Self::dashboard_routes(ROOT_PATH),
            root: ROOT_PATH.to_string(),
            fallback: ROOT_PATH.to_string(),
        }
    }

    /// The shipped dashboard routes, with the Dashboard home page at `root`
    pub fn dashboard_routes(root: &str) -> Vec<Route> {
        let mut routes = shipped_routes();
        routes[0].path = root.to_string();
        routes
    }

    /// Replace the landing fallback
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Path of the first route `granted` opens, or the fallback
    pub fn first_accessible_route(&self, granted: &PermissionSet) -> &str {
        self.routes
            .iter()
            .find(|route| route.is_accessible(granted))
            .map_or(self.fallback.as_str(), |route| route.path.as_str())
    }

    /// Every route `granted` opens, in registry order
    pub fn accessible_routes(&self, granted: &PermissionSet) -> Vec<&Route> {
        self.routes.iter().filter(|route| route.is_accessible(granted)).collect()
    }

    /// Route owning `pathname`, first match in registry order
    pub fn match_route(&self, pathname: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(&self.root, pathname))
    }
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::dashboard()
    }
}

/// Validating registry builder
#[derive(Debug, Default)]
pub struct RouteRegistryBuilder {
    routes: Vec<Route>,
    root: Option<String>,
    fallback: Option<String>,
}

impl RouteRegistryBuilder {
    /// Append a route
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Append several routes
    pub fn routes(mut self, routes: impl IntoIterator<Item = Route>) -> Self {
        self.routes.extend(routes);
        self
    }

    /// Path matched only exactly (defaults to "/")
    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Landing path when no route is accessible (defaults to the root)
    pub fn fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<RouteRegistry, RegistryError> {
        if self.routes.is_empty() {
            return Err(RegistryError::Empty);
        }

        let root = self.root.unwrap_or_else(|| ROOT_PATH.to_string());
        if !root.starts_with('/') {
            return Err(RegistryError::InvalidPath(root));
        }

        for (i, route) in self.routes.iter().enumerate() {
            if !route.path.starts_with('/') {
                return Err(RegistryError::InvalidPath(route.path.clone()));
            }
            if route.required_permissions.is_empty() {
                return Err(RegistryError::NoPermissions(route.path.clone()));
            }

            for other in &self.routes[..i] {
                if other.path == route.path {
                    return Err(RegistryError::DuplicatePath(route.path.clone()));
                }
                if let Some((parent, child)) = shadowing(&root, other, route) {
                    return Err(RegistryError::OverlappingPaths {
                        parent: parent.to_string(),
                        child: child.to_string(),
                    });
                }
            }
        }

        let fallback = self.fallback.unwrap_or_else(|| root.clone());
        if !fallback.starts_with('/') {
            return Err(RegistryError::InvalidPath(fallback));
        }

        Ok(RouteRegistry { routes: self.routes, root, fallback })
    }
}

fn shadowing<'a>(root: &str, a: &'a Route, b: &'a Route) -> Option<(&'a str, &'a str)> {
    if a.path != root && matches_under_root(root, &a.path, &b.path) {
        Some((&a.path, &b.path))
    } else if b.path != root && matches_under_root(root, &b.path, &a.path) {
        Some((&b.path, &a.path))
    } else {
        None
    }
}

fn shipped_routes() -> Vec<Route> {
    vec![
        Route::new("Dashboard", "/", Icon::Home).requires(DASHBOARD),
        Route::new("Revenues", "/revenues", Icon::Revenues).requires(REVENUE),
        Route::new("Analysis", "/analysis", Icon::Analysis).requires(ANALYSIS),
        Route::new("Subscriptions Management", "/subscriptions", Icon::Subscriptions)
            .requires(SUBSCRIPTION),
        Route::new("Payment Methods", "/payment", Icon::Payment).requires(PAYMENT),
        Route::new("Users Management", "/users-management", Icon::Users).requires(USERS),
        Route::new("Notifications", "/notifications", Icon::Notifications).requires(NOTIFICATION),
        Route::new("Feedback", "/feedback", Icon::Feedback).requires(FEEDBACK),
        Route::new("Settings", "/settings", Icon::Settings).requires(SETTINGS),
    ]
}
