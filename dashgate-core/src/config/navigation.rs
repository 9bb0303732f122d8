//! Navigation configuration

use crate::navigation::{NavigationPaths, RegistryError, Route, RouteRegistry};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Navigation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Sign-in page
    /// Env: DG_SIGN_IN_PATH
    /// Default: "/sign-in"
    pub sign_in_path: String,

    /// Page shown for unknown and forbidden routes
    /// Env: DG_NOT_FOUND_PATH
    /// Default: "/not-found"
    pub not_found_path: String,

    /// Root page: home of the shipped dashboard routes, matched only exactly
    /// Env: DG_ROOT_PATH
    /// Default: "/"
    pub root_path: String,

    /// Pages open to any signed-in user
    /// Env: DG_PUBLIC_ROUTES (comma separated)
    /// Default: ["/profile"]
    pub public_routes: Vec<String>,

    /// Landing page when no route is accessible
    /// Env: DG_LANDING_FALLBACK
    /// Default: the root path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landing_fallback: Option<String>,

    /// Replaces the shipped dashboard routes when non-empty
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        let paths = NavigationPaths::default();
        Self {
            sign_in_path: paths.sign_in,
            not_found_path: paths.not_found,
            root_path: paths.root,
            public_routes: paths.public_routes,
            landing_fallback: None,
            routes: Vec::new(),
        }
    }
}

impl NavigationConfig {
    pub fn merge(&mut self, other: Self) {
        self.sign_in_path = other.sign_in_path;
        self.not_found_path = other.not_found_path;
        self.root_path = other.root_path;
        self.public_routes = other.public_routes;
        if other.landing_fallback.is_some() {
            self.landing_fallback = other.landing_fallback;
        }
        if !other.routes.is_empty() {
            self.routes = other.routes;
        }
    }

    pub fn apply_env_vars(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("DG_SIGN_IN_PATH") {
            self.sign_in_path = path;
        }

        if let Some(path) = var("DG_NOT_FOUND_PATH") {
            self.not_found_path = path;
        }

        if let Some(path) = var("DG_ROOT_PATH") {
            self.root_path = path;
        }

        if let Some(routes) = var("DG_PUBLIC_ROUTES") {
            self.public_routes = routes
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(path) = var("DG_LANDING_FALLBACK") {
            self.landing_fallback = Some(path);
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, path) in [
            ("sign_in_path", &self.sign_in_path),
            ("not_found_path", &self.not_found_path),
            ("root_path", &self.root_path),
        ]
        .into_iter()
        .chain(self.landing_fallback.as_ref().map(|path| ("landing_fallback", path)))
        {
            if !path.starts_with('/') {
                bail!("Invalid {}: {:?} must start with '/'", name, path);
            }
        }

        if self.sign_in_path == self.not_found_path {
            bail!("Invalid navigation: sign-in and not-found pages must differ");
        }

        if let Some(route) = self.public_routes.iter().find(|r| !r.starts_with('/')) {
            bail!("Invalid public route: {:?} must start with '/'", route);
        }

        self.registry()?;
        Ok(())
    }

    /// Boundary paths for the route guard
    pub fn paths(&self) -> NavigationPaths {
        NavigationPaths {
            sign_in: self.sign_in_path.clone(),
            not_found: self.not_found_path.clone(),
            root: self.root_path.clone(),
            public_routes: self.public_routes.clone(),
        }
    }

    /// Route registry: configured routes, or the shipped dashboard routes
    /// with their home page at the root path
    pub fn registry(&self) -> std::result::Result<RouteRegistry, RegistryError> {
        let routes = if self.routes.is_empty() {
            RouteRegistry::dashboard_routes(&self.root_path)
        } else {
            self.routes.clone()
        };
        let mut builder = RouteRegistry::builder().routes(routes).root(self.root_path.clone());
        if let Some(fallback) = &self.landing_fallback {
            builder = builder.fallback(fallback.clone());
        }
        builder.build()
    }
}
