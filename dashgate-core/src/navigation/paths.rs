//! Navigation boundary paths and the path matching rule

use serde::{Deserialize, Serialize};

/// Default sign-in page
pub const DEFAULT_SIGN_IN_PATH: &str = "/sign-in";

/// Default not-found page
pub const DEFAULT_NOT_FOUND_PATH: &str = "/not-found";

/// Default root path; the root is only ever matched exactly
pub const ROOT_PATH: &str = "/";

/// Fixed paths the guard redirects to, plus the public allow-list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationPaths {
    pub sign_in: String,
    pub not_found: String,
    pub root: String,

    /// Pages any authenticated user may open without a permission check
    pub public_routes: Vec<String>,
}

impl Default for NavigationPaths {
    fn default() -> Self {
        Self {
            sign_in: DEFAULT_SIGN_IN_PATH.to_string(),
            not_found: DEFAULT_NOT_FOUND_PATH.to_string(),
            root: ROOT_PATH.to_string(),
            public_routes: vec!["/profile".to_string()],
        }
    }
}

impl NavigationPaths {
    /// Whether `pathname` falls under one of the public routes
    pub fn is_public(&self, pathname: &str) -> bool {
        self.public_routes.iter().any(|route| matches_under_root(&self.root, route, pathname))
    }
}

/// Segment-prefix match of `pathname` against a route `path`
///
/// The root path matches only itself. Any other path matches when `pathname`
/// equals it or continues with a `/`, so `/users` never matches `/users-management`.
pub fn matches_segment_prefix(path: &str, pathname: &str) -> bool {
    matches_under_root(ROOT_PATH, path, pathname)
}

/// [`matches_segment_prefix`] for a dashboard mounted at `root`
pub fn matches_under_root(root: &str, path: &str, pathname: &str) -> bool {
    if path == root {
        return pathname == root;
    }
    match pathname.strip_prefix(path) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_matches_exactly() {
        assert!(matches_segment_prefix("/", "/"));
        assert!(!matches_segment_prefix("/", "/users-management"));
        assert!(!matches_segment_prefix("/", ""));
    }

    #[test]
    fn test_segment_prefix() {
        assert!(matches_segment_prefix("/users-management", "/users-management"));
        assert!(matches_segment_prefix("/users-management", "/users-management/42"));
        assert!(matches_segment_prefix("/users-management", "/users-management/42/edit"));
        assert!(!matches_segment_prefix("/users-management", "/users-managementx"));
        assert!(!matches_segment_prefix("/users", "/users-management"));
        assert!(!matches_segment_prefix("/settings", "/"));
    }

    #[test]
    fn test_public_routes() {
        let paths = NavigationPaths::default();
        assert!(paths.is_public("/profile"));
        assert!(paths.is_public("/profile/edit"));
        assert!(!paths.is_public("/profiles"));
        assert!(!paths.is_public("/settings"));
    }

    #[test]
    fn test_custom_root_matches_exactly() {
        assert!(matches_under_root("/home", "/home", "/home"));
        assert!(!matches_under_root("/home", "/home", "/home/42"));
        assert!(matches_under_root("/home", "/settings", "/settings/users"));
        assert!(!matches_under_root("/home", "/", "/settings"));
    }
}
