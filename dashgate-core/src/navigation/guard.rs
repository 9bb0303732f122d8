//! Route Guard System - permission-based navigation gating
//!
//! Decides, for every navigation, whether the shell renders the page, keeps
//! waiting for the identity, or redirects. Rules are evaluated in order and
//! the first match wins:
//!
//! 1. identity still loading: suspend
//! 2. the sign-in page itself: render
//! 3. nobody signed in: redirect to sign-in
//! 4. public route (e.g. `/profile`): render
//! 5. unknown route: redirect to not-found
//! 6. route the user holds no permission for: redirect to not-found
//! 7. render
//!
//! Unknown and forbidden routes end on the same page so the existence of a
//! route is not disclosed.
//!
//! Example:
//! ```ignore
//! let guard = RouteGuard::new(Arc::new(RouteRegistry::dashboard()));
//! match guard.evaluate("/users-management/42", &context.snapshot()) {
//!     GuardDecision::Render => render_page(),
//!     GuardDecision::Suspend => show_spinner(),
//!     GuardDecision::Redirect(to) => navigate(&to),
//! }
//! ```

use crate::navigation::paths::NavigationPaths;
use crate::navigation::registry::RouteRegistry;
use crate::rbac::{AuthorizationState, Permission};
use std::sync::Arc;
use tokio::sync::watch;

/// Result of a route guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the requested page
    Render,
    /// Identity unresolved, show a neutral loading indicator
    Suspend,
    /// Navigate elsewhere (replacing the current history entry)
    Redirect(String),
}

impl GuardDecision {
    pub fn is_render(&self) -> bool {
        matches!(self, GuardDecision::Render)
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            GuardDecision::Redirect(to) => Some(to),
            _ => None,
        }
    }
}

/// "Go back" behaviour of the not-found page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundExit {
    /// Return to the previous page
    Back,
    /// Leave for this path instead
    Redirect(String),
}

/// Route guard bound to a registry and the navigation boundary paths
#[derive(Debug, Clone)]
pub struct RouteGuard {
    registry: Arc<RouteRegistry>,
    paths: NavigationPaths,
}

impl RouteGuard {
    /// Guard with the default boundary paths
    pub fn new(registry: Arc<RouteRegistry>) -> Self {
        Self { registry, paths: NavigationPaths::default() }
    }

    pub fn with_paths(mut self, paths: NavigationPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn paths(&self) -> &NavigationPaths {
        &self.paths
    }

    /// Decide what to do with a navigation to `pathname`
    pub fn evaluate(&self, pathname: &str, state: &AuthorizationState) -> GuardDecision {
        if state.is_loading() {
            return GuardDecision::Suspend;
        }

        if pathname == self.paths.sign_in {
            return GuardDecision::Render;
        }

        if !state.is_authenticated() {
            log::debug!("Guard: {} requires sign-in", pathname);
            return GuardDecision::Redirect(self.paths.sign_in.clone());
        }

        if self.paths.is_public(pathname) {
            return GuardDecision::Render;
        }

        let Some(route) = self.registry.match_route(pathname) else {
            log::debug!("Guard: no route for {}", pathname);
            return GuardDecision::Redirect(self.paths.not_found.clone());
        };

        if !route.required_permissions.is_empty()
            && !state.has_any_permission(&route.required_permissions)
        {
            log::debug!("Guard: access to {} denied", pathname);
            return GuardDecision::Redirect(self.paths.not_found.clone());
        }

        GuardDecision::Render
    }

    /// Behaviour of the sign-in page
    ///
    /// A signed-in user holding permissions is sent to their landing page;
    /// anyone else stays on the form.
    pub fn sign_in_landing(&self, state: &AuthorizationState) -> GuardDecision {
        if state.is_loading() {
            return GuardDecision::Suspend;
        }
        if state.is_authenticated() && !state.permissions().is_empty() {
            let landing = self.registry.first_accessible_route(state.permissions());
            return GuardDecision::Redirect(landing.to_string());
        }
        GuardDecision::Render
    }

    /// Behaviour of the not-found page's "go back" action
    pub fn not_found_exit(&self, state: &AuthorizationState) -> NotFoundExit {
        if state.is_authenticated() && !state.permissions().is_empty() {
            NotFoundExit::Back
        } else {
            NotFoundExit::Redirect(self.paths.sign_in.clone())
        }
    }

    /// Re-evaluate on every navigation and every authorization change
    pub fn watch(
        &self,
        states: watch::Receiver<AuthorizationState>,
        pathname: impl Into<String>,
    ) -> GuardWatch {
        GuardWatch { guard: self.clone(), states, pathname: pathname.into() }
    }
}

/// Guard subscribed to an authorization context
#[derive(Debug)]
pub struct GuardWatch {
    guard: RouteGuard,
    states: watch::Receiver<AuthorizationState>,
    pathname: String,
}

impl GuardWatch {
    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// Decision for the current pathname and state
    pub fn decision(&self) -> GuardDecision {
        self.guard.evaluate(&self.pathname, &self.states.borrow())
    }

    /// Navigate to `pathname`
    pub fn navigate(&mut self, pathname: impl Into<String>) -> GuardDecision {
        self.pathname = pathname.into();
        self.decision()
    }

    /// Wait for the next authorization change and re-evaluate
    ///
    /// Returns `None` once the context is gone.
    pub async fn changed(&mut self) -> Option<GuardDecision> {
        self.states.changed().await.ok()?;
        let state = self.states.borrow_and_update().clone();
        Some(self.guard.evaluate(&self.pathname, &state))
    }
}

/// Component-level gate
///
/// Shows a piece of UI (a button, a table action) iff the requirement list is
/// empty or the user holds at least one of the listed permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentGate {
    required: Vec<Permission>,
}

impl ComponentGate {
    pub fn new(required: impl IntoIterator<Item = Permission>) -> Self {
        Self { required: required.into_iter().collect() }
    }

    /// Gate on a single permission
    pub fn single(permission: impl Into<Permission>) -> Self {
        Self { required: vec![permission.into()] }
    }

    pub fn is_visible(&self, state: &AuthorizationState) -> bool {
        self.required.is_empty() || state.has_any_permission(&self.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::menu::Icon;
    use crate::navigation::registry::Route;
    use crate::rbac::catalog::{DASHBOARD, SETTINGS, USERS};
    use crate::rbac::{AuthorizationContext, PermissionSet, Role, StaticIdentityProvider};

    fn two_route_guard() -> RouteGuard {
        let registry = RouteRegistry::builder()
            .route(Route::new("Dashboard", "/", Icon::Home).requires(DASHBOARD))
            .route(Route::new("Users Management", "/users-management", Icon::Users).requires(USERS))
            .build()
            .unwrap();
        RouteGuard::new(Arc::new(registry))
    }

    fn signed_in(names: &[&'static str]) -> AuthorizationState {
        AuthorizationState::authenticated(names.iter().copied().collect(), None)
    }

    fn redirect(to: &str) -> GuardDecision {
        GuardDecision::Redirect(to.to_string())
    }

    #[test]
    fn test_loading_suspends_everywhere() {
        let guard = two_route_guard();
        let state = AuthorizationState::loading();

        for path in ["/", "/users-management", "/sign-in", "/profile", "/does-not-exist"] {
            assert_eq!(guard.evaluate(path, &state), GuardDecision::Suspend, "{}", path);
        }
    }

    #[test]
    fn test_unauthenticated_redirects_to_sign_in() {
        let guard = two_route_guard();
        let state = AuthorizationState::unauthenticated();

        assert_eq!(guard.evaluate("/users-management", &state), redirect("/sign-in"));
        assert_eq!(guard.evaluate("/profile", &state), redirect("/sign-in"));
        assert_eq!(guard.evaluate("/sign-in", &state), GuardDecision::Render);
    }

    #[test]
    fn test_missing_permission_redirects_to_not_found() {
        let guard = two_route_guard();
        assert_eq!(
            guard.evaluate("/users-management", &signed_in(&["Dashboard"])),
            redirect("/not-found")
        );
    }

    #[test]
    fn test_nested_path_renders() {
        let guard = two_route_guard();
        assert_eq!(guard.evaluate("/users-management/42", &signed_in(&["Users"])), GuardDecision::Render);
    }

    #[test]
    fn test_unknown_route_redirects_to_not_found() {
        let guard = two_route_guard();
        assert_eq!(guard.evaluate("/does-not-exist", &signed_in(&[])), redirect("/not-found"));
    }

    #[test]
    fn test_unknown_and_forbidden_look_the_same() {
        let guard = two_route_guard();
        let state = signed_in(&["Dashboard"]);
        assert_eq!(guard.evaluate("/users-management", &state), guard.evaluate("/nope", &state));
    }

    #[test]
    fn test_public_route_needs_no_permission() {
        let guard = two_route_guard();
        assert_eq!(guard.evaluate("/profile", &signed_in(&[])), GuardDecision::Render);
        assert_eq!(guard.evaluate("/profile/security", &signed_in(&[])), GuardDecision::Render);
        assert_eq!(guard.evaluate("/profiles", &signed_in(&[])), redirect("/not-found"));
    }

    #[test]
    fn test_root_matches_exactly() {
        let guard = two_route_guard();
        let state = signed_in(&["Dashboard"]);
        assert_eq!(guard.evaluate("/", &state), GuardDecision::Render);
        assert_eq!(guard.evaluate("/reports", &state), redirect("/not-found"));
    }

    #[test]
    fn test_custom_paths() {
        let paths = NavigationPaths {
            sign_in: "/login".into(),
            not_found: "/404".into(),
            root: "/".into(),
            public_routes: vec![],
        };
        let guard = two_route_guard().with_paths(paths);

        assert_eq!(guard.evaluate("/", &AuthorizationState::unauthenticated()), redirect("/login"));
        assert_eq!(guard.evaluate("/profile", &signed_in(&["Users"])), redirect("/404"));
    }

    #[test]
    fn test_fallback_landing_ends_on_not_found() {
        let guard = RouteGuard::new(Arc::new(RouteRegistry::dashboard()));
        let state = signed_in(&["Unknown"]);

        let landing = guard.sign_in_landing(&state);
        assert_eq!(landing, redirect("/"));
        assert_eq!(guard.evaluate("/", &state), redirect("/not-found"));
    }

    #[test]
    fn test_sign_in_landing() {
        let guard = RouteGuard::new(Arc::new(RouteRegistry::dashboard()));

        assert_eq!(guard.sign_in_landing(&AuthorizationState::loading()), GuardDecision::Suspend);
        assert_eq!(guard.sign_in_landing(&AuthorizationState::unauthenticated()), GuardDecision::Render);
        assert_eq!(guard.sign_in_landing(&signed_in(&[])), GuardDecision::Render);
        assert_eq!(
            guard.sign_in_landing(&signed_in(&["Settings", "Users"])),
            redirect("/users-management")
        );
    }

    #[test]
    fn test_not_found_exit() {
        let guard = RouteGuard::new(Arc::new(RouteRegistry::dashboard()));

        assert_eq!(guard.not_found_exit(&signed_in(&["Users"])), NotFoundExit::Back);
        assert_eq!(
            guard.not_found_exit(&signed_in(&[])),
            NotFoundExit::Redirect("/sign-in".into())
        );
        assert_eq!(
            guard.not_found_exit(&AuthorizationState::unauthenticated()),
            NotFoundExit::Redirect("/sign-in".into())
        );
    }

    #[test]
    fn test_component_gate() {
        let state = signed_in(&["Users"]);

        assert!(ComponentGate::default().is_visible(&state));
        assert!(ComponentGate::single(USERS).is_visible(&state));
        assert!(ComponentGate::new([SETTINGS, USERS]).is_visible(&state));
        assert!(!ComponentGate::single(SETTINGS).is_visible(&state));
        assert!(!ComponentGate::single(USERS).is_visible(&AuthorizationState::loading()));
    }

    #[tokio::test]
    async fn test_watch_follows_context() {
        let context = AuthorizationContext::new();
        let guard = two_route_guard();
        let mut watch = guard.watch(context.subscribe(), "/users-management/42");

        assert_eq!(watch.decision(), GuardDecision::Suspend);

        let provider = StaticIdentityProvider::new(Role::new("Support").with_permission(USERS));
        context.resolve_with(&provider).await.unwrap();
        assert_eq!(watch.changed().await, Some(GuardDecision::Render));

        assert_eq!(watch.navigate("/"), redirect("/not-found"));

        context.refresh_permissions(PermissionSet::from_iter([DASHBOARD])).unwrap();
        assert_eq!(watch.changed().await, Some(GuardDecision::Render));

        context.logout().unwrap();
        assert_eq!(watch.changed().await, Some(redirect("/sign-in")));
    }

    #[tokio::test]
    async fn test_watch_ends_with_context() {
        let context = AuthorizationContext::new();
        let mut watch = two_route_guard().watch(context.subscribe(), "/");
        drop(context);
        assert_eq!(watch.changed().await, None);
    }
}
