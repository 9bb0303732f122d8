use async_trait::async_trait;
use cucumber::World as CucumberWorld;
use dashgate_core::navigation::{GuardDecision, Icon, MenuItem, Route, RouteGuard, RouteRegistry};
use dashgate_core::rbac::catalog::{DASHBOARD, USERS};
use dashgate_core::rbac::{
    AuthError, AuthorizationContext, Completion, IdentityError, IdentityProvider, Permission,
    PermissionSet, ResolvedIdentity,
};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Identity provider that blocks until released, to interleave a
/// resolution with other session events
#[derive(Debug)]
pub struct GatedProvider {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
    pub identity: Result<ResolvedIdentity, IdentityError>,
}

#[async_trait]
impl IdentityProvider for GatedProvider {
    async fn resolve_identity(&self) -> Result<ResolvedIdentity, IdentityError> {
        self.started.notify_one();
        self.release.notified().await;
        self.identity.clone()
    }

    fn name(&self) -> &str {
        "gated"
    }
}

#[derive(Debug, CucumberWorld)]
#[world(init = Self::new)]
pub struct DashgateWorld {
    pub registry: Arc<RouteRegistry>,
    pub guard: RouteGuard,
    pub context: Arc<AuthorizationContext>,
    pub decision: Option<GuardDecision>,
    pub menu: Vec<MenuItem>,
    pub granted: PermissionSet,
    pub release: Arc<Notify>,
    pub pending: Option<JoinHandle<Result<Completion, AuthError>>>,
    pub completion: Option<Result<Completion, AuthError>>,
    pub last_error: Option<AuthError>,
}

impl DashgateWorld {
    pub fn new() -> Self {
        let registry = Arc::new(RouteRegistry::dashboard());
        Self {
            guard: RouteGuard::new(registry.clone()),
            registry,
            context: Arc::new(AuthorizationContext::new()),
            decision: None,
            menu: Vec::new(),
            granted: PermissionSet::new(),
            release: Arc::new(Notify::new()),
            pending: None,
            completion: None,
            last_error: None,
        }
    }

    /// Swap in a registry; the guard follows it
    pub fn use_registry(&mut self, registry: RouteRegistry) {
        self.registry = Arc::new(registry);
        self.guard = RouteGuard::new(self.registry.clone());
    }

    /// `/` for Dashboard and `/users-management` for Users
    pub fn two_route_registry() -> RouteRegistry {
        RouteRegistry::builder()
            .route(Route::new("Dashboard", "/", Icon::Home).requires(DASHBOARD))
            .route(Route::new("Users Management", "/users-management", Icon::Users).requires(USERS))
            .build()
            .expect("two-route registry is valid")
    }

    /// Start a resolution that only finishes once `release` is notified
    pub async fn start_gated_resolution(&mut self, identity: Result<ResolvedIdentity, IdentityError>) {
        let started = Arc::new(Notify::new());
        let provider = GatedProvider {
            started: started.clone(),
            release: self.release.clone(),
            identity,
        };
        let context = self.context.clone();
        self.pending = Some(tokio::spawn(async move { context.resolve_with(&provider).await }));
        started.notified().await;
    }

    pub fn navigate(&mut self, pathname: &str) -> GuardDecision {
        let decision = self.guard.evaluate(pathname, &self.context.snapshot());
        self.decision = Some(decision.clone());
        decision
    }
}

/// Parse `"Dashboard, Users"` (empty string = no permission)
pub fn parse_permissions(list: &str) -> PermissionSet {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| Permission::new(name.to_string()))
        .collect()
}

/// Parse `"Dashboard, Users Management"` into names
pub fn parse_names(list: &str) -> Vec<String> {
    list.split(',').map(str::trim).filter(|n| !n.is_empty()).map(String::from).collect()
}
