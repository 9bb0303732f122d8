//! Session-scoped authorization context
//!
//! [`AuthorizationContext`] is the single writer of the session's
//! [`AuthorizationState`]. Every mutation goes through a named transition:
//!
//! ```text
//!            resolution ok                  logout / expire
//! Loading ─────────────────▶ Authenticated ────────────────▶ Unauthenticated
//!    │                             ▲                               │
//!    │ resolution failed / logout  │         sign-in ok            │
//!    └─────────────────────────────┼───────────────────────────────┤
//!                                  └───────────────────────────────┘
//! ```
//!
//! Identity resolution is asynchronous. Each attempt holds a
//! [`ResolutionTicket`] stamped with the session epoch; any applied transition
//! advances the epoch, so a resolution that completes after a logout (or after
//! a competing attempt already won) is discarded instead of resurrecting the
//! session.
//!
//! State is published through a `tokio::sync::watch` channel so consumers
//! (route guard, menu) can recompute whenever it changes.

use crate::rbac::permissions::{Permission, PermissionSet};
use crate::rbac::traits::{IdentityError, IdentityProvider, ResolvedIdentity, UserProfile};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// Default bound on a single identity resolution
pub const DEFAULT_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the session currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AuthStatus {
    /// Identity resolution in flight
    Loading,
    Authenticated,
    Unauthenticated,
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStatus::Loading => f.write_str("loading"),
            AuthStatus::Authenticated => f.write_str("authenticated"),
            AuthStatus::Unauthenticated => f.write_str("unauthenticated"),
        }
    }
}

/// Transition requests understood by the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthEvent {
    BeginResolution,
    ResolutionCompleted,
    BeginSignIn,
    SignInCompleted,
    Logout,
    Expire,
    RefreshPermissions,
}

impl fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthEvent::BeginResolution => "begin-resolution",
            AuthEvent::ResolutionCompleted => "resolution-completed",
            AuthEvent::BeginSignIn => "begin-sign-in",
            AuthEvent::SignInCompleted => "sign-in-completed",
            AuthEvent::Logout => "logout",
            AuthEvent::Expire => "expire",
            AuthEvent::RefreshPermissions => "refresh-permissions",
        };
        f.write_str(name)
    }
}

/// Authorization context errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The requested transition is not legal from the current state.
    /// State is left untouched.
    #[error("illegal transition: {event} while {from}")]
    InvalidTransition { from: AuthStatus, event: AuthEvent },
}

/// Snapshot of the session's authorization standing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationState {
    status: AuthStatus,
    permissions: PermissionSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<UserProfile>,
}

impl Default for AuthorizationState {
    fn default() -> Self {
        Self::loading()
    }
}

impl AuthorizationState {
    /// Identity not yet resolved
    pub fn loading() -> Self {
        Self { status: AuthStatus::Loading, permissions: PermissionSet::new(), profile: None }
    }

    /// Nobody signed in
    pub fn unauthenticated() -> Self {
        Self {
            status: AuthStatus::Unauthenticated,
            permissions: PermissionSet::new(),
            profile: None,
        }
    }

    /// Signed in with `permissions`
    pub fn authenticated(permissions: PermissionSet, profile: Option<UserProfile>) -> Self {
        Self { status: AuthStatus::Authenticated, permissions, profile }
    }

    pub fn status(&self) -> AuthStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == AuthStatus::Loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }

    /// Granted permissions; always empty unless authenticated
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.is_authenticated() && self.permissions.contains(permission)
    }

    /// OR semantics; an empty `required` is never satisfied
    pub fn has_any_permission(&self, required: &[Permission]) -> bool {
        self.is_authenticated() && self.permissions.intersects(required)
    }

    /// AND semantics; an empty `required` is satisfied by any authenticated session
    pub fn has_all_permissions(&self, required: &[Permission]) -> bool {
        self.is_authenticated() && self.permissions.contains_all(required)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TicketKind {
    Resolution,
    SignIn,
}

/// Proof of an in-flight identity resolution or sign-in attempt
///
/// Tickets are consumed on completion. A ticket issued before the most recent
/// applied transition is stale and its result is discarded.
#[derive(Debug)]
#[must_use = "an identity attempt must be completed with its ticket"]
pub struct ResolutionTicket {
    epoch: u64,
    kind: TicketKind,
}

impl ResolutionTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// What a completed attempt did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Session is now authenticated
    Authenticated,
    /// Session is (or stays) unauthenticated
    Unauthenticated,
    /// The ticket was stale; state untouched
    Discarded,
}

/// Single-writer authorization state container
pub struct AuthorizationContext {
    state: watch::Sender<AuthorizationState>,
    epoch: AtomicU64,
    timeout: Duration,
}

impl Default for AuthorizationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AuthorizationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationContext")
            .field("state", &*self.state.borrow())
            .field("epoch", &self.epoch.load(Ordering::SeqCst))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AuthorizationContext {
    /// New context in the Loading state
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthorizationState::loading());
        Self { state, epoch: AtomicU64::new(0), timeout: DEFAULT_RESOLUTION_TIMEOUT }
    }

    /// Set the identity resolution timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Current state (cloned snapshot)
    pub fn snapshot(&self) -> AuthorizationState {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> AuthStatus {
        self.state.borrow().status
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<AuthorizationState> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.state.borrow().has_permission(permission)
    }

    pub fn has_any_permission(&self, required: &[Permission]) -> bool {
        self.state.borrow().has_any_permission(required)
    }

    pub fn has_all_permissions(&self, required: &[Permission]) -> bool {
        self.state.borrow().has_all_permissions(required)
    }

    /// Start resolving the session identity. Legal only while Loading.
    pub fn begin_resolution(&self) -> Result<ResolutionTicket, AuthError> {
        self.issue_ticket(TicketKind::Resolution)
    }

    /// Start a sign-in attempt. Legal only while Unauthenticated.
    pub fn begin_sign_in(&self) -> Result<ResolutionTicket, AuthError> {
        self.issue_ticket(TicketKind::SignIn)
    }

    fn issue_ticket(&self, kind: TicketKind) -> Result<ResolutionTicket, AuthError> {
        let (required, event) = match kind {
            TicketKind::Resolution => (AuthStatus::Loading, AuthEvent::BeginResolution),
            TicketKind::SignIn => (AuthStatus::Unauthenticated, AuthEvent::BeginSignIn),
        };

        let state = self.state.borrow();
        if state.status != required {
            return Err(reject(state.status, event));
        }
        Ok(ResolutionTicket { epoch: self.epoch.load(Ordering::SeqCst), kind })
    }

    /// Apply the result of an identity attempt
    ///
    /// A failed resolution (or a resolved-but-anonymous identity) lands in
    /// Unauthenticated. A failed sign-in leaves the session Unauthenticated.
    pub fn complete(
        &self,
        ticket: ResolutionTicket,
        outcome: Result<ResolvedIdentity, IdentityError>,
    ) -> Result<Completion, AuthError> {
        let (required, event) = match ticket.kind {
            TicketKind::Resolution => (AuthStatus::Loading, AuthEvent::ResolutionCompleted),
            TicketKind::SignIn => (AuthStatus::Unauthenticated, AuthEvent::SignInCompleted),
        };

        let mut result = Ok(Completion::Discarded);
        self.state.send_if_modified(|state| {
            if self.epoch.load(Ordering::SeqCst) != ticket.epoch {
                log::debug!("Discarding stale {} (ticket epoch {})", event, ticket.epoch);
                return false;
            }
            if state.status != required {
                result = Err(reject(state.status, event));
                return false;
            }

            let next = match outcome {
                Ok(identity) if identity.authenticated => {
                    log::info!(
                        "Session authenticated with {} permission(s)",
                        identity.permissions.len()
                    );
                    AuthorizationState::authenticated(identity.permissions, identity.profile)
                }
                Ok(_) => {
                    log::info!("Identity resolved without a signed-in user");
                    AuthorizationState::unauthenticated()
                }
                Err(err) => {
                    log::warn!("Identity resolution failed: {}", err);
                    AuthorizationState::unauthenticated()
                }
            };

            result = Ok(match next.status {
                AuthStatus::Authenticated => Completion::Authenticated,
                _ => Completion::Unauthenticated,
            });
            self.epoch.fetch_add(1, Ordering::SeqCst);
            let changed = *state != next;
            *state = next;
            changed
        });
        result
    }

    /// Explicit logout. Clears permissions and the cached profile, and
    /// invalidates every outstanding ticket.
    ///
    /// Legal from Authenticated and from Loading (cancelling the resolution).
    pub fn logout(&self) -> Result<(), AuthError> {
        self.tear_down(AuthEvent::Logout, &[AuthStatus::Authenticated, AuthStatus::Loading])
    }

    /// Session expiry. Same effect as logout; legal only from Authenticated.
    pub fn expire(&self) -> Result<(), AuthError> {
        self.tear_down(AuthEvent::Expire, &[AuthStatus::Authenticated])
    }

    fn tear_down(&self, event: AuthEvent, allowed_from: &[AuthStatus]) -> Result<(), AuthError> {
        let mut result = Ok(());
        self.state.send_if_modified(|state| {
            if !allowed_from.contains(&state.status) {
                result = Err(reject(state.status, event));
                return false;
            }
            self.epoch.fetch_add(1, Ordering::SeqCst);
            log::info!("Session ended ({}) from {}", event, state.status);
            *state = AuthorizationState::unauthenticated();
            true
        });
        result
    }

    /// Replace the permission set of an authenticated session (role edited
    /// while signed in). Illegal in any other state.
    pub fn refresh_permissions(&self, permissions: PermissionSet) -> Result<(), AuthError> {
        let mut result = Ok(());
        self.state.send_if_modified(|state| {
            if !state.is_authenticated() {
                result = Err(reject(state.status, AuthEvent::RefreshPermissions));
                return false;
            }
            if state.permissions == permissions {
                return false;
            }
            self.epoch.fetch_add(1, Ordering::SeqCst);
            log::info!("Session permissions refreshed ({} granted)", permissions.len());
            state.permissions = permissions;
            true
        });
        result
    }

    /// Resolve the session identity through `provider`, bounded by the
    /// configured timeout. A timeout counts as a failed resolution.
    pub async fn resolve_with<P>(&self, provider: &P) -> Result<Completion, AuthError>
    where
        P: IdentityProvider + ?Sized,
    {
        let ticket = self.begin_resolution()?;
        log::debug!("Resolving identity via '{}'", provider.name());
        let outcome = self.run_provider(provider).await;
        self.complete(ticket, outcome)
    }

    /// Sign in through `provider`, bounded by the configured timeout
    pub async fn sign_in_with<P>(&self, provider: &P) -> Result<Completion, AuthError>
    where
        P: IdentityProvider + ?Sized,
    {
        let ticket = self.begin_sign_in()?;
        log::debug!("Signing in via '{}'", provider.name());
        let outcome = self.run_provider(provider).await;
        self.complete(ticket, outcome)
    }

    async fn run_provider<P>(&self, provider: &P) -> Result<ResolvedIdentity, IdentityError>
    where
        P: IdentityProvider + ?Sized,
    {
        match tokio::time::timeout(self.timeout, provider.resolve_identity()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(IdentityError::Timeout(self.timeout)),
        }
    }
}

fn reject(from: AuthStatus, event: AuthEvent) -> AuthError {
    log::warn!("Rejected {} while {}", event, from);
    AuthError::InvalidTransition { from, event }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::catalog::{DASHBOARD, SETTINGS, USERS};
    use crate::rbac::providers::StaticIdentityProvider;
    use crate::rbac::roles::Role;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn granted(names: &[&'static str]) -> PermissionSet {
        names.iter().copied().collect()
    }

    fn identity(names: &[&'static str]) -> ResolvedIdentity {
        ResolvedIdentity::authenticated(granted(names))
    }

    /// Provider that blocks until released
    struct GatedProvider {
        started: Arc<Notify>,
        release: Arc<Notify>,
        identity: ResolvedIdentity,
    }

    impl GatedProvider {
        fn new(identity: ResolvedIdentity) -> Self {
            Self { started: Arc::new(Notify::new()), release: Arc::new(Notify::new()), identity }
        }
    }

    #[async_trait]
    impl IdentityProvider for GatedProvider {
        async fn resolve_identity(&self) -> Result<ResolvedIdentity, IdentityError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(self.identity.clone())
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    #[test]
    fn test_starts_loading_and_queries_are_conservative() {
        let ctx = AuthorizationContext::new();
        assert!(ctx.is_loading());
        assert!(!ctx.is_authenticated());
        assert!(!ctx.has_permission(&DASHBOARD));
        assert!(!ctx.has_any_permission(&[DASHBOARD, USERS]));
        assert!(!ctx.has_all_permissions(&[]));
    }

    #[test]
    fn test_resolution_success() {
        let ctx = AuthorizationContext::new();
        let ticket = ctx.begin_resolution().unwrap();
        let done = ctx.complete(ticket, Ok(identity(&["Dashboard", "Users"]))).unwrap();

        assert_eq!(done, Completion::Authenticated);
        assert!(ctx.is_authenticated());
        assert!(ctx.has_permission(&USERS));
        assert!(ctx.has_any_permission(&[SETTINGS, USERS]));
        assert!(!ctx.has_all_permissions(&[SETTINGS, USERS]));
        assert!(ctx.has_all_permissions(&[]));
    }

    #[test]
    fn test_resolution_failure_is_unauthenticated() {
        let ctx = AuthorizationContext::new();
        let ticket = ctx.begin_resolution().unwrap();
        let done = ctx.complete(ticket, Err(IdentityError::Status(500))).unwrap();

        assert_eq!(done, Completion::Unauthenticated);
        assert_eq!(ctx.status(), AuthStatus::Unauthenticated);
        assert!(ctx.snapshot().permissions().is_empty());
    }

    #[test]
    fn test_anonymous_identity_is_unauthenticated() {
        let ctx = AuthorizationContext::new();
        let ticket = ctx.begin_resolution().unwrap();
        let done = ctx.complete(ticket, Ok(ResolvedIdentity::anonymous())).unwrap();
        assert_eq!(done, Completion::Unauthenticated);
    }

    #[test]
    fn test_logout_clears_permissions_and_profile() {
        let ctx = AuthorizationContext::new();
        let ticket = ctx.begin_resolution().unwrap();
        let profile = UserProfile { name: "Mona".into(), ..Default::default() };
        ctx.complete(ticket, Ok(identity(&["Users"]).with_profile(profile))).unwrap();
        assert!(ctx.snapshot().profile().is_some());

        ctx.logout().unwrap();
        let state = ctx.snapshot();
        assert_eq!(state.status(), AuthStatus::Unauthenticated);
        assert!(state.permissions().is_empty());
        assert!(state.profile().is_none());
        assert!(!ctx.has_permission(&USERS));
    }

    #[test]
    fn test_sign_in_after_logout() {
        let ctx = AuthorizationContext::new();
        let ticket = ctx.begin_resolution().unwrap();
        ctx.complete(ticket, Err(IdentityError::Status(401))).unwrap();

        let ticket = ctx.begin_sign_in().unwrap();
        let done = ctx.complete(ticket, Ok(identity(&["Settings"]))).unwrap();
        assert_eq!(done, Completion::Authenticated);
        assert!(ctx.has_permission(&SETTINGS));
    }

    #[test]
    fn test_failed_sign_in_stays_unauthenticated() {
        let ctx = AuthorizationContext::new();
        ctx.logout().unwrap();

        let ticket = ctx.begin_sign_in().unwrap();
        let done = ctx
            .complete(ticket, Err(IdentityError::Transport("connection refused".into())))
            .unwrap();
        assert_eq!(done, Completion::Unauthenticated);
        assert_eq!(ctx.status(), AuthStatus::Unauthenticated);
    }

    #[test]
    fn test_logout_discards_in_flight_resolution() {
        let ctx = AuthorizationContext::new();
        let ticket = ctx.begin_resolution().unwrap();

        ctx.logout().unwrap();
        let done = ctx.complete(ticket, Ok(identity(&["Dashboard"]))).unwrap();

        assert_eq!(done, Completion::Discarded);
        assert_eq!(ctx.status(), AuthStatus::Unauthenticated);
        assert!(!ctx.has_permission(&DASHBOARD));
    }

    #[test]
    fn test_competing_sign_ins_first_wins() {
        let ctx = AuthorizationContext::new();
        ctx.logout().unwrap();

        let first = ctx.begin_sign_in().unwrap();
        let second = ctx.begin_sign_in().unwrap();

        assert_eq!(ctx.complete(first, Ok(identity(&["Users"]))).unwrap(), Completion::Authenticated);
        assert_eq!(
            ctx.complete(second, Ok(identity(&["Settings"]))).unwrap(),
            Completion::Discarded
        );
        assert!(ctx.has_permission(&USERS));
        assert!(!ctx.has_permission(&SETTINGS));
    }

    #[test]
    fn test_illegal_transitions_leave_state_untouched() {
        let ctx = AuthorizationContext::new();

        // Loading
        assert_eq!(
            ctx.begin_sign_in().unwrap_err(),
            AuthError::InvalidTransition { from: AuthStatus::Loading, event: AuthEvent::BeginSignIn }
        );
        assert!(ctx.expire().is_err());
        assert!(ctx.refresh_permissions(granted(&["Users"])).is_err());
        assert!(ctx.is_loading());

        // Unauthenticated
        ctx.logout().unwrap();
        assert!(ctx.begin_resolution().is_err());
        assert!(ctx.logout().is_err());
        assert!(ctx.refresh_permissions(granted(&["Users"])).is_err());
        assert!(ctx.snapshot().permissions().is_empty());

        // Authenticated
        let ticket = ctx.begin_sign_in().unwrap();
        ctx.complete(ticket, Ok(identity(&["Users"]))).unwrap();
        assert!(ctx.begin_sign_in().is_err());
        assert!(ctx.begin_resolution().is_err());
        assert!(ctx.is_authenticated());
    }

    #[test]
    fn test_refresh_and_expire() {
        let ctx = AuthorizationContext::new();
        let ticket = ctx.begin_resolution().unwrap();
        ctx.complete(ticket, Ok(identity(&["Users"]))).unwrap();

        ctx.refresh_permissions(granted(&["Settings"])).unwrap();
        assert!(ctx.has_permission(&SETTINGS));
        assert!(!ctx.has_permission(&USERS));

        ctx.expire().unwrap();
        assert_eq!(ctx.status(), AuthStatus::Unauthenticated);
    }

    #[test]
    fn test_subscribers_see_transitions() {
        let ctx = AuthorizationContext::new();
        let mut rx = ctx.subscribe();
        assert!(rx.borrow_and_update().is_loading());

        let ticket = ctx.begin_resolution().unwrap();
        ctx.complete(ticket, Ok(identity(&["Users"]))).unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated());

        // No-op refresh does not notify
        ctx.refresh_permissions(granted(&["Users"])).unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_resolve_with_static_provider() {
        let ctx = AuthorizationContext::new();
        let provider = StaticIdentityProvider::new(Role::new("Admin").with_permission(DASHBOARD));

        let done = ctx.resolve_with(&provider).await.unwrap();
        assert_eq!(done, Completion::Authenticated);
        assert!(ctx.has_permission(&DASHBOARD));
    }

    #[tokio::test]
    async fn test_resolution_timeout_is_unauthenticated() {
        let ctx = AuthorizationContext::new().with_timeout(Duration::from_millis(20));
        let provider = GatedProvider::new(identity(&["Users"]));

        let done = ctx.resolve_with(&provider).await.unwrap();
        assert_eq!(done, Completion::Unauthenticated);
        assert_eq!(ctx.status(), AuthStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_logout_races_in_flight_resolution() {
        let ctx = Arc::new(AuthorizationContext::new());
        let provider = GatedProvider::new(identity(&["Users"]));
        let started = provider.started.clone();
        let release = provider.release.clone();

        let resolving = {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.resolve_with(&provider).await })
        };

        // Log out once the resolution is in flight, then let it complete
        started.notified().await;
        ctx.logout().unwrap();
        release.notify_one();

        let done = resolving.await.unwrap().unwrap();
        assert_eq!(done, Completion::Discarded);
        assert_eq!(ctx.status(), AuthStatus::Unauthenticated);
        assert!(!ctx.has_permission(&USERS));
    }
}
