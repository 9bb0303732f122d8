use crate::features::world::{parse_permissions, DashgateWorld};
use cucumber::{given, then, when};
use dashgate_core::navigation::{GuardDecision, NotFoundExit};
use dashgate_core::rbac::{ResolvedIdentity, StaticIdentityProvider};

// ==================== BACKGROUND ====================

#[given(expr = "the two-route registry")]
async fn given_two_route_registry(world: &mut DashgateWorld) {
    world.use_registry(DashgateWorld::two_route_registry());
}

#[given(expr = "the dashboard registry")]
async fn given_dashboard_registry(world: &mut DashgateWorld) {
    world.use_registry(dashgate_core::RouteRegistry::dashboard());
}

// ==================== SESSION STANDING ====================

#[given(expr = "the identity is still resolving")]
async fn given_identity_resolving(world: &mut DashgateWorld) {
    assert!(world.context.is_loading(), "a fresh session starts loading");
}

#[given(expr = "nobody is signed in")]
async fn given_nobody_signed_in(world: &mut DashgateWorld) {
    let ticket = world.context.begin_resolution().expect("fresh session accepts a resolution");
    world
        .context
        .complete(ticket, Ok(ResolvedIdentity::anonymous()))
        .expect("anonymous resolution applies");
}

#[given(expr = "a user signed in with permissions {string}")]
async fn given_signed_in(world: &mut DashgateWorld, permissions: String) {
    let identity = ResolvedIdentity::authenticated(parse_permissions(&permissions));
    let ticket = world.context.begin_resolution().expect("fresh session accepts a resolution");
    world.context.complete(ticket, Ok(identity)).expect("resolution applies");
    assert!(world.context.is_authenticated());
}

#[given(expr = "a user signed in with the {string} role")]
async fn given_signed_in_with_role(world: &mut DashgateWorld, role: String) {
    let role = match role.as_str() {
        "Support" => dashgate_core::rbac::Role::new("Support").with_permissions(["Users", "Notification"]),
        "Finance" => dashgate_core::rbac::Role::new("Finance").with_permissions(["Revenue", "Payment"]),
        other => panic!("unknown test role {}", other),
    };
    world
        .context
        .resolve_with(&StaticIdentityProvider::new(role))
        .await
        .expect("resolution applies");
}

// ==================== NAVIGATION ====================

#[when(expr = "the user navigates to {string}")]
async fn when_navigate(world: &mut DashgateWorld, pathname: String) {
    world.navigate(&pathname);
}

#[then(expr = "the page is rendered")]
async fn then_rendered(world: &mut DashgateWorld) {
    assert_eq!(world.decision, Some(GuardDecision::Render));
}

#[then(expr = "the guard waits for the identity")]
async fn then_suspended(world: &mut DashgateWorld) {
    assert_eq!(world.decision, Some(GuardDecision::Suspend));
}

#[then(expr = "the user is redirected to {string}")]
async fn then_redirected(world: &mut DashgateWorld, target: String) {
    assert_eq!(world.decision, Some(GuardDecision::Redirect(target)));
}

#[then(expr = "navigating to {string} redirects to {string}")]
async fn then_navigation_redirects(world: &mut DashgateWorld, pathname: String, target: String) {
    assert_eq!(world.navigate(&pathname), GuardDecision::Redirect(target));
}

#[then(expr = "navigating to {string} renders the page")]
async fn then_navigation_renders(world: &mut DashgateWorld, pathname: String) {
    assert_eq!(world.navigate(&pathname), GuardDecision::Render);
}

// ==================== SIGN-IN / NOT-FOUND PAGES ====================

#[when(expr = "the sign-in page loads")]
async fn when_sign_in_page(world: &mut DashgateWorld) {
    world.decision = Some(world.guard.sign_in_landing(&world.context.snapshot()));
}

#[then(expr = "going back from the not-found page returns to the previous page")]
async fn then_not_found_back(world: &mut DashgateWorld) {
    assert_eq!(world.guard.not_found_exit(&world.context.snapshot()), NotFoundExit::Back);
}

#[then(expr = "going back from the not-found page leads to {string}")]
async fn then_not_found_redirect(world: &mut DashgateWorld, target: String) {
    assert_eq!(
        world.guard.not_found_exit(&world.context.snapshot()),
        NotFoundExit::Redirect(target)
    );
}
