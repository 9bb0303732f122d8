use crate::features::world::{parse_permissions, DashgateWorld};
use cucumber::{given, then, when};
use dashgate_core::rbac::{AuthStatus, Completion, IdentityError, ResolvedIdentity};
use std::time::Duration;

// ==================== IN-FLIGHT RESOLUTION ====================

#[given(expr = "an identity resolution is in flight for {string}")]
async fn given_resolution_in_flight(world: &mut DashgateWorld, permissions: String) {
    let identity = ResolvedIdentity::authenticated(parse_permissions(&permissions));
    world.start_gated_resolution(Ok(identity)).await;
}

#[given(expr = "an identity resolution is in flight that will fail")]
async fn given_failing_resolution(world: &mut DashgateWorld) {
    world.start_gated_resolution(Err(IdentityError::Status(500))).await;
}

#[when(expr = "the identity resolution completes")]
async fn when_resolution_completes(world: &mut DashgateWorld) {
    world.release.notify_one();
    let handle = world.pending.take().expect("a resolution is in flight");
    let outcome = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("resolution finishes once released")
        .expect("resolution task does not panic");
    world.completion = Some(outcome);
}

#[then(expr = "the resolution is discarded")]
async fn then_discarded(world: &mut DashgateWorld) {
    assert_eq!(world.completion, Some(Ok(Completion::Discarded)));
}

#[then(expr = "the resolution is applied")]
async fn then_applied(world: &mut DashgateWorld) {
    assert!(
        matches!(
            world.completion,
            Some(Ok(Completion::Authenticated)) | Some(Ok(Completion::Unauthenticated))
        ),
        "unexpected completion {:?}",
        world.completion
    );
}

// ==================== SESSION EVENTS ====================

#[when(expr = "the user logs out")]
async fn when_logout(world: &mut DashgateWorld) {
    if let Err(err) = world.context.logout() {
        world.last_error = Some(err);
    }
}

#[when(expr = "the session expires")]
async fn when_expire(world: &mut DashgateWorld) {
    if let Err(err) = world.context.expire() {
        world.last_error = Some(err);
    }
}

#[when(expr = "the role is changed to {string}")]
async fn when_role_changed(world: &mut DashgateWorld, permissions: String) {
    if let Err(err) = world.context.refresh_permissions(parse_permissions(&permissions)) {
        world.last_error = Some(err);
    }
}

// ==================== SESSION STATE ====================

#[then(expr = "the session is {word}")]
async fn then_session_status(world: &mut DashgateWorld, status: String) {
    let expected = match status.as_str() {
        "loading" => AuthStatus::Loading,
        "authenticated" => AuthStatus::Authenticated,
        "unauthenticated" => AuthStatus::Unauthenticated,
        other => panic!("unknown session status {}", other),
    };
    assert_eq!(world.context.status(), expected);
}

#[then(expr = "the session holds no permissions")]
async fn then_no_permissions(world: &mut DashgateWorld) {
    assert!(world.context.snapshot().permissions().is_empty());
}

#[then(expr = "the session holds {string}")]
async fn then_session_holds(world: &mut DashgateWorld, permissions: String) {
    assert_eq!(world.context.snapshot().permissions(), &parse_permissions(&permissions));
}

#[then(expr = "the transition is rejected")]
async fn then_rejected(world: &mut DashgateWorld) {
    assert!(world.last_error.is_some(), "expected an illegal transition");
}
