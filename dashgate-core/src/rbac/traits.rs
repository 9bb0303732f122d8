//! Identity collaborator boundary
//!
//! The authorization core never talks to the network itself. An
//! [`IdentityProvider`] resolves "who is signed in and what may they do" and
//! hands back the normalised `{authenticated, permissions}` shape.

use crate::rbac::permissions::PermissionSet;
use crate::rbac::roles::Role;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Display data for the signed-in user. Never consulted for authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Name of the dashboard role the user belongs to
    pub role: String,
    pub avatar_url: Option<String>,
    pub created_at: Option<String>,
}

/// Normalised identity-resolution result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub authenticated: bool,
    pub permissions: PermissionSet,
    pub profile: Option<UserProfile>,
}

impl ResolvedIdentity {
    /// No signed-in user
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Signed-in user holding the permissions of `role`
    pub fn from_role(role: &Role, profile: Option<UserProfile>) -> Self {
        Self { authenticated: true, permissions: role.permissions.clone(), profile }
    }

    /// Signed-in user with an explicit permission set
    pub fn authenticated(permissions: PermissionSet) -> Self {
        Self { authenticated: true, permissions, profile: None }
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = Some(profile);
        self
    }
}

/// Identity resolution failures
///
/// All of these end up as an unauthenticated session; the variants only exist
/// so the failure can be logged precisely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("identity request failed: {0}")]
    Transport(String),

    #[error("identity endpoint returned status {0}")]
    Status(u16),

    #[error("malformed identity response: {0}")]
    Malformed(String),

    #[error("identity resolution timed out after {0:?}")]
    Timeout(Duration),
}

/// Identity provider trait
///
/// Implement this trait to plug a new identity source (REST endpoint, fixed
/// development identity, test double).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the current identity
    async fn resolve_identity(&self) -> Result<ResolvedIdentity, IdentityError>;

    /// Provider name for logging and identification
    fn name(&self) -> &str;
}

#[async_trait]
impl<P: IdentityProvider + ?Sized> IdentityProvider for std::sync::Arc<P> {
    async fn resolve_identity(&self) -> Result<ResolvedIdentity, IdentityError> {
        (**self).resolve_identity().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
