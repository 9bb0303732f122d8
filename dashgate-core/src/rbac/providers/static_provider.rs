//! Fixed identity provider
//!
//! Always resolves to the same role. Used for local development, demos and
//! tests where no identity backend is available.

use crate::rbac::roles::Role;
use crate::rbac::traits::{IdentityError, IdentityProvider, ResolvedIdentity, UserProfile};
use async_trait::async_trait;

/// Fixed identity provider
#[derive(Debug, Clone)]
pub struct StaticIdentityProvider {
    /// Role handed to every resolution (None = nobody signed in)
    role: Option<Role>,

    /// Profile attached to the identity
    profile: Option<UserProfile>,
}

impl StaticIdentityProvider {
    /// Provider resolving to a signed-in user with `role`
    pub fn new(role: Role) -> Self {
        Self { role: Some(role), profile: None }
    }

    /// Provider resolving to "nobody signed in"
    pub fn anonymous() -> Self {
        Self { role: None, profile: None }
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = Some(profile);
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn resolve_identity(&self) -> Result<ResolvedIdentity, IdentityError> {
        match &self.role {
            Some(role) => {
                let profile = self.profile.clone().map(|mut p| {
                    if p.role.is_empty() {
                        p.role = role.name.clone();
                    }
                    p
                });
                Ok(ResolvedIdentity::from_role(role, profile))
            }
            None => Ok(ResolvedIdentity::anonymous()),
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}
