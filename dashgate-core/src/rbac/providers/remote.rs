//! REST identity provider
//!
//! Resolves the signed-in user through the dashboard API's "get me" endpoint
//! and normalises its nested payload:
//!
//! ```json
//! { "data": { "success": true, "message": "...", "data": { "user": {
//!     "id": "...", "name": "...", "email": "...", "avatarUrl": null,
//!     "dashboardUserRole": {
//!         "name": "Support",
//!         "dashboardRolePermissions": [ { "permission": { "id": "...", "name": "Users" } } ]
//!     }
//! } } } }
//! ```
//!
//! A 401/403 means "nobody signed in", not a failure.

use crate::rbac::permissions::{Permission, PermissionSet};
use crate::rbac::traits::{IdentityError, IdentityProvider, ResolvedIdentity, UserProfile};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Default path of the "get me" endpoint, relative to the API base URL
pub const DEFAULT_ME_ENDPOINT: &str = "/settings/user/get-me";

/// REST identity provider
#[derive(Clone)]
pub struct RemoteIdentityProvider {
    client: reqwest::Client,

    /// API base URL (e.g. "https://api.example.com/api/v1")
    base_url: String,

    /// Endpoint path appended to the base URL
    endpoint: String,

    /// Bearer token of the current session, if any
    token: Option<String>,
}

impl std::fmt::Debug for RemoteIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteIdentityProvider")
            .field("base_url", &self.base_url)
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl RemoteIdentityProvider {
    /// Create a provider for `base_url` using the default endpoint
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            endpoint: DEFAULT_ME_ENDPOINT.to_string(),
            token: None,
        }
    }

    /// Override the endpoint path
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Attach the session's bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Full endpoint URL
    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    async fn resolve_identity(&self) -> Result<ResolvedIdentity, IdentityError> {
        // No token, nobody to ask about
        let Some(token) = &self.token else {
            return Ok(ResolvedIdentity::anonymous());
        };

        let response = self
            .client
            .get(self.url())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            log::debug!("Identity endpoint answered {}, treating as signed out", status);
            return Ok(ResolvedIdentity::anonymous());
        }
        if !status.is_success() {
            return Err(IdentityError::Status(status.as_u16()));
        }

        let body: Value =
            response.json().await.map_err(|e| IdentityError::Malformed(e.to_string()))?;
        normalize_me_response(&body)
    }

    fn name(&self) -> &str {
        "remote"
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeUser {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    dashboard_user_role: Option<MeRole>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeRole {
    #[serde(default)]
    name: String,
    #[serde(default)]
    dashboard_role_permissions: Vec<MeRolePermission>,
}

#[derive(Debug, Deserialize)]
struct MeRolePermission {
    permission: MePermission,
}

#[derive(Debug, Deserialize)]
struct MePermission {
    name: String,
}

/// Normalise a "get me" response body
///
/// The user object is looked up at `data.data.user`, then `data.user`, then
/// `user`. A body without a user (or with `success: false`) resolves to an
/// anonymous identity.
pub fn normalize_me_response(body: &Value) -> Result<ResolvedIdentity, IdentityError> {
    let envelope = body.get("data").unwrap_or(body);
    if envelope.get("success").and_then(Value::as_bool) == Some(false) {
        return Ok(ResolvedIdentity::anonymous());
    }

    let user = [
        body.pointer("/data/data/user"),
        body.pointer("/data/user"),
        body.get("user"),
    ]
    .into_iter()
    .flatten()
    .find(|v| !v.is_null());

    let Some(user) = user else {
        return Ok(ResolvedIdentity::anonymous());
    };

    let user: MeUser = serde_json::from_value(user.clone())
        .map_err(|e| IdentityError::Malformed(e.to_string()))?;

    let (role_name, permissions) = match user.dashboard_user_role {
        Some(role) => {
            let permissions: PermissionSet = role
                .dashboard_role_permissions
                .into_iter()
                .map(|rp| Permission::from(rp.permission.name))
                .collect();
            (role.name, permissions)
        }
        None => (String::new(), PermissionSet::new()),
    };

    let profile = UserProfile {
        id: user.id,
        name: user.name,
        email: user.email,
        role: role_name,
        avatar_url: user.avatar_url,
        created_at: user.created_at,
    };

    Ok(ResolvedIdentity::authenticated(permissions).with_profile(profile))
}
