use anyhow::{bail, Result};
use dashgate_core::navigation::derive_menu;
use dashgate_core::rbac::{AuthorizationState, Completion};
use dashgate_core::DashgateConfig;
use serde_json::json;

use super::inspect::render_menu;

/// `dashgate resolve`: ask the dashboard API who the token belongs to
pub async fn run(mut config: DashgateConfig, token: Option<String>, json: bool) -> Result<String> {
    if token.is_some() {
        config.identity.token = token;
    }

    let Some(provider) = config.identity.provider_config().create_provider() else {
        bail!("No identity API configured (set identity.api_base_url or DG_API_BASE_URL)");
    };

    let registry = config.build_registry()?;
    let context = config.build_context();
    let completion = context.resolve_with(provider.as_ref()).await?;
    let state = context.snapshot();

    render(&state, completion, &registry, json)
}

fn render(
    state: &AuthorizationState,
    completion: Completion,
    registry: &dashgate_core::RouteRegistry,
    json: bool,
) -> Result<String> {
    let menu = derive_menu(registry, state.permissions());
    let landing = state.is_authenticated().then(|| registry.first_accessible_route(state.permissions()));

    if json {
        return Ok(serde_json::to_string_pretty(&json!({
            "state": state,
            "landing": landing,
            "menu": menu,
        }))?);
    }

    let mut out = vec![format!("status: {}", state.status())];
    if completion == Completion::Discarded {
        out.push("(resolution discarded)".to_string());
    }
    if let Some(profile) = state.profile() {
        out.push(format!("user: {} <{}> role {}", profile.name, profile.email, profile.role));
    }
    let granted: Vec<&str> = state.permissions().iter().map(|p| p.as_str()).collect();
    out.push(format!("permissions: {}", granted.join(", ")));
    if let Some(landing) = landing {
        out.push(format!("landing: {}", landing));
    }
    out.push(render_menu(&menu, registry.root(), None, false)?);
    Ok(out.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashgate_core::rbac::{Role, StaticIdentityProvider};

    #[tokio::test]
    async fn requires_api_base_url() {
        let err = run(DashgateConfig::default(), None, false).await.unwrap_err();
        assert!(err.to_string().contains("No identity API configured"));
    }

    #[tokio::test]
    async fn render_resolved_identity() {
        let config = DashgateConfig::default();
        let registry = config.build_registry().unwrap();
        let context = config.build_context();
        let provider = StaticIdentityProvider::new(
            Role::new("Support").with_permissions(["Users", "Notification"]),
        );

        let completion = context.resolve_with(&provider).await.unwrap();
        let output = render(&context.snapshot(), completion, &registry, false).unwrap();

        assert!(output.starts_with("status: authenticated"));
        assert!(output.contains("permissions: Notification, Users"));
        assert!(output.contains("landing: /users-management"));
        assert!(output.contains("Notifications"));
    }
}
