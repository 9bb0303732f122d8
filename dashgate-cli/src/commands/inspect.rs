use anyhow::Result;
use dashgate_core::navigation::{derive_menu, GuardDecision, MenuItem};
use dashgate_core::rbac::{AuthorizationState, PermissionSet};
use dashgate_core::DashgateConfig;
use serde_json::json;

use super::GrantArgs;

/// `dashgate routes`
pub fn routes(config: &DashgateConfig, grant: &GrantArgs, json: bool) -> Result<String> {
    let registry = config.build_registry()?;
    let granted = grant.permission_set()?;

    if json {
        let routes: Vec<_> = registry
            .routes()
            .iter()
            .map(|route| {
                json!({
                    "name": route.name,
                    "path": route.path,
                    "permissions": route.required_permissions,
                    "icon": route.icon,
                    "accessible": route.is_accessible(&granted),
                })
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&routes)?);
    }

    let lines: Vec<String> = registry
        .routes()
        .iter()
        .map(|route| {
            let mark = if route.is_accessible(&granted) { "x" } else { " " };
            let required: Vec<&str> =
                route.required_permissions.iter().map(|p| p.as_str()).collect();
            format!("[{}] {:<20} {:<26} {}", mark, route.path, route.name, required.join(" | "))
        })
        .collect();
    Ok(lines.join("\n"))
}

/// `dashgate menu`
pub fn menu(
    config: &DashgateConfig,
    grant: &GrantArgs,
    active: Option<&str>,
    json: bool,
) -> Result<String> {
    let registry = config.build_registry()?;
    let items = derive_menu(&registry, &grant.permission_set()?);
    render_menu(&items, registry.root(), active, json)
}

pub(crate) fn render_menu(
    items: &[MenuItem],
    root: &str,
    active: Option<&str>,
    json: bool,
) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(items)?);
    }
    if items.is_empty() {
        return Ok("(no accessible entries)".to_string());
    }

    let lines: Vec<String> = items
        .iter()
        .map(|item| {
            let marker = match active {
                Some(pathname) if item.is_active_under(root, pathname) => ">",
                _ => " ",
            };
            format!("{} {:<14} {:<26} {}", marker, item.icon, item.name, item.path)
        })
        .collect();
    Ok(lines.join("\n"))
}

/// `dashgate check <path>`
pub fn check(
    config: &DashgateConfig,
    path: &str,
    grant: &GrantArgs,
    signed_out: bool,
    loading: bool,
    json: bool,
) -> Result<String> {
    let guard = config.build_guard()?;
    let state = if loading {
        AuthorizationState::loading()
    } else if signed_out {
        AuthorizationState::unauthenticated()
    } else {
        AuthorizationState::authenticated(grant.permission_set()?, None)
    };

    let decision = guard.evaluate(path, &state);
    if json {
        return Ok(json!({ "path": path, "decision": decision_json(&decision) }).to_string());
    }
    Ok(format!("{} -> {}", path, describe(&decision)))
}

/// `dashgate landing`
pub fn landing(config: &DashgateConfig, grant: &GrantArgs, json: bool) -> Result<String> {
    let registry = config.build_registry()?;
    let granted: PermissionSet = grant.permission_set()?;
    let landing = registry.first_accessible_route(&granted);
    let fallback = registry.accessible_routes(&granted).is_empty();

    if json {
        return Ok(json!({ "landing": landing, "fallback": fallback }).to_string());
    }
    if fallback {
        return Ok(format!("{} (fallback, no accessible route)", landing));
    }
    Ok(landing.to_string())
}

pub(crate) fn describe(decision: &GuardDecision) -> String {
    match decision {
        GuardDecision::Render => "render".to_string(),
        GuardDecision::Suspend => "suspend".to_string(),
        GuardDecision::Redirect(to) => format!("redirect {}", to),
    }
}

fn decision_json(decision: &GuardDecision) -> serde_json::Value {
    match decision {
        GuardDecision::Redirect(to) => json!({ "redirect": to }),
        other => json!(describe(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(names: &[&str]) -> GrantArgs {
        GrantArgs { permissions: names.iter().map(|n| n.to_string()).collect(), ..Default::default() }
    }

    #[test]
    fn routes_marks_accessible() {
        let config = DashgateConfig::default();
        let output = routes(&config, &grant(&["Users"]), false).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("[ ] /"));
        assert!(lines[5].starts_with("[x] /users-management"));
    }

    #[test]
    fn menu_text_and_json() {
        let config = DashgateConfig::default();

        let output =
            menu(&config, &grant(&["Dashboard", "Users"]), Some("/users-management/3"), false)
                .unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  Home"));
        assert!(lines[1].starts_with("> Users"));

        let output = menu(&config, &grant(&["Feedback"]), None, true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["path"], "/feedback");
        assert_eq!(parsed[0]["icon"], "Feedback");

        assert_eq!(menu(&config, &grant(&[]), None, false).unwrap(), "(no accessible entries)");
    }

    #[test]
    fn check_decisions() {
        let config = DashgateConfig::default();

        let out = check(&config, "/users-management/42", &grant(&["Users"]), false, false, false);
        assert_eq!(out.unwrap(), "/users-management/42 -> render");

        let out = check(&config, "/users-management", &grant(&["Dashboard"]), false, false, false);
        assert_eq!(out.unwrap(), "/users-management -> redirect /not-found");

        let out = check(&config, "/", &grant(&[]), true, false, false);
        assert_eq!(out.unwrap(), "/ -> redirect /sign-in");

        let out = check(&config, "/", &grant(&[]), false, true, true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["decision"], "suspend");
    }

    #[test]
    fn landing_and_fallback() {
        let config = DashgateConfig::default();

        assert_eq!(landing(&config, &grant(&["Settings", "Payment"]), false).unwrap(), "/payment");
        assert_eq!(
            landing(&config, &grant(&[]), false).unwrap(),
            "/ (fallback, no accessible route)"
        );

        let out = landing(&config, &grant(&[]), true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["fallback"], true);
    }
}
