pub mod inspect;
pub mod resolve;

use clap::Args;
use dashgate_core::rbac::{Permission, PermissionCatalog, PermissionSet};

/// Permission flags shared by the inspection commands
#[derive(Args, Debug, Clone, Default)]
pub struct GrantArgs {
    /// Granted permission, by exact name (repeatable)
    #[arg(short = 'p', long = "permission", value_name = "NAME")]
    pub permissions: Vec<String>,

    /// Grant every permission of a module, e.g. `users` (repeatable)
    #[arg(short = 'm', long = "module", value_name = "KEY")]
    pub modules: Vec<String>,

    /// Grant the whole catalog
    #[arg(long)]
    pub all: bool,
}

impl GrantArgs {
    /// Permission set described by the flags
    pub fn permission_set(&self) -> anyhow::Result<PermissionSet> {
        let mut granted = PermissionSet::new();

        if self.all {
            for permission in PermissionCatalog::all() {
                granted.insert(permission);
            }
        }

        for key in &self.modules {
            for permission in &PermissionCatalog::permissions_for_module_key(key)? {
                granted.insert(permission.clone());
            }
        }

        for name in &self.permissions {
            if PermissionCatalog::lookup(name).is_none() {
                log::warn!("Permission {:?} is not part of the catalog", name);
            }
            granted.insert(Permission::new(name.clone()));
        }

        Ok(granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_from_flags() {
        let grant = GrantArgs {
            permissions: vec!["Users".into()],
            modules: vec!["settings".into()],
            all: false,
        };
        let granted = grant.permission_set().unwrap();

        assert_eq!(granted.len(), 2);
        assert!(granted.contains_name("Users"));
        assert!(granted.contains_name("Settings"));
    }

    #[test]
    fn grant_all() {
        let grant = GrantArgs { all: true, ..Default::default() };
        assert_eq!(grant.permission_set().unwrap().len(), 9);
    }

    #[test]
    fn unknown_module_is_an_error() {
        let grant = GrantArgs { modules: vec!["billing".into()], ..Default::default() };
        let err = grant.permission_set().unwrap_err();
        assert!(err.to_string().contains("billing"));
    }
}
