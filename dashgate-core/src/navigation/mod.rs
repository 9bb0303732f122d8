//! Dashboard navigation
//!
//! Route registry, route guard and menu derivation. Everything here is a pure
//! function of the route registry and an [`AuthorizationState`] snapshot.
//!
//! [`AuthorizationState`]: crate::rbac::AuthorizationState

pub mod guard;
pub mod menu;
pub mod paths;
pub mod registry;

pub use guard::{ComponentGate, GuardDecision, GuardWatch, NotFoundExit, RouteGuard};
pub use menu::{derive_menu, Icon, Menu, MenuItem};
pub use paths::{matches_segment_prefix, matches_under_root, NavigationPaths};
pub use registry::{RegistryError, Route, RouteRegistry, RouteRegistryBuilder};
