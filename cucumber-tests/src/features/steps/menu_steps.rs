use crate::features::world::{parse_names, parse_permissions, DashgateWorld};
use cucumber::{then, when};
use dashgate_core::navigation::derive_menu;

#[when(expr = "the menu is derived for {string}")]
async fn when_menu_derived(world: &mut DashgateWorld, permissions: String) {
    world.granted = parse_permissions(&permissions);
    world.menu = derive_menu(&world.registry, &world.granted);
}

#[when(expr = "the menu is derived for the session")]
async fn when_menu_for_session(world: &mut DashgateWorld) {
    world.granted = world.context.snapshot().permissions().clone();
    world.menu = derive_menu(&world.registry, &world.granted);
}

#[then(expr = "the menu lists {string}")]
async fn then_menu_lists(world: &mut DashgateWorld, names: String) {
    let actual: Vec<String> = world.menu.iter().map(|item| item.name.clone()).collect();
    assert_eq!(actual, parse_names(&names));
}

#[then(expr = "the menu is empty")]
async fn then_menu_empty(world: &mut DashgateWorld) {
    assert!(world.menu.is_empty(), "unexpected entries: {:?}", world.menu);
}

#[then(expr = "the entry {string} is active on {string}")]
async fn then_entry_active(world: &mut DashgateWorld, name: String, pathname: String) {
    let active: Vec<&str> = world
        .menu
        .iter()
        .filter(|item| item.is_active(&pathname))
        .map(|item| item.name.as_str())
        .collect();
    assert_eq!(active, vec![name.as_str()]);
}

#[then(expr = "the landing page is {string}")]
async fn then_landing(world: &mut DashgateWorld, path: String) {
    assert_eq!(world.registry.first_accessible_route(&world.granted), path);
}
