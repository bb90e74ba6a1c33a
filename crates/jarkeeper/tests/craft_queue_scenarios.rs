//! # Craft Queue Scenarios
//!
//! Admission grants and cancel refunds against the simulated host.
//!
//! Run with: cargo test -p jarkeeper --test craft_queue_scenarios

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use jarkeeper::economy::{ItemStack, QueueEntry, Recipe, RecipeId, RecipeIngredient, WorkstationKind};
use jarkeeper::shared::{Vec3, INVENTORY_FULL_TOOLTIP};
use jarkeeper::sim::{
    standard_items, SimHost, Simulation, RECIPE_BANDAGE, RECIPE_BOIL_WATER, RECIPE_GOLDENROD_TEA,
    RECIPE_MEAT_STEW,
};
use jarkeeper::{Compartment, HookVerdict, Host};

const WATER: &str = "drinkJarBoiledWater";
const RIVER: &str = "drinkJarRiverWater";
const JAR: &str = "drinkJarEmpty";
const MEAT: &str = "foodRawMeat";
const ROCK: &str = "resourceRockSmall";
const HONEY: &str = "foodHoney";
const HONEY_JAR: &str = "customHoneyJar";
const RECIPE_HONEY_STEW: RecipeId = 10;

fn stocked(slots: usize, workstation: WorkstationKind) -> (Simulation, jarkeeper::shared::ActorId) {
    let mut sim = Simulation::new(3);
    let player = sim.spawn_player(Vec3::ZERO);
    let host = sim.host_mut();
    host.open_queue(player, slots, workstation);
    let source = match workstation {
        WorkstationKind::InputGrid => Compartment::WorkstationInput,
        _ => Compartment::Backpack,
    };
    host.give(player, source, WATER, 6);
    host.give(player, source, RIVER, 4);
    host.give(player, source, MEAT, 12);
    host.give(player, source, "resourceGoldenrod", 4);
    host.give(player, source, "resourceCloth", 10);
    (sim, player)
}

// ============================================================================
// ADMISSION
// ============================================================================

#[test]
fn verify_admitted_craft_returns_jars() {
    let (mut sim, player) = stocked(4, WorkstationKind::Backpack);

    assert!(sim.craft(player, RECIPE_MEAT_STEW, 3).unwrap());

    assert_eq!(sim.host().carried(player, JAR), 3);
    assert_eq!(sim.host().count(player, Compartment::Backpack, WATER), 3);
    assert_eq!(sim.host().count(player, Compartment::Backpack, MEAT), 6);
}

#[test]
fn verify_rejected_craft_grants_nothing() {
    let (mut sim, player) = stocked(1, WorkstationKind::Backpack);

    assert!(sim.craft(player, RECIPE_MEAT_STEW, 1).unwrap());
    assert_eq!(sim.host().carried(player, JAR), 1);

    assert!(!sim.craft(player, RECIPE_MEAT_STEW, 2).unwrap());
    assert_eq!(sim.host().carried(player, JAR), 1);
    assert_eq!(sim.host().count(player, Compartment::Backpack, WATER), 5);
}

#[test]
fn verify_container_based_output_keeps_jar() {
    let (mut sim, player) = stocked(4, WorkstationKind::Backpack);

    assert!(sim.craft(player, RECIPE_BOIL_WATER, 2).unwrap());
    assert!(sim.craft(player, RECIPE_GOLDENROD_TEA, 1).unwrap());

    assert_eq!(sim.host().carried(player, JAR), 0);
}

#[test]
fn verify_no_open_queue_is_rejected() {
    let (mut sim, player) = stocked(2, WorkstationKind::Backpack);
    sim.host_mut().close_queue(player);

    assert!(!sim.craft(player, RECIPE_MEAT_STEW, 1).unwrap());
    assert_eq!(sim.host().carried(player, JAR), 0);
}

#[test]
fn verify_jar_grant_overflows_to_ground() {
    let (mut sim, player) = stocked(2, WorkstationKind::Backpack);
    sim.host_mut().fill_inventory(player, "resourceRockSmall");

    assert!(sim.craft(player, RECIPE_MEAT_STEW, 2).unwrap());

    assert_eq!(sim.host().carried(player, JAR), 0);
    assert_eq!(sim.host().ground_count(JAR), 2);
    assert_eq!(sim.host().tooltips(), [(player, INVENTORY_FULL_TOOLTIP.to_string())]);
}

#[test]
fn verify_jar_grant_splits_across_backpack_and_toolbelt() {
    let mut sim = Simulation::new(3);
    let player = sim.spawn_player(Vec3::ZERO);
    let host = sim.host_mut();
    host.open_queue(player, 1, WorkstationKind::InputGrid);
    host.give(player, Compartment::WorkstationInput, WATER, 12);
    host.give(player, Compartment::WorkstationInput, MEAT, 24);
    // one free slot left in each compartment, ten jars of room apiece
    host.give(player, Compartment::Backpack, ROCK, 64 * 23);
    host.give(player, Compartment::Toolbelt, ROCK, 64 * 9);

    assert!(sim.craft(player, RECIPE_MEAT_STEW, 12).unwrap());

    let host = sim.host();
    assert_eq!(host.carried(player, JAR), 12);
    assert_eq!(host.count(player, Compartment::Backpack, JAR), 10);
    assert_eq!(host.count(player, Compartment::Toolbelt, JAR), 2);
    assert_eq!(host.ground_count(JAR), 0);
    assert!(host.tooltips().is_empty());
}

// ============================================================================
// CANCEL
// ============================================================================

#[test]
fn verify_cancel_skips_content_refund() {
    let (mut sim, player) = stocked(2, WorkstationKind::Backpack);
    sim.craft(player, RECIPE_MEAT_STEW, 2).unwrap();
    assert_eq!(sim.host().count(player, Compartment::Backpack, MEAT), 8);

    assert_eq!(sim.cancel(player, 0), Some(HookVerdict::SkipOriginal));

    let host = sim.host();
    assert_eq!(host.count(player, Compartment::Backpack, MEAT), 12);
    // water stays consumed; its two jars were handed back on admission
    assert_eq!(host.count(player, Compartment::Backpack, WATER), 4);
    assert_eq!(host.carried(player, JAR), 2);
    assert_eq!(host.craft_queue_occupancy(player), Some(0));
}

#[test]
fn verify_cancel_container_based_defers_to_host() {
    let (mut sim, player) = stocked(2, WorkstationKind::Backpack);
    sim.craft(player, RECIPE_BOIL_WATER, 2).unwrap();
    assert_eq!(sim.host().count(player, Compartment::Backpack, RIVER), 2);

    assert_eq!(sim.cancel(player, 0), Some(HookVerdict::Continue));

    assert_eq!(sim.host().count(player, Compartment::Backpack, RIVER), 4);
    assert_eq!(sim.host().craft_queue_occupancy(player), Some(0));
}

#[test]
fn verify_cancel_forge_defers_to_host() {
    let (mut sim, player) = stocked(2, WorkstationKind::MaterialGrid);
    sim.craft(player, RECIPE_MEAT_STEW, 1).unwrap();

    assert_eq!(sim.cancel(player, 0), Some(HookVerdict::Continue));
    // the host's own cancel refunds the water as well
    assert_eq!(sim.host().count(player, Compartment::Backpack, WATER), 6);
}

#[test]
fn verify_cancel_refunds_into_input_grid() {
    let (mut sim, player) = stocked(2, WorkstationKind::InputGrid);
    assert!(sim.craft(player, RECIPE_BANDAGE, 2).unwrap());
    assert_eq!(sim.host().count(player, Compartment::WorkstationInput, "resourceCloth"), 6);

    assert_eq!(sim.cancel(player, 0), Some(HookVerdict::SkipOriginal));
    assert_eq!(sim.host().count(player, Compartment::WorkstationInput, "resourceCloth"), 10);
    assert_eq!(sim.host().count(player, Compartment::Backpack, "resourceCloth"), 0);
}

#[test]
fn verify_cancel_returns_repair_item_and_drops_overflow() {
    let (mut sim, player) = stocked(2, WorkstationKind::Backpack);
    let rock = sim.host().resolve_item("resourceRockSmall").unwrap();
    let entry = QueueEntry::new(RECIPE_MEAT_STEW, 2).with_original_item(ItemStack::new(rock, 1));
    assert!(sim.host_mut().enqueue_entry(player, entry).unwrap());
    sim.host_mut().fill_inventory(player, "resourceRockSmall");

    assert_eq!(sim.cancel(player, 0), Some(HookVerdict::SkipOriginal));

    let host = sim.host();
    // meat tops up its own stack, the repaired rock has nowhere to go
    assert_eq!(host.count(player, Compartment::Backpack, MEAT), 12);
    assert_eq!(host.ground_count("resourceRockSmall"), 1);
    assert_eq!(host.ground_count(WATER), 0);
    assert_eq!(host.tooltips().len(), 1);
    assert_eq!(host.craft_queue_occupancy(player), Some(0));
}

#[test]
fn verify_cancel_empty_slot() {
    let (mut sim, player) = stocked(2, WorkstationKind::Backpack);
    assert_eq!(sim.cancel(player, 1), None);
}

#[test]
fn verify_failed_clear_refunds_nothing() {
    let (mut sim, player) = stocked(2, WorkstationKind::Backpack);
    let rock = sim.host().resolve_item(ROCK).unwrap();
    let entry = QueueEntry::new(RECIPE_MEAT_STEW, 1).with_original_item(ItemStack::new(rock, 1));
    assert!(sim.host_mut().enqueue_entry(player, entry).unwrap());
    assert_eq!(sim.host().count(player, Compartment::Backpack, MEAT), 10);

    sim.host_mut().fail_on("clear_queue_entry");
    for _ in 0..3 {
        assert_eq!(sim.cancel(player, 0), Some(HookVerdict::SkipOriginal));
    }

    let host = sim.host();
    assert_eq!(host.count(player, Compartment::Backpack, MEAT), 10);
    assert_eq!(host.carried(player, ROCK), 0);
    assert_eq!(host.craft_queue_occupancy(player), Some(1));
    assert!(host.drops().is_empty());
    assert!(host.tooltips().is_empty());

    // once the host clears the entry the refund goes through exactly once
    sim.host_mut().clear_failures();
    assert_eq!(sim.cancel(player, 0), Some(HookVerdict::SkipOriginal));
    assert_eq!(sim.host().count(player, Compartment::Backpack, MEAT), 12);
    assert_eq!(sim.host().carried(player, ROCK), 1);
    assert_eq!(sim.host().craft_queue_occupancy(player), Some(0));
    assert_eq!(sim.cancel(player, 0), None);
}

// ============================================================================
// MOD DIRECTORY
// ============================================================================

fn write_mod_config(mod_dir: &Path) {
    let config_dir = mod_dir.join("Config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("jar_contents.toml"),
        "[[item]]\nname = \"foodHoney\"\njar = \"customHoneyJar\"\n",
    )
    .unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "notify_enabled = false\nreward_count = 2\n",
    )
    .unwrap();
}

fn honey_host() -> SimHost {
    let mut items = standard_items();
    items.register(HONEY_JAR, 10, None).unwrap();
    let catalog = Arc::new(items);
    let id = |name: &str| catalog.resolve(name).unwrap();
    let honey_stew = Recipe::new(
        RECIPE_HONEY_STEW,
        "Honey Stew".to_string(),
        vec![RecipeIngredient::new(id(HONEY), 1), RecipeIngredient::new(id(MEAT), 2)],
        RecipeIngredient::new(id("foodMeatStew"), 1),
    )
    .unwrap();

    let mut host = SimHost::new(Arc::clone(&catalog), 3);
    host.add_recipe(honey_stew).unwrap();
    host
}

#[test]
fn verify_mod_dir_override_drives_grant_and_cancel() {
    let mod_dir = TempDir::new().unwrap();
    write_mod_config(mod_dir.path());

    let mut sim = Simulation::from_mod_dir(honey_host(), mod_dir.path());
    assert_eq!(sim.keeper().registry().override_count(), 1);
    assert!(!sim.keeper().settings().notify_enabled);
    assert_eq!(sim.keeper().settings().reward_count, 2);

    let player = sim.spawn_player(Vec3::ZERO);
    sim.host_mut().open_queue(player, 2, WorkstationKind::Backpack);
    sim.host_mut().give(player, Compartment::Backpack, HONEY, 3);
    sim.host_mut().give(player, Compartment::Backpack, MEAT, 6);

    assert!(sim.craft(player, RECIPE_HONEY_STEW, 3).unwrap());
    assert_eq!(sim.host().carried(player, HONEY_JAR), 3);
    assert_eq!(sim.host().carried(player, JAR), 0);

    assert_eq!(sim.cancel(player, 0), Some(HookVerdict::SkipOriginal));
    let host = sim.host();
    assert_eq!(host.count(player, Compartment::Backpack, MEAT), 6);
    // the honey's jar already came back on admission
    assert_eq!(host.carried(player, HONEY), 0);
    assert_eq!(host.carried(player, HONEY_JAR), 3);
}

#[test]
fn verify_empty_mod_dir_leaves_honey_alone() {
    let mod_dir = TempDir::new().unwrap();

    let mut sim = Simulation::from_mod_dir(honey_host(), mod_dir.path());
    assert_eq!(sim.keeper().registry().override_count(), 0);
    assert!(sim.keeper().settings().notify_enabled);

    let player = sim.spawn_player(Vec3::ZERO);
    sim.host_mut().open_queue(player, 2, WorkstationKind::Backpack);
    sim.host_mut().give(player, Compartment::Backpack, HONEY, 1);
    sim.host_mut().give(player, Compartment::Backpack, MEAT, 2);

    assert!(sim.craft(player, RECIPE_HONEY_STEW, 1).unwrap());
    assert_eq!(sim.host().carried(player, HONEY_JAR), 0);

    assert_eq!(sim.cancel(player, 0), Some(HookVerdict::SkipOriginal));
    assert_eq!(sim.host().carried(player, HONEY), 1);
    assert_eq!(sim.host().carried(player, MEAT), 2);
}
