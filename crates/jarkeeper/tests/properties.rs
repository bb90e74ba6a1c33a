//! # Property Checks
//!
//! Invariants that must hold for any input:
//!
//! - one consumption produces at most one set of reactions
//! - a rejected craft never hands out a container
//! - admission is exactly "occupancy strictly increased"
//! - a resolved content name never hits the item catalog again
//!
//! Run with: cargo test -p jarkeeper --test properties

use proptest::prelude::*;

use jarkeeper::craft_queue::classify;
use jarkeeper::economy::{JarContentRegistry, JarContentsConfig, WorkstationKind};
use jarkeeper::shared::Vec3;
use jarkeeper::sim::{standard_catalog, Simulation, RECIPE_MEAT_STEW};
use jarkeeper::{Admission, Compartment, ConsumptionKind, QueueSnapshot};

const WATER: &str = "drinkJarBoiledWater";
const JAR: &str = "drinkJarEmpty";
const GLASS: &str = "resourceBrokenGlass";

fn kind(animated: bool) -> ConsumptionKind {
    if animated {
        ConsumptionKind::Animated
    } else {
        ConsumptionKind::Instant
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn verify_extra_completions_never_repeat_effects(
        seed in any::<u64>(),
        survival in 0u8..=100,
        extra in 0usize..6,
        animated in any::<bool>(),
    ) {
        let mut sim = Simulation::new(seed);
        sim.host_mut().set_survival_percent(survival);
        let player = sim.spawn_player(Vec3::ZERO);
        sim.host_mut().give(player, Compartment::Backpack, WATER, 1);

        let call = sim.begin_drink(player, WATER, kind(animated)).unwrap();
        sim.complete_drink(&call, kind(animated)).unwrap();
        for _ in 0..extra {
            sim.fire_complete(&call, kind(animated));
        }
        sim.run_ticks(10);

        let host = sim.host();
        let glass = host.carried(player, GLASS) + host.ground_count(GLASS);
        let jars = host.carried(player, JAR) + host.ground_count(JAR);
        prop_assert!(glass <= 1);
        prop_assert!(host.sounds().len() <= 1);
        // exactly one of: the jar came back, or it broke and was replaced
        prop_assert_eq!(jars + glass, 1);
        prop_assert_eq!(sim.keeper().pending_continuations(), 0);
    }

    #[test]
    fn verify_rejected_crafts_grant_nothing(
        slots in 1usize..5,
        craft_count in 1u32..5,
        attempts in 1usize..4,
    ) {
        let mut sim = Simulation::new(11);
        let player = sim.spawn_player(Vec3::ZERO);
        sim.host_mut().open_queue(player, slots, WorkstationKind::Backpack);
        sim.host_mut().give(player, Compartment::Backpack, WATER, 60);
        sim.host_mut().give(player, Compartment::Backpack, "foodRawMeat", 640);

        for _ in 0..slots {
            prop_assert!(sim.craft(player, RECIPE_MEAT_STEW, 1).unwrap());
        }
        let granted = sim.host().carried(player, JAR);
        prop_assert_eq!(granted, u32::try_from(slots).unwrap());

        for _ in 0..attempts {
            prop_assert!(!sim.craft(player, RECIPE_MEAT_STEW, craft_count).unwrap());
        }
        prop_assert_eq!(sim.host().carried(player, JAR), granted);
        prop_assert_eq!(sim.host().ground_count(JAR), 0);
    }

    #[test]
    fn verify_admission_iff_occupancy_grew(
        before in proptest::option::of(0u32..16),
        after in proptest::option::of(0u32..16),
    ) {
        let admission = classify(
            before.map(|occupied| QueueSnapshot { occupied }),
            after.map(|occupied| QueueSnapshot { occupied }),
        );
        let grew = matches!((before, after), (Some(b), Some(a)) if a > b);
        prop_assert_eq!(admission == Admission::Admitted, grew);
    }

    #[test]
    fn verify_resolution_is_memoized(
        names in proptest::collection::vec(
            prop::sample::select(vec![
                "drinkJarBoiledWater",
                "DRINKJARRIVERWATER",
                "drinkCanWater",
                "foodHoney",
                "notAnItem",
            ]),
            1..12,
        ),
    ) {
        let registry = JarContentRegistry::new(&JarContentsConfig::default(), standard_catalog());

        let first: Vec<_> = names.iter().map(|name| registry.resolve_container(name)).collect();
        let introspections = registry.introspections();
        let second: Vec<_> = names.iter().map(|name| registry.resolve_container(name)).collect();

        prop_assert_eq!(first, second);
        prop_assert_eq!(registry.introspections(), introspections);
    }
}
