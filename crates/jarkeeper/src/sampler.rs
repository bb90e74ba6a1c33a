//! # Outcome Sampler
//!
//! Decides after the fact whether a consumed jar came back.
//!
//! The host never reports the survival roll. What it does do is hand the
//! container back a little later: into the backpack or toolbelt when there is
//! room, onto the ground at the actor's feet when there is not. So:
//!
//! ```text
//! begin    before = backpack + toolbelt count of the container
//!          had_capacity = can one more unit stack into backpack or toolbelt?
//!          ground_before = ground count, only when !had_capacity
//!
//! resolve  (>= 3 ticks later)
//!          after > before                        -> Returned
//!          !had_capacity && ground > baseline    -> Returned
//!          otherwise                             -> Broken
//! ```
//!
//! The ground scan is the expensive one and is skipped whenever the
//! inventory had room.

use jarkeeper_economy::{ConsumeAction, ItemId, ItemStack};
use jarkeeper_shared::{ActorId, Tick, REFUND_CHECK_DELAY_TICKS};

use crate::host::{guarded, Compartment, Host};
use crate::scanner::{LocationKind, LocationScanner, SampleSnapshot};

/// Inferred fate of a consumed container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The container survived and was handed back.
    Returned,
    /// The container broke.
    Broken,
}

/// Before-snapshots of both inventory locations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InventorySample {
    /// Backpack quantity.
    pub backpack: SampleSnapshot,
    /// Toolbelt quantity.
    pub toolbelt: SampleSnapshot,
}

impl InventorySample {
    /// Summed quantity over both locations.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.backpack.quantity.saturating_add(self.toolbelt.quantity)
    }
}

/// A tracked consumption, captured at begin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsumptionEvent {
    /// Who consumed.
    pub actor: ActorId,
    /// Container item handed back on survival.
    pub container: ItemId,
    /// Container catalog name.
    pub container_name: String,
    /// Inventory quantity before consumption.
    pub before: InventorySample,
    /// Whether one more container would have fit in the inventory.
    pub had_capacity: bool,
    /// Ground quantity before consumption. Only taken without capacity.
    pub ground_before: Option<SampleSnapshot>,
    /// Tick of begin.
    pub begun_at: Tick,
    /// Earliest tick resolution may run.
    pub resume_at: Tick,
}

/// Result of [`OutcomeSampler::begin`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TrackingToken {
    /// Nothing to track: the action is not refund-eligible or the container
    /// is unknown.
    #[default]
    Inactive,
    /// A consumption under observation.
    Active(ConsumptionEvent),
}

impl TrackingToken {
    /// Returns true for a tracked consumption.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// The tracked event, if any.
    #[must_use]
    pub const fn event(&self) -> Option<&ConsumptionEvent> {
        match self {
            Self::Active(event) => Some(event),
            Self::Inactive => None,
        }
    }
}

/// Stateless before/after classifier.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutcomeSampler;

impl OutcomeSampler {
    /// Creates a sampler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Captures the before state of a consumption.
    ///
    /// Returns [`TrackingToken::Inactive`] unless `action` is
    /// container-refund-eligible and its container is a known item.
    pub fn begin(
        self,
        host: &dyn Host,
        scanner: &mut LocationScanner,
        now: Tick,
        actor: ActorId,
        action: &ConsumeAction,
    ) -> TrackingToken {
        let Some(container_name) = action.refund_container() else {
            return TrackingToken::Inactive;
        };
        let Some(container) = host.resolve_item(container_name) else {
            tracing::debug!("Container {container_name} is not a known item - not tracking");
            return TrackingToken::Inactive;
        };

        let before = InventorySample {
            backpack: scanner.sample(host, actor, container, LocationKind::PlayerInventory, now),
            toolbelt: scanner.sample(host, actor, container, LocationKind::PlayerToolbelt, now),
        };

        let had_capacity = has_room_for_one(host, actor, container);
        let ground_before = if had_capacity {
            None
        } else {
            Some(scanner.sample(host, actor, container, LocationKind::WorldGround, now))
        };

        tracing::debug!(
            "Tracking {container_name} for {actor}: before={} capacity={had_capacity} ground={:?}",
            before.total(),
            ground_before.map(|g| g.quantity)
        );

        TrackingToken::Active(ConsumptionEvent {
            actor,
            container,
            container_name: container_name.to_string(),
            before,
            had_capacity,
            ground_before,
            begun_at: now,
            resume_at: now.saturating_add(REFUND_CHECK_DELAY_TICKS),
        })
    }

    /// Classifies a tracked consumption.
    ///
    /// Returns `None` for an inactive token, an actor that left the world,
    /// or a call made before the token's resume tick.
    pub fn resolve(
        self,
        host: &dyn Host,
        scanner: &mut LocationScanner,
        now: Tick,
        token: &TrackingToken,
    ) -> Option<Outcome> {
        let event = token.event()?;

        if !host.is_actor_valid(event.actor) {
            tracing::debug!("{} left the world before resolution", event.actor);
            return None;
        }
        if now < event.resume_at {
            tracing::warn!(
                "Resolution of {} for {} at tick {now} is early (due {})",
                event.container_name,
                event.actor,
                event.resume_at
            );
            return None;
        }

        let after = scanner
            .count_at(host, event.actor, event.container, LocationKind::PlayerInventory)
            .saturating_add(scanner.count_at(
                host,
                event.actor,
                event.container,
                LocationKind::PlayerToolbelt,
            ));

        if after > event.before.total() {
            tracing::debug!(
                "{} returned to inventory ({} -> {after})",
                event.container_name,
                event.before.total()
            );
            return Some(Outcome::Returned);
        }

        if let Some(baseline) = event.ground_before {
            let ground =
                scanner.count_at(host, event.actor, event.container, LocationKind::WorldGround);
            if ground > baseline.quantity {
                tracing::debug!(
                    "{} returned to the ground ({} -> {ground})",
                    event.container_name,
                    baseline.quantity
                );
                return Some(Outcome::Returned);
            }
        }

        tracing::debug!("{} broke", event.container_name);
        Some(Outcome::Broken)
    }
}

/// Capacity test for one unit in backpack or toolbelt. A failing host call
/// counts as no room, which keeps the ground scan in play.
fn has_room_for_one(host: &dyn Host, actor: ActorId, container: ItemId) -> bool {
    let one = ItemStack::new(container, 1);
    [Compartment::Backpack, Compartment::Toolbelt]
        .into_iter()
        .any(|compartment| guarded("can_stack", host.can_stack(actor, compartment, one)).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimHost;
    use jarkeeper_shared::Vec3;

    const JAR: &str = "drinkJarEmpty";

    fn water() -> ConsumeAction {
        ConsumeAction::jar_refund(JAR)
    }

    #[test]
    fn test_ineligible_actions_are_inactive() {
        let mut host = SimHost::with_standard_items(1);
        let actor = host.spawn_player(Vec3::ZERO);
        let mut scanner = LocationScanner::new();
        let sampler = OutcomeSampler::new();

        assert_eq!(
            sampler.begin(&host, &mut scanner, 0, actor, &ConsumeAction::plain()),
            TrackingToken::Inactive
        );
        assert_eq!(
            sampler.begin(&host, &mut scanner, 0, actor, &ConsumeAction::jar_refund("noSuchJar")),
            TrackingToken::Inactive
        );
        assert_eq!(sampler.resolve(&host, &mut scanner, 10, &TrackingToken::Inactive), None);
    }

    #[test]
    fn test_inventory_increase_is_returned() {
        let mut host = SimHost::with_standard_items(1);
        let actor = host.spawn_player(Vec3::ZERO);
        host.give(actor, Compartment::Toolbelt, JAR, 2);
        let mut scanner = LocationScanner::new();
        let sampler = OutcomeSampler::new();

        let token = sampler.begin(&host, &mut scanner, 5, actor, &water());
        let event = token.event().unwrap();
        assert_eq!(event.before.total(), 2);
        assert!(event.had_capacity);
        assert!(event.ground_before.is_none());
        assert_eq!(event.begun_at, 5);
        assert_eq!(event.resume_at, 8);

        host.give(actor, Compartment::Backpack, JAR, 1);
        assert_eq!(sampler.resolve(&host, &mut scanner, 8, &token), Some(Outcome::Returned));
    }

    #[test]
    fn test_no_change_is_broken_and_skips_ground_with_capacity() {
        let mut host = SimHost::with_standard_items(1);
        let actor = host.spawn_player(Vec3::ZERO);
        let mut scanner = LocationScanner::new();
        let sampler = OutcomeSampler::new();

        let token = sampler.begin(&host, &mut scanner, 0, actor, &water());
        // a jar landing nearby does not count while the bag had room
        host.place_on_ground(JAR, 1, Vec3::ZERO);
        assert_eq!(sampler.resolve(&host, &mut scanner, 3, &token), Some(Outcome::Broken));
    }

    #[test]
    fn test_full_inventory_uses_ground_delta() {
        let mut host = SimHost::with_standard_items(1);
        let actor = host.spawn_player(Vec3::ZERO);
        host.fill_inventory(actor, "resourceRockSmall");
        host.place_on_ground(JAR, 2, Vec3::new(1.0, 0.0, 1.0));
        let mut scanner = LocationScanner::new();
        let sampler = OutcomeSampler::new();

        let token = sampler.begin(&host, &mut scanner, 0, actor, &water());
        let event = token.event().unwrap();
        assert!(!event.had_capacity);
        assert_eq!(event.ground_before.map(|g| g.quantity), Some(2));

        // pre-existing drops alone are not a return
        assert_eq!(sampler.resolve(&host, &mut scanner, 3, &token), Some(Outcome::Broken));

        host.place_on_ground(JAR, 1, Vec3::ZERO);
        assert_eq!(sampler.resolve(&host, &mut scanner, 3, &token), Some(Outcome::Returned));
    }

    #[test]
    fn test_early_or_orphaned_resolution_is_none() {
        let mut host = SimHost::with_standard_items(1);
        let actor = host.spawn_player(Vec3::ZERO);
        let mut scanner = LocationScanner::new();
        let sampler = OutcomeSampler::new();

        let token = sampler.begin(&host, &mut scanner, 0, actor, &water());
        assert_eq!(sampler.resolve(&host, &mut scanner, 2, &token), None);

        host.despawn(actor);
        assert_eq!(sampler.resolve(&host, &mut scanner, 3, &token), None);
    }

    #[test]
    fn test_capacity_probe_failure_keeps_ground_check() {
        let mut host = SimHost::with_standard_items(1);
        let actor = host.spawn_player(Vec3::ZERO);
        host.fail_on("can_stack");
        let mut scanner = LocationScanner::new();

        let token = OutcomeSampler::new().begin(&host, &mut scanner, 0, actor, &water());
        let event = token.event().unwrap();
        assert!(!event.had_capacity);
        assert!(event.ground_before.is_some());
    }
}
