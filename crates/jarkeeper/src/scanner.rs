//! # Location Scanner
//!
//! Reads how much of an item sits at a location: the actor's backpack, the
//! actor's toolbelt, or the ground around the actor.
//!
//! Ground scans return the summed quantity of matching stacks, not mere
//! presence, so callers compare a delta against a baseline. A drop that was
//! already lying there before the consumption never counts as a return.
//!
//! Every failure (unknown item, actor gone, host raising) reads as 0.

use jarkeeper_economy::{ItemId, ItemStack};
use jarkeeper_shared::{ActorId, Bounds, Tick, GROUND_SCAN_RADIUS};

use crate::host::{guarded, Compartment, Host};

/// Where a sample was taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocationKind {
    /// The actor's backpack.
    PlayerInventory,
    /// The actor's toolbelt.
    PlayerToolbelt,
    /// Dropped items inside the scan cube around the actor.
    WorldGround,
}

/// A captured quantity of one item at one location. Immutable once taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleSnapshot {
    /// Item sampled.
    pub item: ItemId,
    /// Where it was sampled.
    pub location: LocationKind,
    /// How much was there.
    pub quantity: u32,
    /// When it was sampled.
    pub tick: Tick,
}

/// Quantity reader with a reusable scratch list for ground scans.
#[derive(Debug)]
pub struct LocationScanner {
    radius: f32,
    scratch: Vec<ItemStack>,
}

impl Default for LocationScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationScanner {
    /// Scanner using the standard ground radius.
    #[must_use]
    pub fn new() -> Self {
        Self::with_radius(GROUND_SCAN_RADIUS)
    }

    /// Scanner with a custom ground half-extent.
    #[must_use]
    pub fn with_radius(radius: f32) -> Self {
        Self {
            radius,
            scratch: Vec::with_capacity(32),
        }
    }

    /// Ground scan half-extent.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Current quantity of `item` at `location`.
    pub fn count_at(
        &mut self,
        host: &dyn Host,
        actor: ActorId,
        item: ItemId,
        location: LocationKind,
    ) -> u32 {
        if item == 0 {
            return 0;
        }

        match location {
            LocationKind::PlayerInventory => {
                guarded("count_in", host.count_in(actor, Compartment::Backpack, item)).unwrap_or(0)
            }
            LocationKind::PlayerToolbelt => {
                guarded("count_in", host.count_in(actor, Compartment::Toolbelt, item)).unwrap_or(0)
            }
            LocationKind::WorldGround => self.count_on_ground(host, actor, item),
        }
    }

    /// Same as [`count_at`](Self::count_at), resolving the item by name.
    pub fn count_named(
        &mut self,
        host: &dyn Host,
        actor: ActorId,
        name: &str,
        location: LocationKind,
    ) -> u32 {
        host.resolve_item(name)
            .map_or(0, |item| self.count_at(host, actor, item, location))
    }

    /// Takes an immutable snapshot.
    pub fn sample(
        &mut self,
        host: &dyn Host,
        actor: ActorId,
        item: ItemId,
        location: LocationKind,
        tick: Tick,
    ) -> SampleSnapshot {
        SampleSnapshot {
            item,
            location,
            quantity: self.count_at(host, actor, item, location),
            tick,
        }
    }

    fn count_on_ground(&mut self, host: &dyn Host, actor: ActorId, item: ItemId) -> u32 {
        let Some(center) = guarded("actor_position", host.actor_position(actor)) else {
            return 0;
        };

        self.scratch.clear();
        let bounds = Bounds::cube(center, self.radius);
        if guarded("dropped_items_in", host.dropped_items_in(bounds, &mut self.scratch)).is_none() {
            return 0;
        }

        self.scratch
            .iter()
            .filter(|stack| stack.item_id == item)
            .fold(0u32, |total, stack| total.saturating_add(stack.count))
    }
}
