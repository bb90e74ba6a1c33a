//! # Effect Dispatcher
//!
//! Reactions to an inferred [`Outcome`]: a break notification (sound) and a
//! replacement grant. A returned jar needs nothing.
//!
//! Placement of granted items:
//!
//! ```text
//! backpack (as many units as fit)
//!   -> toolbelt (the rest, as many as fit)
//!     -> ground at the actor's feet, 120 s despawn, "inventory full" tooltip
//! ```
//!
//! A host failure anywhere in that chain ends the grant. Nothing is retried
//! and nothing is attempted twice at the same location.
//!
//! The same module owns the bulk refund path used by the craft queue
//! components: partial adds, overflow to the ground, one tooltip for the
//! whole batch.

use jarkeeper_economy::{ItemStack, SoundCue};
use jarkeeper_shared::{ActorId, DROP_DESPAWN_SECONDS, INVENTORY_FULL_TOOLTIP};

use crate::host::{guarded, Compartment, Host};
use crate::sampler::Outcome;

/// Where a granted stack ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrantOutcome {
    /// Every unit went into the inventory.
    Stored {
        /// Units added to the backpack.
        backpack: u32,
        /// Units added to the toolbelt.
        toolbelt: u32,
    },
    /// Part of the grant did not fit, or a host call failed midway.
    Partial {
        /// Units added to the backpack and toolbelt.
        stored: u32,
        /// Units dropped on the ground.
        dropped: u32,
    },
    /// Unknown item or a failed host call before anything was placed.
    Failed,
}

/// Totals of a bulk refund.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefundSummary {
    /// Units placed into a compartment.
    pub stored: u32,
    /// Units dropped on the ground.
    pub dropped: u32,
}

/// Item granted when a jar breaks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replacement {
    /// Catalog name.
    pub item: String,
    /// Units per break.
    pub count: u32,
}

/// Configured reactions for one interceptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectDispatcher {
    notification: Option<SoundCue>,
    replacement: Option<Replacement>,
}

impl EffectDispatcher {
    /// A dispatcher with the given reactions.
    #[must_use]
    pub const fn new(notification: Option<SoundCue>, replacement: Option<Replacement>) -> Self {
        Self {
            notification,
            replacement,
        }
    }

    /// Sound only.
    #[must_use]
    pub const fn notify_only(cue: SoundCue) -> Self {
        Self::new(Some(cue), None)
    }

    /// Replacement grant only.
    #[must_use]
    pub fn grant_only(item: impl Into<String>, count: u32) -> Self {
        Self::new(
            None,
            Some(Replacement {
                item: item.into(),
                count,
            }),
        )
    }

    /// Routes an outcome to its reaction.
    pub fn dispatch(&self, host: &mut dyn Host, actor: ActorId, outcome: Outcome) {
        match outcome {
            Outcome::Broken => self.on_broken(host, actor),
            Outcome::Returned => self.on_returned(host, actor),
        }
    }

    /// Runs every configured reaction for a broken jar.
    pub fn on_broken(&self, host: &mut dyn Host, actor: ActorId) {
        if let Some(cue) = &self.notification {
            play_cue(host, actor, cue);
        }
        if let Some(replacement) = &self.replacement {
            let outcome = grant(host, actor, &replacement.item, replacement.count);
            tracing::debug!(
                "Granted {} x{} to {actor}: {outcome:?}",
                replacement.item,
                replacement.count
            );
        }
    }

    /// A returned jar needs no reaction.
    pub fn on_returned(&self, _host: &mut dyn Host, actor: ActorId) {
        tracing::trace!("Jar returned to {actor}");
    }
}

/// Plays a cue: the custom file first, the game sound if that fails.
pub fn play_cue(host: &mut dyn Host, actor: ActorId, cue: &SoundCue) {
    if let SoundCue::Custom { path, .. } = cue {
        if guarded("play_custom_sound", host.play_custom_sound(actor, path)).is_some() {
            return;
        }
    }
    let _ = guarded("play_game_sound", host.play_game_sound(actor, cue.game_name()));
}

/// Grants `count` units of `item_name` to `actor`.
///
/// Each location takes as many units as it has room for. A host failure
/// stops the grant; units already stored stay where they are.
pub fn grant(host: &mut dyn Host, actor: ActorId, item_name: &str, count: u32) -> GrantOutcome {
    if count == 0 {
        return GrantOutcome::Failed;
    }
    let Some(item) = host.resolve_item(item_name) else {
        tracing::warn!("Cannot grant unknown item {item_name}");
        return GrantOutcome::Failed;
    };

    let mut placed = [0u32; 2];
    let mut remaining = count;
    for (index, compartment) in [Compartment::Backpack, Compartment::Toolbelt]
        .into_iter()
        .enumerate()
    {
        if remaining == 0 {
            break;
        }
        let attempt = ItemStack::new(item, remaining);
        let Some(leftover) = guarded("add_to", host.add_to(actor, compartment, attempt)) else {
            return partial_outcome(placed, 0);
        };
        let leftover = leftover.min(remaining);
        placed[index] = remaining - leftover;
        remaining = leftover;
    }

    if remaining == 0 {
        return GrantOutcome::Stored {
            backpack: placed[0],
            toolbelt: placed[1],
        };
    }
    let dropped = drop_overflow(host, actor, &[ItemStack::new(item, remaining)]);
    partial_outcome(placed, dropped)
}

fn partial_outcome(placed: [u32; 2], dropped: u32) -> GrantOutcome {
    let stored = placed[0] + placed[1];
    if stored == 0 && dropped == 0 {
        GrantOutcome::Failed
    } else {
        GrantOutcome::Partial { stored, dropped }
    }
}

/// Returns `stacks` to `actor`, topping up `target` first.
///
/// A backpack target spills into the toolbelt; every other target spills
/// straight to the ground. Ground drops share one tooltip.
pub fn refund_all(
    host: &mut dyn Host,
    actor: ActorId,
    target: Compartment,
    stacks: &[ItemStack],
) -> RefundSummary {
    let order: &[Compartment] = match target {
        Compartment::Backpack => &[Compartment::Backpack, Compartment::Toolbelt],
        Compartment::Toolbelt => &[Compartment::Toolbelt, Compartment::Backpack],
        Compartment::WorkstationInput => &[Compartment::WorkstationInput],
    };

    let mut summary = RefundSummary::default();
    let mut overflow = Vec::new();

    for stack in stacks.iter().filter(|stack| !stack.is_empty()) {
        let mut remaining = stack.count;
        for &compartment in order {
            if remaining == 0 {
                break;
            }
            let attempt = ItemStack::new(stack.item_id, remaining);
            // a failed add counts as nothing added
            let leftover = guarded("add_to", host.add_to(actor, compartment, attempt))
                .unwrap_or(remaining)
                .min(remaining);
            summary.stored += remaining - leftover;
            remaining = leftover;
        }
        if remaining > 0 {
            overflow.push(ItemStack::new(stack.item_id, remaining));
        }
    }

    summary.dropped = drop_overflow(host, actor, &overflow);
    summary
}

/// Drops `stacks` at the actor's feet with one tooltip. Returns the units
/// actually dropped.
fn drop_overflow(host: &mut dyn Host, actor: ActorId, stacks: &[ItemStack]) -> u32 {
    if stacks.is_empty() {
        return 0;
    }
    let Some(position) = guarded("actor_position", host.actor_position(actor)) else {
        return 0;
    };

    let mut dropped = 0u32;
    for &stack in stacks {
        if guarded(
            "drop_item",
            host.drop_item(stack, position, actor, DROP_DESPAWN_SECONDS),
        )
        .is_none()
        {
            break;
        }
        dropped = dropped.saturating_add(stack.count);
    }

    if dropped > 0 {
        host.show_tooltip(actor, INVENTORY_FULL_TOOLTIP);
    }
    dropped
}
