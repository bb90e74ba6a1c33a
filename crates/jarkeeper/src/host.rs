//! # Host Boundary
//!
//! Everything the inference engine needs from a host engine, as one object
//! safe trait. The engine only ever holds `&dyn Host` / `&mut dyn Host`, so
//! the same logic runs against a real game and against [`crate::sim`].
//!
//! Host calls can fail (the engine may throw from inside an inventory call).
//! Call sites never match on those failures themselves: they pass the result
//! through [`guarded`], which logs once at warning level and turns the
//! failure into `None`. The caller then skips whatever would have followed.
//! Nothing is retried.

use std::path::Path;

use jarkeeper_economy::{ItemId, ItemStack};
use jarkeeper_shared::{ActorId, Bounds, Vec3};
use thiserror::Error;

/// Storage areas of an actor the engine can read and write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compartment {
    /// Main inventory (bag).
    Backpack,
    /// Quick-slot bar.
    Toolbelt,
    /// Input grid of the workstation the actor has open.
    WorkstationInput,
}

impl Compartment {
    /// Stable name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Backpack => "backpack",
            Self::Toolbelt => "toolbelt",
            Self::WorkstationInput => "workstation input",
        }
    }
}

/// A failed host call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host raised while executing `op`.
    #[error("host call {op} failed: {reason}")]
    CallFailed {
        /// Operation name.
        op: &'static str,
        /// What the host reported.
        reason: String,
    },

    /// The actor is no longer part of the world.
    #[error("{0} is not in the world")]
    ActorGone(ActorId),
}

/// Result type for host calls.
pub type HostResult<T> = Result<T, HostError>;

/// Fallible-call adapter.
///
/// The single place where host failures are logged. Returns `None` on
/// failure so the caller can stop the operation it was part of.
pub fn guarded<T>(op: &'static str, call: HostResult<T>) -> Option<T> {
    match call {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("{op}: {e}");
            None
        }
    }
}

/// Services consumed from the host engine.
pub trait Host {
    // ------------------------------------------------------------------
    // Item catalog
    // ------------------------------------------------------------------

    /// Resolves an item name. Unknown names are `None`, never an error.
    fn resolve_item(&self, name: &str) -> Option<ItemId>;

    // ------------------------------------------------------------------
    // Actors
    // ------------------------------------------------------------------

    /// Whether the actor still exists in the world.
    fn is_actor_valid(&self, actor: ActorId) -> bool;

    /// Whether the actor is the locally controlled player.
    fn is_local_player(&self, actor: ActorId) -> bool;

    /// World position of the actor.
    ///
    /// # Errors
    ///
    /// Fails when the actor is gone.
    fn actor_position(&self, actor: ActorId) -> HostResult<Vec3>;

    // ------------------------------------------------------------------
    // Inventories
    // ------------------------------------------------------------------

    /// Total quantity of `item` in one compartment.
    ///
    /// # Errors
    ///
    /// Fails when the host raises during the query.
    fn count_in(&self, actor: ActorId, compartment: Compartment, item: ItemId) -> HostResult<u32>;

    /// Whether the whole stack fits into the compartment.
    ///
    /// # Errors
    ///
    /// Fails when the host raises during the query.
    fn can_stack(&self, actor: ActorId, compartment: Compartment, stack: ItemStack)
        -> HostResult<bool>;

    /// Adds as much of the stack as fits; returns the leftover count.
    ///
    /// # Errors
    ///
    /// Fails when the host raises; nothing was added in that case.
    fn add_to(&mut self, actor: ActorId, compartment: Compartment, stack: ItemStack)
        -> HostResult<u32>;

    // ------------------------------------------------------------------
    // World ground
    // ------------------------------------------------------------------

    /// Appends every dropped-item stack lying inside `bounds` to `out`.
    ///
    /// # Errors
    ///
    /// Fails when the host raises during the query.
    fn dropped_items_in(&self, bounds: Bounds, out: &mut Vec<ItemStack>) -> HostResult<()>;

    /// Spawns a dropped item that despawns after `despawn_seconds`.
    ///
    /// # Errors
    ///
    /// Fails when the host raises; nothing was spawned in that case.
    fn drop_item(
        &mut self,
        stack: ItemStack,
        position: Vec3,
        owner: ActorId,
        despawn_seconds: f32,
    ) -> HostResult<()>;

    // ------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------

    /// Shows a transient on-screen message by localization key.
    fn show_tooltip(&mut self, actor: ActorId, key: &str);

    /// Plays a sound file at the actor.
    ///
    /// # Errors
    ///
    /// Fails when the clip is not loaded or playback raises.
    fn play_custom_sound(&mut self, actor: ActorId, path: &Path) -> HostResult<()>;

    /// Plays a sound from the host's own sound table inside the actor's head.
    ///
    /// # Errors
    ///
    /// Fails when the host raises.
    fn play_game_sound(&mut self, actor: ActorId, name: &str) -> HostResult<()>;

    // ------------------------------------------------------------------
    // Crafting queue
    // ------------------------------------------------------------------

    /// Occupied slots of the crafting queue the actor has open, or `None`
    /// when no crafting window is showing.
    fn craft_queue_occupancy(&self, actor: ActorId) -> Option<u32>;

    /// Empties a queue slot without any refund.
    ///
    /// # Errors
    ///
    /// Fails when there is no open queue or the host raises.
    fn clear_queue_entry(&mut self, actor: ActorId, slot: usize) -> HostResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guarded_passes_values() {
        assert_eq!(guarded("count_in", Ok::<_, HostError>(3)), Some(3));
    }

    #[test]
    fn test_guarded_swallows_failures() {
        let call: HostResult<u32> = Err(HostError::CallFailed {
            op: "count_in",
            reason: "boom".to_string(),
        });
        assert_eq!(guarded("count_in", call), None);
        assert_eq!(guarded::<()>("x", Err(HostError::ActorGone(ActorId(4)))), None);
    }
}
