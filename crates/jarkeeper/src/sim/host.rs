//! # Simulated Host
//!
//! An in-memory host engine with the two behaviors the inference engine
//! exists for:
//!
//! 1. **Hidden survival roll** - consuming a refund-eligible item rolls a
//!    seeded `ChaCha8Rng`; the result is never reported.
//! 2. **Delayed hand-back** - a surviving container is applied a few ticks
//!    after the consume call, into the backpack, then the toolbelt, then
//!    onto the ground at the actor's feet.
//!
//! Every host call listed in [`SimHost::fail_on`] fails with an injected
//! error, for exercising the fallible-call paths.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use jarkeeper_economy::{
    ConsumeAction, CraftQueue, EconomyError, EconomyResult, Inventory, ItemCatalog, ItemId,
    ItemLookup, ItemStack, QueueEntry, Recipe, RecipeBook, RecipeId, WorkstationKind,
};
use jarkeeper_shared::{ActorId, Bounds, Tick, Vec3, DROP_DESPAWN_SECONDS, INVENTORY_FULL_TOOLTIP};

use crate::host::{Compartment, Host, HostError, HostResult};

/// Backpack slot count.
pub const BACKPACK_SLOTS: usize = 24;

/// Toolbelt slot count.
pub const TOOLBELT_SLOTS: usize = 10;

/// Workstation input grid slot count.
pub const INPUT_GRID_SLOTS: usize = 6;

/// Host updates per second, for despawn horizons.
pub const TICKS_PER_SECOND: u64 = 20;

/// Default chance (percent) that a jar survives consumption.
pub const DEFAULT_SURVIVAL_PERCENT: u8 = 50;

/// Default ticks between a consume call and the container hand-back.
pub const DEFAULT_RETURN_LATENCY_TICKS: u64 = 2;

/// A sound the host was asked to play.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayedSound {
    /// A sound file.
    Custom(PathBuf),
    /// A built-in sound by name.
    Game(String),
}

/// A ground drop requested through [`Host::drop_item`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropRecord {
    /// What was dropped.
    pub stack: ItemStack,
    /// Where.
    pub position: Vec3,
    /// On whose behalf.
    pub owner: ActorId,
    /// Despawn horizon.
    pub despawn_seconds: f32,
}

#[derive(Clone, Copy, Debug)]
struct GroundItem {
    stack: ItemStack,
    position: Vec3,
    expires_at: Tick,
}

#[derive(Clone, Copy, Debug)]
struct PendingReturn {
    actor: ActorId,
    container: ItemId,
    count: u32,
    due: Tick,
}

#[derive(Clone, Debug)]
struct SimActor {
    position: Vec3,
    local_player: bool,
    backpack: Inventory,
    toolbelt: Inventory,
    input_grid: Inventory,
    queue: Option<CraftQueue>,
}

impl SimActor {
    fn new(position: Vec3, local_player: bool) -> Self {
        Self {
            position,
            local_player,
            backpack: Inventory::with_capacity(BACKPACK_SLOTS),
            toolbelt: Inventory::with_capacity(TOOLBELT_SLOTS),
            input_grid: Inventory::with_capacity(INPUT_GRID_SLOTS),
            queue: None,
        }
    }

    fn compartment(&self, compartment: Compartment) -> &Inventory {
        match compartment {
            Compartment::Backpack => &self.backpack,
            Compartment::Toolbelt => &self.toolbelt,
            Compartment::WorkstationInput => &self.input_grid,
        }
    }

    fn compartment_mut(&mut self, compartment: Compartment) -> &mut Inventory {
        match compartment {
            Compartment::Backpack => &mut self.backpack,
            Compartment::Toolbelt => &mut self.toolbelt,
            Compartment::WorkstationInput => &mut self.input_grid,
        }
    }
}

/// Deterministic in-memory host.
#[derive(Debug)]
pub struct SimHost {
    catalog: Arc<ItemCatalog>,
    recipes: RecipeBook,
    actors: BTreeMap<ActorId, SimActor>,
    next_actor: u32,
    now: Tick,

    ground: Vec<GroundItem>,
    pending_returns: Vec<PendingReturn>,
    rng: ChaCha8Rng,
    survival_percent: u8,
    return_latency: u64,

    failing: HashSet<&'static str>,
    custom_sounds_loaded: bool,

    drops: Vec<DropRecord>,
    tooltips: Vec<(ActorId, String)>,
    sounds: Vec<PlayedSound>,
}

impl SimHost {
    /// Creates a host over `catalog` with a seeded survival roll.
    #[must_use]
    pub fn new(catalog: Arc<ItemCatalog>, seed: u64) -> Self {
        Self {
            catalog,
            recipes: RecipeBook::new(),
            actors: BTreeMap::new(),
            next_actor: 1,
            now: 0,
            ground: Vec::new(),
            pending_returns: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            survival_percent: DEFAULT_SURVIVAL_PERCENT,
            return_latency: DEFAULT_RETURN_LATENCY_TICKS,
            failing: HashSet::new(),
            custom_sounds_loaded: true,
            drops: Vec::new(),
            tooltips: Vec::new(),
            sounds: Vec::new(),
        }
    }

    /// A host over the standard catalog and recipes.
    #[must_use]
    pub fn with_standard_items(seed: u64) -> Self {
        let catalog = super::standard_catalog();
        let recipes = super::standard_recipes(&catalog);
        let mut host = Self::new(catalog, seed);
        host.recipes = recipes;
        host
    }

    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    /// The item catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<ItemCatalog> {
        &self.catalog
    }

    /// Known recipes.
    #[must_use]
    pub const fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    /// Adds a recipe.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a duplicate id.
    pub fn add_recipe(&mut self, recipe: Recipe) -> EconomyResult<()> {
        self.recipes.add_recipe(recipe)
    }

    /// Spawns the locally controlled player.
    pub fn spawn_player(&mut self, position: Vec3) -> ActorId {
        self.spawn(position, true)
    }

    /// Spawns a non-player actor.
    pub fn spawn_npc(&mut self, position: Vec3) -> ActorId {
        self.spawn(position, false)
    }

    fn spawn(&mut self, position: Vec3, local_player: bool) -> ActorId {
        let id = ActorId(self.next_actor);
        self.next_actor += 1;
        self.actors.insert(id, SimActor::new(position, local_player));
        id
    }

    /// Removes an actor from the world.
    pub fn despawn(&mut self, actor: ActorId) {
        self.actors.remove(&actor);
    }

    /// Moves an actor.
    pub fn move_to(&mut self, actor: ActorId, position: Vec3) {
        if let Some(state) = self.actors.get_mut(&actor) {
            state.position = position;
        }
    }

    /// Chance (0-100) that a jar survives.
    pub fn set_survival_percent(&mut self, percent: u8) {
        self.survival_percent = percent.min(100);
    }

    /// Ticks between consume and hand-back.
    pub fn set_return_latency(&mut self, ticks: u64) {
        self.return_latency = ticks;
    }

    /// Makes every later call of `op` fail.
    pub fn fail_on(&mut self, op: &'static str) {
        self.failing.insert(op);
    }

    /// Stops injecting failures.
    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    /// Whether custom sound clips play.
    pub fn set_custom_sounds_loaded(&mut self, loaded: bool) {
        self.custom_sounds_loaded = loaded;
    }

    /// Adds items straight into a compartment. Returns the leftover.
    pub fn give(&mut self, actor: ActorId, compartment: Compartment, name: &str, count: u32) -> u32 {
        let Some(item) = self.catalog.resolve(name) else {
            return count;
        };
        let max_stack = self.catalog.max_stack(item);
        self.actors.get_mut(&actor).map_or(count, |state| {
            state
                .compartment_mut(compartment)
                .add_partial(item, count, max_stack)
        })
    }

    /// Fills every free unit of a compartment with `filler`.
    pub fn fill_compartment(&mut self, actor: ActorId, compartment: Compartment, filler: &str) {
        self.give(actor, compartment, filler, u32::MAX);
    }

    /// Fills backpack and toolbelt.
    pub fn fill_inventory(&mut self, actor: ActorId, filler: &str) {
        self.fill_compartment(actor, Compartment::Backpack, filler);
        self.fill_compartment(actor, Compartment::Toolbelt, filler);
    }

    /// Puts a stack on the ground without recording a drop.
    pub fn place_on_ground(&mut self, name: &str, count: u32, position: Vec3) {
        if let Some(item) = self.catalog.resolve(name) {
            self.ground.push(GroundItem {
                stack: ItemStack::new(item, count),
                position,
                expires_at: Tick::MAX,
            });
        }
    }

    /// Opens a crafting queue for the actor.
    pub fn open_queue(&mut self, actor: ActorId, slots: usize, workstation: WorkstationKind) {
        if let Some(state) = self.actors.get_mut(&actor) {
            state.queue = Some(CraftQueue::new(slots).with_workstation(workstation));
        }
    }

    /// Closes the actor's crafting queue.
    pub fn close_queue(&mut self, actor: ActorId) {
        if let Some(state) = self.actors.get_mut(&actor) {
            state.queue = None;
        }
    }

    // ------------------------------------------------------------------
    // Host-side behavior
    // ------------------------------------------------------------------

    /// Current host tick.
    #[must_use]
    pub const fn now(&self) -> Tick {
        self.now
    }

    /// Consumes one `name` from the backpack, else the toolbelt, and rolls
    /// the container survival. Returns the item's consumption action.
    ///
    /// # Errors
    ///
    /// `UnknownItem` for unknown names or actors, `InsufficientItems` when
    /// the actor carries none.
    pub fn consume(&mut self, actor: ActorId, name: &str) -> EconomyResult<ConsumeAction> {
        let item = self.catalog.require(name)?;
        let action = self.catalog.consume_action(name).unwrap_or_default();
        let state = self
            .actors
            .get_mut(&actor)
            .ok_or_else(|| EconomyError::UnknownItem(actor.to_string()))?;

        if state.backpack.remove(item, 1).is_err() {
            state.toolbelt.remove(item, 1)?;
        }

        if let Some(container) = action.refund_container() {
            let survived = self.rng.gen_range(0..100u8) < self.survival_percent;
            tracing::trace!("{actor} consumed {name}: container survives = {survived}");
            if survived {
                let container = self.catalog.require(container)?;
                self.pending_returns.push(PendingReturn {
                    actor,
                    container,
                    count: action.creates_count,
                    due: self.now.saturating_add(self.return_latency),
                });
            }
        }
        Ok(action)
    }

    /// Advances one host update: applies due hand-backs, expires drops.
    pub fn step(&mut self) {
        self.now += 1;
        let now = self.now;

        let (due, later): (Vec<_>, Vec<_>) = self
            .pending_returns
            .drain(..)
            .partition(|pending| pending.due <= now);
        self.pending_returns = later;
        for pending in due {
            self.hand_back(pending);
        }

        self.ground.retain(|item| item.expires_at > now);
    }

    fn hand_back(&mut self, pending: PendingReturn) {
        let max_stack = self.catalog.max_stack(pending.container);
        let Some(state) = self.actors.get_mut(&pending.actor) else {
            return;
        };
        let stack = ItemStack::new(pending.container, pending.count);

        for compartment in [Compartment::Backpack, Compartment::Toolbelt] {
            let inventory = state.compartment_mut(compartment);
            if inventory.can_stack(stack, max_stack) {
                inventory.add_partial(stack.item_id, stack.count, max_stack);
                return;
            }
        }

        let position = state.position;
        self.ground.push(GroundItem {
            stack,
            position,
            expires_at: self.despawn_tick(DROP_DESPAWN_SECONDS),
        });
    }

    /// Offers a craft to the actor's queue. Ingredients are taken only on
    /// admission. Returns whether the craft was admitted.
    ///
    /// # Errors
    ///
    /// `RecipeNotFound`, `InsufficientItems`, or `UnknownItem` for a
    /// missing actor.
    pub fn enqueue_craft(&mut self, actor: ActorId, recipe_id: RecipeId, count: u32) -> EconomyResult<bool> {
        self.enqueue_entry(actor, QueueEntry::new(recipe_id, count))
    }

    /// Offers a prepared entry to the actor's queue.
    ///
    /// # Errors
    ///
    /// Same as [`enqueue_craft`](Self::enqueue_craft).
    pub fn enqueue_entry(&mut self, actor: ActorId, entry: QueueEntry) -> EconomyResult<bool> {
        let recipe = self.recipes.require(entry.recipe_id)?.clone();
        let state = self
            .actors
            .get_mut(&actor)
            .ok_or_else(|| EconomyError::UnknownItem(actor.to_string()))?;
        let Some(queue) = state.queue.as_mut() else {
            return Ok(false);
        };
        if queue.is_full() {
            return Ok(false);
        }

        let source = match queue.workstation() {
            WorkstationKind::InputGrid => &mut state.input_grid,
            WorkstationKind::Backpack | WorkstationKind::MaterialGrid => &mut state.backpack,
        };
        for ingredient in &recipe.ingredients {
            let needed = ingredient.count.saturating_mul(entry.recipe_count);
            let available = source.count_item(ingredient.item_id);
            if available < needed {
                return Err(EconomyError::InsufficientItems {
                    item_id: ingredient.item_id,
                    required: needed,
                    available,
                });
            }
        }
        for ingredient in &recipe.ingredients {
            source.remove(
                ingredient.item_id,
                ingredient.count.saturating_mul(entry.recipe_count),
            )?;
        }

        Ok(queue.try_enqueue(entry))
    }

    /// The entry in a queue slot.
    #[must_use]
    pub fn queue_entry(&self, actor: ActorId, slot: usize) -> Option<&QueueEntry> {
        self.actors
            .get(&actor)
            .and_then(|state| state.queue.as_ref())
            .and_then(|queue| queue.get(slot))
    }

    /// Workstation kind of the actor's open queue.
    #[must_use]
    pub fn queue_workstation(&self, actor: ActorId) -> Option<WorkstationKind> {
        self.actors
            .get(&actor)
            .and_then(|state| state.queue.as_ref())
            .map(CraftQueue::workstation)
    }

    /// The host's own cancel: every ingredient back, overflow dropped.
    /// Returns false when the slot was empty.
    pub fn cancel_default(&mut self, actor: ActorId, slot: usize) -> bool {
        let Some(state) = self.actors.get_mut(&actor) else {
            return false;
        };
        let Some(queue) = state.queue.as_mut() else {
            return false;
        };
        let workstation = queue.workstation();
        let Some(entry) = queue.take(slot) else {
            return false;
        };
        let Some(recipe) = self.recipes.get_recipe(entry.recipe_id).cloned() else {
            return true;
        };

        let target = match workstation {
            WorkstationKind::InputGrid => Compartment::WorkstationInput,
            WorkstationKind::Backpack | WorkstationKind::MaterialGrid => Compartment::Backpack,
        };
        let mut overflow = Vec::new();
        for stack in entry.original_item.into_iter().chain(
            recipe
                .ingredients
                .iter()
                .map(|i| ItemStack::new(i.item_id, i.count.saturating_mul(entry.recipe_count))),
        ) {
            let max_stack = self.catalog.max_stack(stack.item_id);
            let leftover = self.actors.get_mut(&actor).map_or(stack.count, |state| {
                state
                    .compartment_mut(target)
                    .add_partial(stack.item_id, stack.count, max_stack)
            });
            if leftover > 0 {
                overflow.push(ItemStack::new(stack.item_id, leftover));
            }
        }

        if !overflow.is_empty() {
            let position = self.actors.get(&actor).map_or(Vec3::ZERO, |s| s.position);
            for stack in overflow {
                self.record_drop(stack, position, actor, DROP_DESPAWN_SECONDS);
            }
            self.tooltips.push((actor, INVENTORY_FULL_TOOLTIP.to_string()));
        }
        true
    }

    fn record_drop(&mut self, stack: ItemStack, position: Vec3, owner: ActorId, despawn_seconds: f32) {
        self.ground.push(GroundItem {
            stack,
            position,
            expires_at: self.despawn_tick(despawn_seconds),
        });
        self.drops.push(DropRecord {
            stack,
            position,
            owner,
            despawn_seconds,
        });
    }

    fn despawn_tick(&self, seconds: f32) -> Tick {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let ticks = (seconds.max(0.0) * TICKS_PER_SECOND as f32) as u64;
        self.now.saturating_add(ticks)
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Quantity of `name` in a compartment.
    #[must_use]
    pub fn count(&self, actor: ActorId, compartment: Compartment, name: &str) -> u32 {
        let Some(item) = self.catalog.resolve(name) else {
            return 0;
        };
        self.actors
            .get(&actor)
            .map_or(0, |state| state.compartment(compartment).count_item(item))
    }

    /// Backpack + toolbelt quantity of `name`.
    #[must_use]
    pub fn carried(&self, actor: ActorId, name: &str) -> u32 {
        self.count(actor, Compartment::Backpack, name)
            .saturating_add(self.count(actor, Compartment::Toolbelt, name))
    }

    /// Quantity of `name` lying anywhere on the ground.
    #[must_use]
    pub fn ground_count(&self, name: &str) -> u32 {
        let Some(item) = self.catalog.resolve(name) else {
            return 0;
        };
        self.ground
            .iter()
            .filter(|g| g.stack.item_id == item)
            .fold(0u32, |total, g| total.saturating_add(g.stack.count))
    }

    /// Drops requested through the host interface.
    #[must_use]
    pub fn drops(&self) -> &[DropRecord] {
        &self.drops
    }

    /// Tooltips shown.
    #[must_use]
    pub fn tooltips(&self) -> &[(ActorId, String)] {
        &self.tooltips
    }

    /// Sounds played.
    #[must_use]
    pub fn sounds(&self) -> &[PlayedSound] {
        &self.sounds
    }

    fn check(&self, op: &'static str) -> HostResult<()> {
        if self.failing.contains(op) {
            return Err(HostError::CallFailed {
                op,
                reason: "injected".to_string(),
            });
        }
        Ok(())
    }

    fn actor(&self, actor: ActorId) -> HostResult<&SimActor> {
        self.actors.get(&actor).ok_or(HostError::ActorGone(actor))
    }

    fn actor_mut(&mut self, actor: ActorId) -> HostResult<&mut SimActor> {
        self.actors.get_mut(&actor).ok_or(HostError::ActorGone(actor))
    }
}

impl Host for SimHost {
    fn resolve_item(&self, name: &str) -> Option<ItemId> {
        self.catalog.resolve(name)
    }

    fn is_actor_valid(&self, actor: ActorId) -> bool {
        self.actors.contains_key(&actor)
    }

    fn is_local_player(&self, actor: ActorId) -> bool {
        self.actors.get(&actor).is_some_and(|state| state.local_player)
    }

    fn actor_position(&self, actor: ActorId) -> HostResult<Vec3> {
        self.check("actor_position")?;
        Ok(self.actor(actor)?.position)
    }

    fn count_in(&self, actor: ActorId, compartment: Compartment, item: ItemId) -> HostResult<u32> {
        self.check("count_in")?;
        Ok(self.actor(actor)?.compartment(compartment).count_item(item))
    }

    fn can_stack(&self, actor: ActorId, compartment: Compartment, stack: ItemStack) -> HostResult<bool> {
        self.check("can_stack")?;
        let max_stack = self.catalog.max_stack(stack.item_id);
        Ok(self.actor(actor)?.compartment(compartment).can_stack(stack, max_stack))
    }

    fn add_to(&mut self, actor: ActorId, compartment: Compartment, stack: ItemStack) -> HostResult<u32> {
        self.check("add_to")?;
        let max_stack = self.catalog.max_stack(stack.item_id);
        Ok(self
            .actor_mut(actor)?
            .compartment_mut(compartment)
            .add_partial(stack.item_id, stack.count, max_stack))
    }

    fn dropped_items_in(&self, bounds: Bounds, out: &mut Vec<ItemStack>) -> HostResult<()> {
        self.check("dropped_items_in")?;
        out.extend(
            self.ground
                .iter()
                .filter(|item| bounds.contains(item.position))
                .map(|item| item.stack),
        );
        Ok(())
    }

    fn drop_item(&mut self, stack: ItemStack, position: Vec3, owner: ActorId, despawn_seconds: f32) -> HostResult<()> {
        self.check("drop_item")?;
        self.record_drop(stack, position, owner, despawn_seconds);
        Ok(())
    }

    fn show_tooltip(&mut self, actor: ActorId, key: &str) {
        self.tooltips.push((actor, key.to_string()));
    }

    fn play_custom_sound(&mut self, _actor: ActorId, path: &Path) -> HostResult<()> {
        self.check("play_custom_sound")?;
        if !self.custom_sounds_loaded {
            return Err(HostError::CallFailed {
                op: "play_custom_sound",
                reason: format!("clip {} not loaded", path.display()),
            });
        }
        self.sounds.push(PlayedSound::Custom(path.to_path_buf()));
        Ok(())
    }

    fn play_game_sound(&mut self, _actor: ActorId, name: &str) -> HostResult<()> {
        self.check("play_game_sound")?;
        self.sounds.push(PlayedSound::Game(name.to_string()));
        Ok(())
    }

    fn craft_queue_occupancy(&self, actor: ActorId) -> Option<u32> {
        if self.failing.contains("craft_queue_occupancy") {
            return None;
        }
        self.actors
            .get(&actor)
            .and_then(|state| state.queue.as_ref())
            .map(CraftQueue::occupied)
    }

    fn clear_queue_entry(&mut self, actor: ActorId, slot: usize) -> HostResult<()> {
        self.check("clear_queue_entry")?;
        self.actor_mut(actor)?
            .queue
            .as_mut()
            .and_then(|queue| queue.take(slot))
            .map(|_| ())
            .ok_or_else(|| HostError::CallFailed {
                op: "clear_queue_entry",
                reason: format!("no entry in slot {slot}"),
            })
    }
}
