//! # Crafting System
//!
//! Recipes and the crafting queue.
//!
//! The queue is a fixed row of slots. A craft request is *admitted* when it
//! occupies a free slot and *rejected* when every slot is taken; the host
//! consumes ingredients only on admission. Cancelling an entry frees its slot
//! and hands the entry back so a refund can be computed.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut book = RecipeBook::new();
//! book.add_recipe(Recipe::new(
//!     1,
//!     "Meat Stew".to_string(),
//!     vec![RecipeIngredient::new(WATER, 1), RecipeIngredient::new(MEAT, 2)],
//!     RecipeIngredient::new(STEW, 1),
//! )?)?;
//!
//! let mut queue = CraftQueue::new(4);
//! assert!(queue.try_enqueue(QueueEntry::new(1, 2)));
//! ```

use std::collections::HashMap;

use crate::error::{EconomyError, EconomyResult};
use crate::inventory::{ItemId, ItemStack};

/// Unique identifier for a recipe.
pub type RecipeId = u32;

/// One ingredient (or the output) of a recipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecipeIngredient {
    /// The item ID.
    pub item_id: ItemId,
    /// Quantity consumed/produced per craft.
    pub count: u32,
}

impl RecipeIngredient {
    /// Creates a new recipe ingredient.
    #[inline]
    #[must_use]
    pub const fn new(item_id: ItemId, count: u32) -> Self {
        Self { item_id, count }
    }
}

/// A crafting recipe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipe {
    /// Unique recipe identifier.
    pub id: RecipeId,
    /// Human-readable name.
    pub name: String,
    /// Items consumed by this recipe.
    pub ingredients: Vec<RecipeIngredient>,
    /// Item produced by this recipe.
    pub output: RecipeIngredient,
}

impl Recipe {
    /// Creates a new recipe with basic validation.
    ///
    /// # Errors
    ///
    /// Returns error if the recipe has no ingredients or an empty output.
    pub fn new(
        id: RecipeId,
        name: String,
        ingredients: Vec<RecipeIngredient>,
        output: RecipeIngredient,
    ) -> EconomyResult<Self> {
        if ingredients.is_empty() {
            return Err(EconomyError::InvalidConfig(
                "Recipe must have at least one ingredient".to_string(),
            ));
        }
        if output.item_id == 0 || output.count == 0 {
            return Err(EconomyError::InvalidConfig(
                "Recipe must produce at least one item".to_string(),
            ));
        }

        Ok(Self {
            id,
            name,
            ingredients,
            output,
        })
    }
}

/// All recipes known to the host, indexed by id.
#[derive(Debug, Default)]
pub struct RecipeBook {
    recipes: HashMap<RecipeId, Recipe>,
}

impl RecipeBook {
    /// Creates a new empty recipe book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a recipe.
    ///
    /// # Errors
    ///
    /// Returns error if recipe ID already exists.
    pub fn add_recipe(&mut self, recipe: Recipe) -> EconomyResult<()> {
        if self.recipes.contains_key(&recipe.id) {
            return Err(EconomyError::InvalidConfig(format!(
                "Recipe ID {} already exists",
                recipe.id
            )));
        }
        self.recipes.insert(recipe.id, recipe);
        Ok(())
    }

    /// Gets a recipe by ID.
    #[must_use]
    pub fn get_recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(&id)
    }

    /// Gets a recipe by ID, failing with `RecipeNotFound`.
    ///
    /// # Errors
    ///
    /// Returns `RecipeNotFound` for unknown ids.
    pub fn require(&self, id: RecipeId) -> EconomyResult<&Recipe> {
        self.recipes.get(&id).ok_or(EconomyError::RecipeNotFound(id))
    }

    /// Returns the number of recipes.
    #[must_use]
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }
}

/// Where a workstation takes its inputs from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WorkstationKind {
    /// Crafting straight from the player's backpack.
    #[default]
    Backpack,
    /// A workstation with its own input grid; refunds go back into it.
    InputGrid,
    /// A forge-style station that melts inputs into material weights.
    MaterialGrid,
}

/// One occupied slot of the crafting queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueEntry {
    /// Recipe being crafted.
    pub recipe_id: RecipeId,
    /// Number of crafts requested.
    pub recipe_count: u32,
    /// Item being repaired, handed back on cancel.
    pub original_item: Option<ItemStack>,
}

impl QueueEntry {
    /// A plain craft entry.
    #[must_use]
    pub const fn new(recipe_id: RecipeId, recipe_count: u32) -> Self {
        Self {
            recipe_id,
            recipe_count,
            original_item: None,
        }
    }

    /// Attaches an item being repaired.
    #[must_use]
    pub const fn with_original_item(mut self, item: ItemStack) -> Self {
        self.original_item = Some(item);
        self
    }
}

/// A fixed-size crafting queue.
#[derive(Clone, Debug)]
pub struct CraftQueue {
    slots: Vec<Option<QueueEntry>>,
    workstation: WorkstationKind,
}

impl CraftQueue {
    /// Creates an empty queue with `slots` slots fed from the backpack.
    #[must_use]
    pub fn new(slots: usize) -> Self {
        Self {
            slots: vec![None; slots],
            workstation: WorkstationKind::Backpack,
        }
    }

    /// Sets the workstation kind.
    #[must_use]
    pub const fn with_workstation(mut self, workstation: WorkstationKind) -> Self {
        self.workstation = workstation;
        self
    }

    /// Workstation kind feeding this queue.
    #[must_use]
    pub const fn workstation(&self) -> WorkstationKind {
        self.workstation
    }

    /// Number of slots holding a recipe.
    #[must_use]
    pub fn occupied(&self) -> u32 {
        let occupied = self.slots.iter().filter(|slot| slot.is_some()).count();
        u32::try_from(occupied).unwrap_or(u32::MAX)
    }

    /// Returns true when every slot holds a recipe.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Total slot count.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Puts the entry in the first free slot. Returns false when full.
    pub fn try_enqueue(&mut self, entry: QueueEntry) -> bool {
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(entry);
                true
            }
            None => false,
        }
    }

    /// Gets the entry at `slot`.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&QueueEntry> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Frees a slot and returns what it held.
    pub fn take(&mut self, slot: usize) -> Option<QueueEntry> {
        self.slots.get_mut(slot).and_then(Option::take)
    }
}
