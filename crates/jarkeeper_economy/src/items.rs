//! # Item Catalog
//!
//! Item definitions keyed by name, plus the consumption action each
//! consumable carries. The catalog is the host's "what is this item" table;
//! the jar registry introspects it through [`ItemLookup`].

use std::collections::HashMap;

use crate::error::{EconomyError, EconomyResult};
use crate::inventory::ItemId;

/// Default max stack when an item does not specify one.
pub const DEFAULT_MAX_STACK: u32 = 64;

/// The consumption action of a consumable item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsumeAction {
    /// Item handed back after consumption (the container), if any.
    pub creates_item: Option<String>,
    /// How many units of `creates_item` are handed back.
    pub creates_count: u32,
    /// Whether the hand-back is subject to the jar-refund roll.
    pub uses_jar_refund: bool,
}

impl ConsumeAction {
    /// An action that consumes the item and hands nothing back.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            creates_item: None,
            creates_count: 0,
            uses_jar_refund: false,
        }
    }

    /// An action that may hand back one `container` unit.
    #[must_use]
    pub fn jar_refund(container: impl Into<String>) -> Self {
        Self {
            creates_item: Some(container.into()),
            creates_count: 1,
            uses_jar_refund: true,
        }
    }

    /// Container name when this action is container-refund-eligible.
    ///
    /// Eligible means: the jar-refund mechanic is on and a non-empty
    /// container is created in positive quantity.
    #[must_use]
    pub fn refund_container(&self) -> Option<&str> {
        match self.creates_item.as_deref() {
            Some(name) if self.uses_jar_refund && self.creates_count > 0 && !name.is_empty() => {
                Some(name)
            }
            _ => None,
        }
    }
}

/// An item definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemDefinition {
    /// Unique identifier.
    pub id: ItemId,
    /// Catalog name.
    pub name: String,
    /// Maximum stack size for this item type.
    pub max_stack: u32,
    /// Consumption action, for consumables.
    pub consume: Option<ConsumeAction>,
}

/// Read access to item definitions by name.
///
/// Implemented by the catalog; the jar registry only sees this trait.
pub trait ItemLookup: Send + Sync {
    /// Consumption action of the named item, if it is a known consumable.
    fn consume_action(&self, name: &str) -> Option<ConsumeAction>;

    /// Name of an item id, if known.
    fn name_of(&self, id: ItemId) -> Option<String>;
}

/// All item definitions known to the host.
#[derive(Debug, Default)]
pub struct ItemCatalog {
    items: Vec<ItemDefinition>,
    by_name: HashMap<String, ItemId>,
}

impl ItemCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new item and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the name is empty or already registered.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        max_stack: u32,
        consume: Option<ConsumeAction>,
    ) -> EconomyResult<ItemId> {
        let name = name.into();
        if name.is_empty() {
            return Err(EconomyError::InvalidConfig("item name is empty".to_string()));
        }
        if self.by_name.contains_key(&name) {
            return Err(EconomyError::InvalidConfig(format!(
                "item {name} already registered"
            )));
        }

        // ids start at 1; 0 is the empty item
        let id = ItemId::try_from(self.items.len() + 1)
            .map_err(|_| EconomyError::InvalidConfig("item id space exhausted".to_string()))?;
        self.by_name.insert(name.clone(), id);
        self.items.push(ItemDefinition {
            id,
            name,
            max_stack: max_stack.max(1),
            consume,
        });
        Ok(id)
    }

    /// Resolves a name to its id.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<ItemId> {
        self.by_name.get(name).copied()
    }

    /// Resolves a name, failing with `UnknownItem`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownItem` when the name is not registered.
    pub fn require(&self, name: &str) -> EconomyResult<ItemId> {
        self.resolve(name)
            .ok_or_else(|| EconomyError::UnknownItem(name.to_string()))
    }

    /// Gets a definition by id.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&ItemDefinition> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.items.get(index)
    }

    /// Gets a definition by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&ItemDefinition> {
        self.resolve(name).and_then(|id| self.get(id))
    }

    /// Max stack of an item, or the default for unknown ids.
    #[must_use]
    pub fn max_stack(&self, id: ItemId) -> u32 {
        self.get(id).map_or(DEFAULT_MAX_STACK, |def| def.max_stack)
    }

    /// Number of registered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemLookup for ItemCatalog {
    fn consume_action(&self, name: &str) -> Option<ConsumeAction> {
        self.by_name(name).and_then(|def| def.consume.clone())
    }

    fn name_of(&self, id: ItemId) -> Option<String> {
        self.get(id).map(|def| def.name.clone())
    }
}
