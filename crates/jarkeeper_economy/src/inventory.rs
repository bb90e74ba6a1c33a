//! # Inventory System
//!
//! Fixed-capacity slot inventories. The capacity is decided at creation time
//! (a backpack and a toolbelt differ) and never grows afterwards.

use crate::error::{EconomyError, EconomyResult};

/// Unique identifier for an item type. `0` is the empty item.
pub type ItemId = u32;

/// A stack of items in an inventory slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemStack {
    /// The item type ID, or 0 for empty slot.
    pub item_id: ItemId,
    /// Number of items in this stack.
    pub count: u32,
}

impl ItemStack {
    /// Creates an empty item stack.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            item_id: 0,
            count: 0,
        }
    }

    /// Creates a new item stack.
    #[inline]
    #[must_use]
    pub const fn new(item_id: ItemId, count: u32) -> Self {
        Self { item_id, count }
    }

    /// Returns true if this slot is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0 || self.item_id == 0
    }

    /// Clears this slot.
    #[inline]
    pub fn clear(&mut self) {
        self.item_id = 0;
        self.count = 0;
    }
}

/// A fixed-capacity inventory.
#[derive(Clone, Debug)]
pub struct Inventory {
    slots: Vec<ItemStack>,
}

impl Inventory {
    /// Creates a new empty inventory with `capacity` slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![ItemStack::empty(); capacity],
        }
    }

    /// Counts the total number of a specific item across all slots.
    #[must_use]
    pub fn count_item(&self, item_id: ItemId) -> u32 {
        self.slots
            .iter()
            .filter(|s| s.item_id == item_id)
            .fold(0u32, |total, s| total.saturating_add(s.count))
    }

    /// How many units of `item_id` fit without spilling.
    #[must_use]
    pub fn room_for(&self, item_id: ItemId, max_stack: u32) -> u32 {
        self.slots
            .iter()
            .map(|slot| {
                if slot.is_empty() {
                    max_stack
                } else if slot.item_id == item_id {
                    max_stack.saturating_sub(slot.count)
                } else {
                    0
                }
            })
            .fold(0u32, u32::saturating_add)
    }

    /// Returns true if the whole stack fits.
    #[must_use]
    pub fn can_stack(&self, stack: ItemStack, max_stack: u32) -> bool {
        !stack.is_empty() && self.room_for(stack.item_id, max_stack) >= stack.count
    }

    /// Adds as many items as fit and returns how many were left over.
    ///
    /// Existing stacks are topped up first, then empty slots are used.
    pub fn add_partial(&mut self, item_id: ItemId, count: u32, max_stack: u32) -> u32 {
        if item_id == 0 || max_stack == 0 {
            return count;
        }
        let mut remaining = count;

        for slot in &mut self.slots {
            if remaining == 0 {
                break;
            }
            if slot.item_id == item_id && slot.count > 0 && slot.count < max_stack {
                let topped = (max_stack - slot.count).min(remaining);
                slot.count += topped;
                remaining -= topped;
            }
        }

        for slot in self.slots.iter_mut().filter(|slot| slot.is_empty()) {
            if remaining == 0 {
                break;
            }
            let placed = remaining.min(max_stack);
            *slot = ItemStack::new(item_id, placed);
            remaining -= placed;
        }

        remaining
    }

    /// Removes items from the inventory, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InsufficientItems` if not enough items.
    pub fn remove(&mut self, item_id: ItemId, count: u32) -> EconomyResult<()> {
        let available = self.count_item(item_id);
        if available < count {
            return Err(EconomyError::InsufficientItems {
                item_id,
                required: count,
                available,
            });
        }

        let mut remaining = count;
        for slot in self.slots.iter_mut().filter(|slot| slot.item_id == item_id) {
            if remaining == 0 {
                break;
            }
            let taken = slot.count.min(remaining);
            slot.count -= taken;
            remaining -= taken;
            if slot.count == 0 {
                slot.clear();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAR: ItemId = 1;
    const WATER: ItemId = 2;
    const ROCK: ItemId = 3;

    #[test]
    fn test_tops_up_before_new_slot() {
        let mut backpack = Inventory::with_capacity(3);
        assert_eq!(backpack.add_partial(JAR, 7, 10), 0);
        assert_eq!(backpack.add_partial(JAR, 5, 10), 0);
        assert_eq!(backpack.count_item(JAR), 12);
        // 8 more in the second stack, 10 in the empty third slot
        assert_eq!(backpack.room_for(JAR, 10), 18);
    }

    #[test]
    fn test_partial_add_reports_leftover() {
        let mut toolbelt = Inventory::with_capacity(1);
        toolbelt.add_partial(JAR, 8, 10);
        assert_eq!(toolbelt.add_partial(JAR, 5, 10), 3);
        assert_eq!(toolbelt.count_item(JAR), 10);
        assert_eq!(toolbelt.add_partial(0, 4, 10), 4);
    }

    #[test]
    fn test_can_stack_needs_room_for_whole_stack() {
        let mut backpack = Inventory::with_capacity(2);
        backpack.add_partial(WATER, 3, 10);
        backpack.add_partial(ROCK, 64, 64);

        assert!(backpack.can_stack(ItemStack::new(WATER, 7), 10));
        assert!(!backpack.can_stack(ItemStack::new(WATER, 8), 10));
        assert!(!backpack.can_stack(ItemStack::new(JAR, 1), 10));
        assert!(!backpack.can_stack(ItemStack::empty(), 10));
    }

    #[test]
    fn test_remove_frees_slots() {
        let mut backpack = Inventory::with_capacity(1);
        backpack.add_partial(WATER, 2, 10);
        backpack.remove(WATER, 2).unwrap();
        assert_eq!(backpack.count_item(WATER), 0);
        assert!(backpack.can_stack(ItemStack::new(JAR, 10), 10));
    }

    #[test]
    fn test_remove_is_all_or_nothing() {
        let mut backpack = Inventory::with_capacity(2);
        backpack.add_partial(WATER, 4, 10);
        let result = backpack.remove(WATER, 5);
        assert!(matches!(
            result,
            Err(EconomyError::InsufficientItems { required: 5, available: 4, .. })
        ));
        assert_eq!(backpack.count_item(WATER), 4);
    }
}
