//! # Economy Error Types
//!
//! All errors that can occur in the item and recipe model.

use thiserror::Error;

use crate::inventory::ItemId;

/// Errors that can occur in the economy model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomyError {
    /// Attempted to remove more than an inventory holds.
    #[error("insufficient items: need {required} of item {item_id}, have {available}")]
    InsufficientItems {
        /// The item that was missing.
        item_id: ItemId,
        /// The amount required.
        required: u32,
        /// The amount available.
        available: u32,
    },

    /// Recipe not found in the recipe book.
    #[error("recipe not found: {0}")]
    RecipeNotFound(u32),

    /// Item name not present in the catalog.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for economy operations.
pub type EconomyResult<T> = Result<T, EconomyError>;
