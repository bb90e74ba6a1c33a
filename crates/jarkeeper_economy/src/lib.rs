//! # JARKEEPER Economy
//!
//! The item, inventory and recipe model the jar inference engine reasons
//! about, plus the content -> container registry and startup configuration.
//!
//! ## Design Principles
//!
//! 1. **Unknown means absent** - an unresolvable item name is never an error
//!    at the call sites that inspect the world
//! 2. **Load once** - configuration is read at startup; afterwards only the
//!    registry's memo cache changes
//! 3. **Host agnostic** - nothing here talks to a host engine
//!
//! ## Example
//!
//! ```rust,ignore
//! use jarkeeper_economy::{JarContentRegistry, ModConfig};
//!
//! let config = ModConfig::load(Path::new("Mods/JarKeeper"));
//! let registry = JarContentRegistry::new(&config.jar_contents, catalog);
//!
//! assert_eq!(
//!     registry.resolve_container("drinkJarBoiledWater").as_deref(),
//!     Some("drinkJarEmpty"),
//! );
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod crafting;
pub mod error;
pub mod inventory;
pub mod items;
pub mod jar_registry;

pub use config::{JarContentEntry, JarContentsConfig, ModConfig, Settings, SoundCue};
pub use crafting::{
    CraftQueue, QueueEntry, Recipe, RecipeBook, RecipeId, RecipeIngredient, WorkstationKind,
};
pub use error::{EconomyError, EconomyResult};
pub use inventory::{Inventory, ItemId, ItemStack};
pub use items::{ConsumeAction, ItemCatalog, ItemDefinition, ItemLookup, DEFAULT_MAX_STACK};
pub use jar_registry::JarContentRegistry;
