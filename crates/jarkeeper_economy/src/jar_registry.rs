//! # Jar Content Registry
//!
//! Maps a content item (water, tea, honey...) to the container it lives in.
//!
//! Resolution order:
//!
//! 1. memo cache (negative results included)
//! 2. manual overrides from `jar_contents.toml` (case-insensitive)
//! 3. introspection of the item's consumption action: its created item,
//!    only when the action uses the jar-refund mechanic
//!
//! The registry is built once at startup and shared by `Arc`. The only
//! mutation after construction is memoization of new resolutions; entries are
//! never invalidated during a session.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::JarContentsConfig;
use crate::crafting::Recipe;
use crate::inventory::ItemId;
use crate::items::ItemLookup;

/// Content -> container resolution with memoization.
pub struct JarContentRegistry {
    /// Manual overrides, keyed by lowercased content name.
    overrides: HashMap<String, String>,
    /// Resolved names, keyed by lowercased content name. `None` is a cached
    /// negative.
    cache: RwLock<HashMap<String, Option<String>>>,
    items: Arc<dyn ItemLookup>,
    introspections: AtomicU64,
}

impl std::fmt::Debug for JarContentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JarContentRegistry")
            .field("overrides", &self.overrides.len())
            .field("cached", &self.cache.read().len())
            .field("introspections", &self.introspections())
            .finish_non_exhaustive()
    }
}

impl JarContentRegistry {
    /// Builds the registry from the override table and the item catalog.
    #[must_use]
    pub fn new(config: &JarContentsConfig, items: Arc<dyn ItemLookup>) -> Self {
        let overrides = config
            .entries
            .iter()
            .map(|entry| (entry.name.to_lowercase(), entry.jar.clone()))
            .collect();

        Self {
            overrides,
            cache: RwLock::new(HashMap::new()),
            items,
            introspections: AtomicU64::new(0),
        }
    }

    /// Number of manual overrides loaded.
    #[must_use]
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// How many times the item catalog has been introspected.
    #[must_use]
    pub fn introspections(&self) -> u64 {
        self.introspections.load(Ordering::Relaxed)
    }

    /// Container of `content`, if it is a jar content.
    #[must_use]
    pub fn resolve_container(&self, content: &str) -> Option<String> {
        if content.is_empty() {
            return None;
        }
        let key = content.to_lowercase();

        if let Some(cached) = self.cache.read().get(&key) {
            return cached.clone();
        }

        let resolved = match self.overrides.get(&key) {
            Some(jar) => Some(jar.clone()),
            None => self.introspect(content),
        };

        // A concurrent resolver may have won the race; keep its entry so
        // every caller sees the same answer.
        self.cache
            .write()
            .entry(key)
            .or_insert(resolved)
            .clone()
    }

    /// Returns true when `content` maps to a container.
    #[must_use]
    pub fn is_jar_content(&self, content: &str) -> bool {
        self.resolve_container(content).is_some()
    }

    /// Catalog name of an item id.
    #[must_use]
    pub fn item_name(&self, id: ItemId) -> Option<String> {
        self.items.name_of(id)
    }

    /// Whether the recipe's output is itself a jar content.
    ///
    /// When it is, the container stays bound to the output (dirty water to
    /// clean water, water to tea) and is never handed back separately.
    #[must_use]
    pub fn recipe_output_is_container_based(&self, recipe: &Recipe) -> bool {
        self.item_name(recipe.output.item_id)
            .is_some_and(|name| self.is_jar_content(&name))
    }

    fn introspect(&self, content: &str) -> Option<String> {
        self.introspections.fetch_add(1, Ordering::Relaxed);
        let action = self.items.consume_action(content)?;
        action.refund_container().map(str::to_string)
    }
}
