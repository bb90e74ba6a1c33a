//! # Cancel Refund Policy
//!
//! Replaces the host's cancel refund for queued crafts.
//!
//! The jar of a content ingredient was already handed back when the craft
//! was admitted (see [`crate::craft_queue`]), so refunding the content too
//! would duplicate it. This policy refunds everything except content
//! ingredients.
//!
//! The host's own cancel stays in charge when:
//!
//! - the recipe is unknown,
//! - the recipe output is itself a jar content (no jar was handed back),
//! - the workstation melts inputs into material weights (forge).
//!
//! The queue entry is cleared before anything is handed back. If the host
//! refuses to clear it, the cancel grants nothing and the entry stays.

use std::sync::Arc;

use jarkeeper_economy::{ItemStack, JarContentRegistry, Recipe, WorkstationKind};

use crate::dispatcher::{refund_all, RefundSummary};
use crate::hooks::{CancelCall, Hook, HookContext, HookEvent, HookPoint, HookVerdict, Priority};
use crate::host::{guarded, Compartment};

const POINTS: [HookPoint; 1] = [HookPoint::CancelQueuedCraft];

/// Ingredient stacks refunded for `recipe_count` crafts, content
/// ingredients left out.
#[must_use]
pub fn refund_stacks(
    registry: &JarContentRegistry,
    recipe: &Recipe,
    recipe_count: u32,
) -> Vec<ItemStack> {
    recipe
        .ingredients
        .iter()
        .filter(|ingredient| {
            let is_content = registry
                .item_name(ingredient.item_id)
                .is_some_and(|name| registry.is_jar_content(&name));
            if is_content {
                tracing::debug!(
                    "Skipping refund of {} x item {} (jar already returned)",
                    ingredient.count.saturating_mul(recipe_count),
                    ingredient.item_id
                );
            }
            !is_content
        })
        .map(|ingredient| {
            ItemStack::new(ingredient.item_id, ingredient.count.saturating_mul(recipe_count))
        })
        .filter(|stack| !stack.is_empty())
        .collect()
}

/// Cancel hook.
#[derive(Debug)]
pub struct RefundPolicy {
    registry: Arc<JarContentRegistry>,
}

impl RefundPolicy {
    /// Creates the policy over the shared registry.
    #[must_use]
    pub fn new(registry: Arc<JarContentRegistry>) -> Self {
        Self { registry }
    }

    /// Whether this policy takes over the cancel.
    #[must_use]
    pub fn handles(&self, recipe: Option<&Recipe>, workstation: WorkstationKind) -> bool {
        match recipe {
            None => false,
            Some(_) if workstation == WorkstationKind::MaterialGrid => false,
            Some(recipe) => !self.registry.recipe_output_is_container_based(recipe),
        }
    }

    fn cancel(&self, call: &CancelCall, cx: &mut HookContext<'_>) -> HookVerdict {
        let Some(recipe) = call.recipe.as_ref() else {
            return HookVerdict::Continue;
        };
        if !self.handles(Some(recipe), call.workstation) {
            return HookVerdict::Continue;
        }

        if guarded("clear_queue_entry", cx.host.clear_queue_entry(call.actor, call.slot)).is_none() {
            tracing::warn!(
                "Cancel of {} slot {} for {} left the entry queued - nothing refunded",
                recipe.name,
                call.slot,
                call.actor
            );
            return HookVerdict::SkipOriginal;
        }

        if let Some(original) = call.entry.original_item.filter(|stack| !stack.is_empty()) {
            refund_all(cx.host, call.actor, Compartment::Backpack, &[original]);
        }

        let target = match call.workstation {
            WorkstationKind::InputGrid => Compartment::WorkstationInput,
            WorkstationKind::Backpack | WorkstationKind::MaterialGrid => Compartment::Backpack,
        };
        let stacks = refund_stacks(&self.registry, recipe, call.entry.recipe_count);
        let RefundSummary { stored, dropped } = refund_all(cx.host, call.actor, target, &stacks);
        tracing::debug!(
            "Cancelled {} x{}: {stored} refunded, {dropped} dropped",
            recipe.name,
            call.entry.recipe_count
        );
        HookVerdict::SkipOriginal
    }
}

impl Hook for RefundPolicy {
    fn name(&self) -> &str {
        "cancel-refund-policy"
    }

    fn points(&self) -> &[HookPoint] {
        &POINTS
    }

    fn priority(&self) -> Priority {
        Priority::NORMAL
    }

    fn handle(&mut self, event: &HookEvent<'_>, cx: &mut HookContext<'_>) -> HookVerdict {
        match *event {
            HookEvent::CancelQueuedCraft(call) => self.cancel(call, cx),
            _ => HookVerdict::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::standard_catalog;
    use jarkeeper_economy::{JarContentsConfig, RecipeIngredient};

    fn fixture() -> (Arc<JarContentRegistry>, Recipe, Recipe) {
        let catalog = standard_catalog();
        let registry = Arc::new(JarContentRegistry::new(
            &JarContentsConfig::default(),
            catalog.clone(),
        ));
        let id = |name: &str| catalog.resolve(name).unwrap();

        let stew = Recipe::new(
            1,
            "stew".to_string(),
            vec![
                RecipeIngredient::new(id("drinkJarBoiledWater"), 1),
                RecipeIngredient::new(id("foodRawMeat"), 2),
            ],
            RecipeIngredient::new(id("foodMeatStew"), 1),
        )
        .unwrap();
        let boil = Recipe::new(
            2,
            "boil".to_string(),
            vec![RecipeIngredient::new(id("drinkJarRiverWater"), 1)],
            RecipeIngredient::new(id("drinkJarBoiledWater"), 1),
        )
        .unwrap();
        (registry, stew, boil)
    }

    #[test]
    fn test_refund_stacks_skip_content() {
        let (registry, stew, _) = fixture();
        let meat = stew.ingredients[1].item_id;
        assert_eq!(refund_stacks(&registry, &stew, 3), vec![ItemStack::new(meat, 6)]);
    }

    #[test]
    fn test_deferral_rules() {
        let (registry, stew, boil) = fixture();
        let policy = RefundPolicy::new(registry);

        assert!(policy.handles(Some(&stew), WorkstationKind::Backpack));
        assert!(policy.handles(Some(&stew), WorkstationKind::InputGrid));
        assert!(!policy.handles(Some(&stew), WorkstationKind::MaterialGrid));
        assert!(!policy.handles(Some(&boil), WorkstationKind::Backpack));
        assert!(!policy.handles(None, WorkstationKind::Backpack));
    }
}
