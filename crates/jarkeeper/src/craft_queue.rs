//! # Craft Queue Tracker
//!
//! Hands back the jars of content ingredients when a craft actually enters
//! the queue.
//!
//! The host consumes ingredients (water in a jar, say) when it admits a
//! craft, and admission can silently fail when every queue slot is taken.
//! The host's return value is not trustworthy, so admission is read off the
//! queue itself:
//!
//! ```text
//! Idle ──begin──► Sampling(before) ──host runs──► AdmissionAttempted(before)
//!                                                        │ complete
//!                                                        ▼
//!                              Classified(Admitted  iff after > before)
//!                              Classified(Rejected  otherwise)
//! ```
//!
//! An occupancy sample that is unavailable on either side classifies as
//! Rejected: a missed refund is recoverable, a duplicated jar is not.
//!
//! Recipes whose output is itself a jar content (boiling dirty water, brewing
//! tea) keep the jar inside the output and grant nothing.

use std::collections::HashMap;
use std::sync::Arc;

use jarkeeper_economy::{JarContentRegistry, Recipe};
use jarkeeper_shared::{ActorId, InvocationId};

use crate::dispatcher::grant;
use crate::hooks::{
    AdmissionCall, Hook, HookContext, HookEvent, HookPoint, HookVerdict, Phase, Priority,
};

const POINTS: [HookPoint; 2] = [
    HookPoint::BeginQueueAdmission,
    HookPoint::CompleteQueueAdmission,
];

/// Occupied slot count at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueSnapshot {
    /// Slots holding a recipe.
    pub occupied: u32,
}

/// Whether a craft request entered the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Admission {
    /// The request occupies a new slot.
    Admitted,
    /// The queue refused the request.
    Rejected,
}

/// Per-invocation admission state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdmissionState {
    /// Nothing observed yet.
    #[default]
    Idle,
    /// Before-sample taken, host not yet run.
    Sampling {
        /// Occupancy before the attempt.
        before: Option<QueueSnapshot>,
    },
    /// The host ran its admission.
    AdmissionAttempted {
        /// Occupancy before the attempt.
        before: Option<QueueSnapshot>,
    },
    /// Final.
    Classified(Admission),
}

impl AdmissionState {
    /// Records the before-sample.
    #[must_use]
    pub const fn sample(before: Option<QueueSnapshot>) -> Self {
        Self::Sampling { before }
    }

    /// Marks the host's admission as run.
    #[must_use]
    pub const fn attempted(self) -> Self {
        match self {
            Self::Sampling { before } => Self::AdmissionAttempted { before },
            other => other,
        }
    }

    /// Classifies against the after-sample. Any state other than
    /// `AdmissionAttempted` classifies as rejected.
    #[must_use]
    pub const fn classify(self, after: Option<QueueSnapshot>) -> Self {
        match self {
            Self::AdmissionAttempted { before } => Self::Classified(classify(before, after)),
            Self::Classified(admission) => Self::Classified(admission),
            _ => Self::Classified(Admission::Rejected),
        }
    }
}

/// Admitted iff both samples exist and occupancy strictly increased.
#[must_use]
pub const fn classify(before: Option<QueueSnapshot>, after: Option<QueueSnapshot>) -> Admission {
    match (before, after) {
        (Some(before), Some(after)) if after.occupied > before.occupied => Admission::Admitted,
        _ => Admission::Rejected,
    }
}

/// A container owed to the crafter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerGrant {
    /// Container item name.
    pub container: String,
    /// Units owed.
    pub count: u32,
}

/// Containers handed back when `craft_count` crafts of `recipe` are
/// admitted. Ingredients sharing a container are merged.
#[must_use]
pub fn containers_to_grant(
    registry: &JarContentRegistry,
    recipe: &Recipe,
    craft_count: u32,
) -> Vec<ContainerGrant> {
    if registry.recipe_output_is_container_based(recipe) {
        return Vec::new();
    }

    let mut grants: Vec<ContainerGrant> = Vec::new();
    for ingredient in &recipe.ingredients {
        let Some(name) = registry.item_name(ingredient.item_id) else {
            continue;
        };
        let Some(container) = registry.resolve_container(&name) else {
            continue;
        };
        let count = ingredient.count.saturating_mul(craft_count);
        if count == 0 {
            continue;
        }
        match grants.iter_mut().find(|grant| grant.container == container) {
            Some(existing) => existing.count = existing.count.saturating_add(count),
            None => grants.push(ContainerGrant { container, count }),
        }
    }
    grants
}

/// Admission tracker hook.
#[derive(Debug)]
pub struct CraftQueueTracker {
    registry: Arc<JarContentRegistry>,
    states: HashMap<InvocationId, AdmissionState>,
    admitted: u64,
    rejected: u64,
}

impl CraftQueueTracker {
    /// Creates a tracker over the shared registry.
    #[must_use]
    pub fn new(registry: Arc<JarContentRegistry>) -> Self {
        Self {
            registry,
            states: HashMap::new(),
            admitted: 0,
            rejected: 0,
        }
    }

    /// Admissions seen so far.
    #[must_use]
    pub const fn admitted(&self) -> u64 {
        self.admitted
    }

    /// Rejections seen so far.
    #[must_use]
    pub const fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Invocations between begin and complete.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.states.len()
    }

    fn on_begin(&mut self, call: &AdmissionCall, cx: &mut HookContext<'_>) {
        if !cx.host.is_local_player(call.actor) {
            self.states.remove(&call.invocation);
            return;
        }
        let before = snapshot(&*cx.host, call.actor);
        // the host runs its admission as soon as this hook returns
        let state = AdmissionState::sample(before).attempted();
        self.states.insert(call.invocation, state);
    }

    fn on_complete(&mut self, call: &AdmissionCall, cx: &mut HookContext<'_>) {
        let Some(state) = self.states.remove(&call.invocation) else {
            return;
        };
        let after = snapshot(&*cx.host, call.actor);

        match state.classify(after) {
            AdmissionState::Classified(Admission::Admitted) => {
                self.admitted += 1;
                self.grant_containers(call, cx);
            }
            _ => {
                self.rejected += 1;
                tracing::debug!(
                    "{} x{} was not admitted - no containers granted",
                    call.recipe.name,
                    call.craft_count
                );
            }
        }
    }

    fn grant_containers(&self, call: &AdmissionCall, cx: &mut HookContext<'_>) {
        for owed in containers_to_grant(&self.registry, &call.recipe, call.craft_count) {
            let outcome = grant(cx.host, call.actor, &owed.container, owed.count);
            tracing::debug!(
                "{} admitted: returning {} x{} to {} ({outcome:?})",
                call.recipe.name,
                owed.container,
                owed.count,
                call.actor
            );
        }
    }
}

fn snapshot(host: &dyn crate::host::Host, actor: ActorId) -> Option<QueueSnapshot> {
    host.craft_queue_occupancy(actor)
        .map(|occupied| QueueSnapshot { occupied })
}

impl Hook for CraftQueueTracker {
    fn name(&self) -> &str {
        "craft-queue-admission"
    }

    fn points(&self) -> &[HookPoint] {
        &POINTS
    }

    fn priority(&self) -> Priority {
        Priority::NORMAL
    }

    fn handle(&mut self, event: &HookEvent<'_>, cx: &mut HookContext<'_>) -> HookVerdict {
        if let HookEvent::QueueAdmission { phase, call } = *event {
            match phase {
                Phase::Begin => self.on_begin(call, cx),
                Phase::Complete => self.on_complete(call, cx),
            }
        }
        HookVerdict::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Compartment;
    use crate::scanner::LocationScanner;
    use crate::scheduler::TickScheduler;
    use crate::sim::{standard_catalog, SimHost, RECIPE_MEAT_STEW};
    use jarkeeper_economy::{JarContentsConfig, RecipeIngredient, WorkstationKind};
    use jarkeeper_shared::Vec3;

    fn snap(occupied: u32) -> Option<QueueSnapshot> {
        Some(QueueSnapshot { occupied })
    }

    #[test]
    fn test_classification() {
        assert_eq!(classify(snap(1), snap(2)), Admission::Admitted);
        assert_eq!(classify(snap(2), snap(2)), Admission::Rejected);
        assert_eq!(classify(snap(3), snap(2)), Admission::Rejected);
        assert_eq!(classify(None, snap(2)), Admission::Rejected);
        assert_eq!(classify(snap(0), None), Admission::Rejected);
    }

    #[test]
    fn test_state_machine_path() {
        let state = AdmissionState::sample(snap(0));
        assert_eq!(state, AdmissionState::Sampling { before: snap(0) });
        let state = state.attempted();
        assert_eq!(state, AdmissionState::AdmissionAttempted { before: snap(0) });
        assert_eq!(state.classify(snap(1)), AdmissionState::Classified(Admission::Admitted));

        // skipping the attempt never admits
        assert_eq!(
            AdmissionState::sample(snap(0)).classify(snap(1)),
            AdmissionState::Classified(Admission::Rejected)
        );
        assert_eq!(
            AdmissionState::Idle.classify(snap(1)),
            AdmissionState::Classified(Admission::Rejected)
        );
    }

    #[test]
    fn test_containers_to_grant() {
        let catalog = standard_catalog();
        let registry = JarContentRegistry::new(&JarContentsConfig::default(), catalog.clone());
        let id = |name: &str| catalog.resolve(name).unwrap();

        let stew = Recipe::new(
            1,
            "stew".to_string(),
            vec![
                RecipeIngredient::new(id("drinkJarBoiledWater"), 1),
                RecipeIngredient::new(id("foodRawMeat"), 2),
                RecipeIngredient::new(id("drinkJarRiverWater"), 2),
            ],
            RecipeIngredient::new(id("foodMeatStew"), 1),
        )
        .unwrap();
        assert_eq!(
            containers_to_grant(&registry, &stew, 3),
            vec![ContainerGrant {
                container: "drinkJarEmpty".to_string(),
                count: 9,
            }]
        );

        let boil = Recipe::new(
            2,
            "boil".to_string(),
            vec![RecipeIngredient::new(id("drinkJarRiverWater"), 1)],
            RecipeIngredient::new(id("drinkJarBoiledWater"), 1),
        )
        .unwrap();
        assert!(containers_to_grant(&registry, &boil, 5).is_empty());
    }

    #[test]
    fn test_tracker_counts_admissions() {
        let mut host = SimHost::with_standard_items(1);
        let actor = host.spawn_player(Vec3::ZERO);
        host.open_queue(actor, 1, WorkstationKind::Backpack);
        host.give(actor, Compartment::Backpack, "drinkJarBoiledWater", 2);
        host.give(actor, Compartment::Backpack, "foodRawMeat", 4);
        let recipe = host.recipes().require(RECIPE_MEAT_STEW).unwrap().clone();

        let registry = Arc::new(JarContentRegistry::new(
            &JarContentsConfig::default(),
            host.catalog().clone(),
        ));
        let mut tracker = CraftQueueTracker::new(registry);
        let mut scanner = LocationScanner::new();
        let mut scheduler = TickScheduler::new();

        for invocation in 1..=2 {
            let call = AdmissionCall {
                invocation: InvocationId(invocation),
                actor,
                recipe: recipe.clone(),
                craft_count: 1,
            };
            for phase in [Phase::Begin, Phase::Complete] {
                if phase == Phase::Complete {
                    assert_eq!(tracker.in_flight(), 1);
                    // the single slot takes the first craft only
                    host.enqueue_craft(actor, RECIPE_MEAT_STEW, 1).unwrap();
                }
                let mut cx = HookContext {
                    host: &mut host,
                    scanner: &mut scanner,
                    scheduler: &mut scheduler,
                };
                tracker.handle(&HookEvent::QueueAdmission { phase, call: &call }, &mut cx);
            }
            assert_eq!(tracker.in_flight(), 0);
        }

        assert_eq!(tracker.admitted(), 1);
        assert_eq!(tracker.rejected(), 1);
        assert_eq!(host.carried(actor, "drinkJarEmpty"), 1);
    }
}
