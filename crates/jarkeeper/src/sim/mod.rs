//! # Simulation
//!
//! A host engine in memory, plus a driver that wires it to a [`JarKeeper`]
//! and fires hook events the way a real host would:
//!
//! ```text
//! drink:   Begin*Consumption ─► host consumes + rolls ─► Complete*Consumption
//! craft:   BeginQueueAdmission ─► host enqueues ─► CompleteQueueAdmission
//! cancel:  CancelQueuedCraft ─► (Continue) host's own refund
//! tick:    host.step() ─► keeper.tick()
//! ```
//!
//! Used by the integration tests, the benchmarks and the `jar_sim` binary.

mod host;

pub use host::{
    DropRecord, PlayedSound, SimHost, BACKPACK_SLOTS, DEFAULT_RETURN_LATENCY_TICKS,
    DEFAULT_SURVIVAL_PERCENT, INPUT_GRID_SLOTS, TICKS_PER_SECOND, TOOLBELT_SLOTS,
};

use std::path::Path;
use std::sync::Arc;

use jarkeeper_economy::{
    ConsumeAction, EconomyError, EconomyResult, ItemCatalog, ModConfig, Recipe, RecipeBook,
    RecipeId, RecipeIngredient, DEFAULT_MAX_STACK,
};
use jarkeeper_shared::{ActorId, InvocationId, Vec3, DEFAULT_JAR_ITEM};

use crate::hooks::{
    AdmissionCall, CancelCall, ConsumptionCall, ConsumptionKind, HookEvent, HookVerdict, Phase,
};
use crate::keeper::JarKeeper;

/// Meat stew: boiled water + 2 raw meat.
pub const RECIPE_MEAT_STEW: RecipeId = 1;
/// Boiled water from river water. Output is a jar content.
pub const RECIPE_BOIL_WATER: RecipeId = 2;
/// Goldenrod tea: boiled water + goldenrod. Output is a jar content.
pub const RECIPE_GOLDENROD_TEA: RecipeId = 3;
/// Bandage from cloth. No jar involved.
pub const RECIPE_BANDAGE: RecipeId = 4;

/// The item set used by the simulation, shared.
#[must_use]
pub fn standard_catalog() -> Arc<ItemCatalog> {
    Arc::new(standard_items())
}

/// The item set used by the simulation, open for extra registrations.
#[must_use]
pub fn standard_items() -> ItemCatalog {
    let jar = || Some(ConsumeAction::jar_refund(DEFAULT_JAR_ITEM));
    let can = ConsumeAction {
        creates_item: Some("drinkCanEmpty".to_string()),
        creates_count: 1,
        uses_jar_refund: false,
    };
    let items: [(&str, u32, Option<ConsumeAction>); 15] = [
        (DEFAULT_JAR_ITEM, 10, None),
        ("drinkJarBoiledWater", 10, jar()),
        ("drinkJarRiverWater", 10, jar()),
        ("drinkJarGoldenRodTea", 10, jar()),
        ("drinkJarBeer", 10, jar()),
        ("drinkCanEmpty", DEFAULT_MAX_STACK, None),
        ("drinkCanWater", 10, Some(can)),
        ("foodRawMeat", DEFAULT_MAX_STACK, None),
        ("foodMeatStew", 10, Some(ConsumeAction::plain())),
        ("foodHoney", 10, Some(ConsumeAction::plain())),
        ("resourceGoldenrod", DEFAULT_MAX_STACK, None),
        ("resourceCloth", DEFAULT_MAX_STACK, None),
        ("resourceRockSmall", DEFAULT_MAX_STACK, None),
        ("resourceBrokenGlass", DEFAULT_MAX_STACK, None),
        ("medicalBandage", DEFAULT_MAX_STACK, None),
    ];

    let mut catalog = ItemCatalog::new();
    for (name, max_stack, consume) in items {
        if let Err(e) = catalog.register(name, max_stack, consume) {
            tracing::warn!("Skipping {name}: {e}");
        }
    }
    catalog
}

/// Recipes over [`standard_catalog`].
#[must_use]
pub fn standard_recipes(catalog: &ItemCatalog) -> RecipeBook {
    let mut book = RecipeBook::new();
    let specs: [(RecipeId, &str, &[(&str, u32)], &str); 4] = [
        (
            RECIPE_MEAT_STEW,
            "Meat Stew",
            &[("drinkJarBoiledWater", 1), ("foodRawMeat", 2)],
            "foodMeatStew",
        ),
        (
            RECIPE_BOIL_WATER,
            "Boiled Water",
            &[("drinkJarRiverWater", 1)],
            "drinkJarBoiledWater",
        ),
        (
            RECIPE_GOLDENROD_TEA,
            "Goldenrod Tea",
            &[("drinkJarBoiledWater", 1), ("resourceGoldenrod", 1)],
            "drinkJarGoldenRodTea",
        ),
        (RECIPE_BANDAGE, "Bandage", &[("resourceCloth", 2)], "medicalBandage"),
    ];

    for (id, name, ingredients, output) in specs {
        let recipe = build_recipe(catalog, id, name, ingredients, output)
            .and_then(|recipe| book.add_recipe(recipe));
        if let Err(e) = recipe {
            tracing::warn!("Skipping recipe {name}: {e}");
        }
    }
    book
}

fn build_recipe(
    catalog: &ItemCatalog,
    id: RecipeId,
    name: &str,
    ingredients: &[(&str, u32)],
    output: &str,
) -> EconomyResult<Recipe> {
    let ingredients = ingredients
        .iter()
        .map(|&(item, count)| Ok(RecipeIngredient::new(catalog.require(item)?, count)))
        .collect::<EconomyResult<Vec<_>>>()?;
    Recipe::new(
        id,
        name.to_string(),
        ingredients,
        RecipeIngredient::new(catalog.require(output)?, 1),
    )
}

/// A [`JarKeeper`] over a [`SimHost`], driven like a real host.
#[derive(Debug)]
pub struct Simulation {
    keeper: JarKeeper<SimHost>,
    next_invocation: u64,
}

impl Simulation {
    /// Default configuration, seeded survival roll.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(&ModConfig::default(), seed)
    }

    /// Custom configuration.
    #[must_use]
    pub fn with_config(config: &ModConfig, seed: u64) -> Self {
        let host = SimHost::with_standard_items(seed);
        let items = Arc::clone(host.catalog());
        Self {
            keeper: JarKeeper::new(host, config, items),
            next_invocation: 1,
        }
    }

    /// Runs `host` with the configuration found in `mod_dir`.
    #[must_use]
    pub fn from_mod_dir(host: SimHost, mod_dir: &Path) -> Self {
        let items = Arc::clone(host.catalog());
        Self {
            keeper: JarKeeper::from_mod_dir(host, mod_dir, items),
            next_invocation: 1,
        }
    }

    /// The runtime.
    #[must_use]
    pub const fn keeper(&self) -> &JarKeeper<SimHost> {
        &self.keeper
    }

    /// The host.
    #[must_use]
    pub const fn host(&self) -> &SimHost {
        self.keeper.host()
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut SimHost {
        self.keeper.host_mut()
    }

    /// Spawns the local player.
    pub fn spawn_player(&mut self, position: Vec3) -> ActorId {
        self.host_mut().spawn_player(position)
    }

    fn next_invocation(&mut self) -> InvocationId {
        let id = InvocationId(self.next_invocation);
        self.next_invocation += 1;
        id
    }

    /// Fires the begin event of a consumption. The host has not consumed
    /// anything yet.
    ///
    /// # Errors
    ///
    /// `UnknownItem` when `item` is not in the catalog.
    pub fn begin_drink(
        &mut self,
        actor: ActorId,
        item: &str,
        kind: ConsumptionKind,
    ) -> EconomyResult<ConsumptionCall> {
        let action = self
            .host()
            .catalog()
            .by_name(item)
            .ok_or_else(|| EconomyError::UnknownItem(item.to_string()))?
            .consume
            .clone()
            .unwrap_or_default();
        let call = ConsumptionCall {
            invocation: self.next_invocation(),
            actor,
            item: item.to_string(),
            action,
        };
        self.keeper.dispatch(&HookEvent::Consumption {
            kind,
            phase: Phase::Begin,
            call: &call,
        });
        Ok(call)
    }

    /// Lets the host consume, then fires the completion event.
    ///
    /// # Errors
    ///
    /// Whatever the host's consume reports; the completion event still
    /// fires.
    pub fn complete_drink(
        &mut self,
        call: &ConsumptionCall,
        kind: ConsumptionKind,
    ) -> EconomyResult<()> {
        let consumed = self.host_mut().consume(call.actor, &call.item).map(|_| ());
        self.fire_complete(call, kind);
        consumed
    }

    /// Fires a completion event without the host consuming anything.
    pub fn fire_complete(&mut self, call: &ConsumptionCall, kind: ConsumptionKind) {
        self.keeper.dispatch(&HookEvent::Consumption {
            kind,
            phase: Phase::Complete,
            call,
        });
    }

    /// A whole consumption.
    ///
    /// # Errors
    ///
    /// See [`begin_drink`](Self::begin_drink) and
    /// [`complete_drink`](Self::complete_drink).
    pub fn drink(&mut self, actor: ActorId, item: &str, kind: ConsumptionKind) -> EconomyResult<()> {
        let call = self.begin_drink(actor, item, kind)?;
        self.complete_drink(&call, kind)
    }

    /// Offers a craft to the actor's open queue. Returns whether the host
    /// admitted it.
    ///
    /// # Errors
    ///
    /// `RecipeNotFound` or the host's enqueue error.
    pub fn craft(&mut self, actor: ActorId, recipe_id: RecipeId, craft_count: u32) -> EconomyResult<bool> {
        let recipe = self.host().recipes().require(recipe_id)?.clone();
        let call = AdmissionCall {
            invocation: self.next_invocation(),
            actor,
            recipe,
            craft_count,
        };

        self.keeper.dispatch(&HookEvent::QueueAdmission {
            phase: Phase::Begin,
            call: &call,
        });
        let admitted = self.host_mut().enqueue_craft(actor, recipe_id, craft_count);
        self.keeper.dispatch(&HookEvent::QueueAdmission {
            phase: Phase::Complete,
            call: &call,
        });
        admitted
    }

    /// Cancels a queued craft. Returns the hook verdict, or `None` when the
    /// slot is empty.
    pub fn cancel(&mut self, actor: ActorId, slot: usize) -> Option<HookVerdict> {
        let entry = self.host().queue_entry(actor, slot)?.clone();
        let workstation = self.host().queue_workstation(actor).unwrap_or_default();
        let recipe = self.host().recipes().get_recipe(entry.recipe_id).cloned();
        let call = CancelCall {
            invocation: self.next_invocation(),
            actor,
            slot,
            entry,
            recipe,
            workstation,
        };

        let verdict = self.keeper.dispatch(&HookEvent::CancelQueuedCraft(&call));
        if verdict == HookVerdict::Continue {
            self.host_mut().cancel_default(actor, slot);
        }
        Some(verdict)
    }

    /// Runs `ticks` host updates.
    pub fn run_ticks(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.keeper.host_mut().step();
            self.keeper.tick();
        }
    }
}
