//! # JarKeeper Runtime
//!
//! Owns everything that lives for the whole session: the host handle, the
//! shared jar registry, the hook table and the tick scheduler.
//!
//! The host calls [`JarKeeper::dispatch`] from each hooked operation and
//! [`JarKeeper::tick`] once per update. All host mutation happens inside
//! those two calls.

use std::path::Path;
use std::sync::Arc;

use jarkeeper_economy::{ItemLookup, JarContentRegistry, ModConfig, Settings};
use jarkeeper_shared::Tick;

use crate::craft_queue::CraftQueueTracker;
use crate::dispatcher::EffectDispatcher;
use crate::hooks::{HookContext, HookEvent, HookPoint, HookRegistry, HookVerdict, Priority};
use crate::host::Host;
use crate::interceptor::ConsumptionInterceptor;
use crate::refund::RefundPolicy;
use crate::scanner::LocationScanner;
use crate::scheduler::TickScheduler;

/// Name of the break notification hook.
pub const NOTIFY_HOOK: &str = "break-notification";

/// Name of the replacement grant hook.
pub const REWARD_HOOK: &str = "broken-glass-reward";

/// Session runtime over one host.
pub struct JarKeeper<H: Host> {
    host: H,
    scanner: LocationScanner,
    scheduler: TickScheduler,
    hooks: HookRegistry,
    registry: Arc<JarContentRegistry>,
    settings: Settings,
}

impl<H: Host> std::fmt::Debug for JarKeeper<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JarKeeper")
            .field("scheduler", &self.scheduler)
            .field("hooks", &self.hooks)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<H: Host> JarKeeper<H> {
    /// Builds the runtime and installs the hooks enabled in `config`.
    pub fn new(host: H, config: &ModConfig, items: Arc<dyn ItemLookup>) -> Self {
        let registry = Arc::new(JarContentRegistry::new(&config.jar_contents, items));
        let settings = config.settings.clone();

        let mut hooks = HookRegistry::new();
        if settings.notify_enabled {
            hooks.register(Box::new(
                ConsumptionInterceptor::new(
                    NOTIFY_HOOK,
                    Priority::NORMAL,
                    EffectDispatcher::notify_only(settings.sound.clone()),
                )
                .verbose(settings.debug_mode),
            ));
        }
        if settings.reward_enabled {
            hooks.register(Box::new(
                ConsumptionInterceptor::new(
                    REWARD_HOOK,
                    Priority::LOW,
                    EffectDispatcher::grant_only(settings.reward_item.clone(), settings.reward_count),
                )
                .verbose(settings.debug_mode),
            ));
        }
        hooks.register(Box::new(CraftQueueTracker::new(Arc::clone(&registry))));
        hooks.register(Box::new(RefundPolicy::new(Arc::clone(&registry))));

        tracing::info!(
            "JarKeeper loaded: {} jar overrides, {} hooks (notify={}, reward={})",
            registry.override_count(),
            hooks.len(),
            settings.notify_enabled,
            settings.reward_enabled
        );

        Self {
            host,
            scanner: LocationScanner::new(),
            scheduler: TickScheduler::new(),
            hooks,
            registry,
            settings,
        }
    }

    /// Loads `<mod_dir>/Config` and builds the runtime.
    pub fn from_mod_dir(host: H, mod_dir: &Path, items: Arc<dyn ItemLookup>) -> Self {
        Self::new(host, &ModConfig::load(mod_dir), items)
    }

    /// Fires a hooked host operation.
    pub fn dispatch(&mut self, event: &HookEvent<'_>) -> HookVerdict {
        let mut cx = HookContext {
            host: &mut self.host,
            scanner: &mut self.scanner,
            scheduler: &mut self.scheduler,
        };
        self.hooks.dispatch(event, &mut cx)
    }

    /// Advances one host update. Returns how many continuations ran.
    pub fn tick(&mut self) -> usize {
        self.scheduler.advance(&mut self.host, &mut self.scanner)
    }

    /// Current tick.
    #[must_use]
    pub const fn now(&self) -> Tick {
        self.scheduler.now()
    }

    /// Deferred checks not yet run.
    #[must_use]
    pub fn pending_continuations(&self) -> usize {
        self.scheduler.pending()
    }

    /// The host.
    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The shared jar registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<JarContentRegistry> {
        &self.registry
    }

    /// Settings in effect.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Hook names on `point`, in run order.
    #[must_use]
    pub fn listeners(&self, point: HookPoint) -> Vec<&str> {
        self.hooks.listeners(point)
    }
}
