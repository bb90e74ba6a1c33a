//! # Hook Dispatch Table
//!
//! The host exposes a handful of named operation points. Each point fires an
//! event before and/or after the host's own implementation runs; hooks are
//! registered against points with an explicit priority.
//!
//! ```text
//! host op ──► HookRegistry::dispatch(event)
//!               ├─ hook A (priority 600)
//!               ├─ hook B (priority 400)
//!               └─ hook C (priority 200)
//!             ◄── HookVerdict (SkipOriginal if any hook asked for it)
//! ```
//!
//! Every matching hook runs, highest priority first; ties keep registration
//! order. A `Begin*` / cancel verdict of [`HookVerdict::SkipOriginal`] tells
//! the host not to run its own implementation.

use jarkeeper_economy::{ConsumeAction, QueueEntry, Recipe, WorkstationKind};
use jarkeeper_shared::{ActorId, InvocationId};

use crate::host::Host;
use crate::scanner::LocationScanner;
use crate::scheduler::TickScheduler;

/// Named host operation points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// Start of a multi-frame (animated) consumption.
    BeginAnimatedConsumption,
    /// End of a multi-frame consumption.
    CompleteAnimatedConsumption,
    /// Start of an instant consumption.
    BeginInstantConsumption,
    /// End of an instant consumption.
    CompleteInstantConsumption,
    /// Before a craft request is offered to the queue.
    BeginQueueAdmission,
    /// After the queue accepted or refused the request.
    CompleteQueueAdmission,
    /// A queued craft is being cancelled.
    CancelQueuedCraft,
}

impl HookPoint {
    /// Every point, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::BeginAnimatedConsumption,
        Self::CompleteAnimatedConsumption,
        Self::BeginInstantConsumption,
        Self::CompleteInstantConsumption,
        Self::BeginQueueAdmission,
        Self::CompleteQueueAdmission,
        Self::CancelQueuedCraft,
    ];
}

/// The two consumption shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConsumptionKind {
    /// Eating/drinking with an animation spanning several frames.
    Animated,
    /// Immediate use.
    Instant,
}

/// Which side of the host's own implementation an event is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before the host runs the operation.
    Begin,
    /// After the host ran the operation.
    Complete,
}

/// Arguments of a consumption call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsumptionCall {
    /// Identifies one begin/complete pair.
    pub invocation: InvocationId,
    /// Who consumes.
    pub actor: ActorId,
    /// Item being consumed.
    pub item: String,
    /// The item's consumption action.
    pub action: ConsumeAction,
}

/// Arguments of a queue admission call.
#[derive(Clone, Debug)]
pub struct AdmissionCall {
    /// Identifies one begin/complete pair.
    pub invocation: InvocationId,
    /// Who is crafting.
    pub actor: ActorId,
    /// Recipe offered to the queue.
    pub recipe: Recipe,
    /// Number of crafts requested.
    pub craft_count: u32,
}

/// Arguments of a cancel call.
#[derive(Clone, Debug)]
pub struct CancelCall {
    /// Identifies the call.
    pub invocation: InvocationId,
    /// Who owns the queue.
    pub actor: ActorId,
    /// Queue slot being cancelled.
    pub slot: usize,
    /// What the slot holds.
    pub entry: QueueEntry,
    /// The entry's recipe, when the host still knows it.
    pub recipe: Option<Recipe>,
    /// Input kind of the workstation owning the queue.
    pub workstation: WorkstationKind,
}

/// One firing of a hook point.
#[derive(Clone, Copy, Debug)]
pub enum HookEvent<'a> {
    /// Animated or instant consumption, begin or complete.
    Consumption {
        /// Shape of the consumption.
        kind: ConsumptionKind,
        /// Begin or complete.
        phase: Phase,
        /// Call arguments.
        call: &'a ConsumptionCall,
    },
    /// Queue admission, begin or complete.
    QueueAdmission {
        /// Begin or complete.
        phase: Phase,
        /// Call arguments.
        call: &'a AdmissionCall,
    },
    /// Cancel of a queued craft.
    CancelQueuedCraft(&'a CancelCall),
}

impl HookEvent<'_> {
    /// The point this event fires on.
    #[must_use]
    pub const fn point(&self) -> HookPoint {
        match self {
            Self::Consumption {
                kind: ConsumptionKind::Animated,
                phase: Phase::Begin,
                ..
            } => HookPoint::BeginAnimatedConsumption,
            Self::Consumption {
                kind: ConsumptionKind::Animated,
                phase: Phase::Complete,
                ..
            } => HookPoint::CompleteAnimatedConsumption,
            Self::Consumption {
                kind: ConsumptionKind::Instant,
                phase: Phase::Begin,
                ..
            } => HookPoint::BeginInstantConsumption,
            Self::Consumption {
                kind: ConsumptionKind::Instant,
                phase: Phase::Complete,
                ..
            } => HookPoint::CompleteInstantConsumption,
            Self::QueueAdmission {
                phase: Phase::Begin,
                ..
            } => HookPoint::BeginQueueAdmission,
            Self::QueueAdmission {
                phase: Phase::Complete,
                ..
            } => HookPoint::CompleteQueueAdmission,
            Self::CancelQueuedCraft(_) => HookPoint::CancelQueuedCraft,
        }
    }
}

/// What a hook tells the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HookVerdict {
    /// Run the host's own implementation.
    #[default]
    Continue,
    /// The hook handled the operation; skip the host's implementation.
    SkipOriginal,
}

/// Hook ordering. Higher runs first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub u16);

impl Priority {
    /// Runs before normal hooks.
    pub const HIGH: Self = Self(600);
    /// Default.
    pub const NORMAL: Self = Self(400);
    /// Runs after normal hooks.
    pub const LOW: Self = Self(200);
}

impl Default for Priority {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Runtime services handed to a hook.
pub struct HookContext<'a> {
    /// The host engine.
    pub host: &'a mut dyn Host,
    /// Shared location scanner.
    pub scanner: &'a mut LocationScanner,
    /// Scheduler for deferred work.
    pub scheduler: &'a mut TickScheduler,
}

impl HookContext<'_> {
    /// Current tick.
    #[must_use]
    pub fn now(&self) -> jarkeeper_shared::Tick {
        self.scheduler.now()
    }
}

/// A hook attached to one or more operation points.
pub trait Hook {
    /// Name for logs.
    fn name(&self) -> &str;

    /// Points this hook listens on.
    fn points(&self) -> &[HookPoint];

    /// Ordering among hooks on the same point.
    fn priority(&self) -> Priority {
        Priority::NORMAL
    }

    /// Handles one event.
    fn handle(&mut self, event: &HookEvent<'_>, cx: &mut HookContext<'_>) -> HookVerdict;
}

/// Priority-ordered hook table.
#[derive(Default)]
pub struct HookRegistry {
    hooks: Vec<Box<dyn Hook>>,
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().map(|hook| (hook.name(), hook.priority())))
            .finish()
    }
}

impl HookRegistry {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a hook.
    pub fn register(&mut self, hook: Box<dyn Hook>) {
        tracing::debug!(
            "Registered hook {} at priority {} on {:?}",
            hook.name(),
            hook.priority().0,
            hook.points()
        );
        self.hooks.push(hook);
        // stable: equal priorities keep registration order
        self.hooks.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Number of registered hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Hook names listening on `point`, in run order.
    #[must_use]
    pub fn listeners(&self, point: HookPoint) -> Vec<&str> {
        self.hooks
            .iter()
            .filter(|hook| hook.points().contains(&point))
            .map(|hook| hook.name())
            .collect()
    }

    /// Fires `event` on every hook listening on its point.
    pub fn dispatch(&mut self, event: &HookEvent<'_>, cx: &mut HookContext<'_>) -> HookVerdict {
        let point = event.point();
        let mut verdict = HookVerdict::Continue;

        for hook in &mut self.hooks {
            if !hook.points().contains(&point) {
                continue;
            }
            if hook.handle(event, cx) == HookVerdict::SkipOriginal {
                tracing::debug!("{} skips the original {point:?}", hook.name());
                verdict = HookVerdict::SkipOriginal;
            }
        }
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimHost;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        name: &'static str,
        priority: Priority,
        verdict: HookVerdict,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Hook for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn points(&self) -> &[HookPoint] {
            &[HookPoint::CancelQueuedCraft]
        }

        fn priority(&self) -> Priority {
            self.priority
        }

        fn handle(&mut self, _event: &HookEvent<'_>, _cx: &mut HookContext<'_>) -> HookVerdict {
            self.log.borrow_mut().push(self.name);
            self.verdict
        }
    }

    fn cancel_call() -> CancelCall {
        CancelCall {
            invocation: InvocationId(1),
            actor: ActorId(1),
            slot: 0,
            entry: QueueEntry::new(1, 1),
            recipe: None,
            workstation: WorkstationKind::Backpack,
        }
    }

    #[test]
    fn test_priority_order_and_combined_verdict() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HookRegistry::new();
        for (name, priority, verdict) in [
            ("low", Priority::LOW, HookVerdict::Continue),
            ("normal-a", Priority::NORMAL, HookVerdict::SkipOriginal),
            ("high", Priority::HIGH, HookVerdict::Continue),
            ("normal-b", Priority::NORMAL, HookVerdict::Continue),
        ] {
            registry.register(Box::new(Recorder {
                name,
                priority,
                verdict,
                log: Rc::clone(&log),
            }));
        }

        let mut host = SimHost::with_standard_items(1);
        let mut scanner = LocationScanner::new();
        let mut scheduler = TickScheduler::new();
        let mut cx = HookContext {
            host: &mut host,
            scanner: &mut scanner,
            scheduler: &mut scheduler,
        };

        let call = cancel_call();
        let verdict = registry.dispatch(&HookEvent::CancelQueuedCraft(&call), &mut cx);

        assert_eq!(verdict, HookVerdict::SkipOriginal);
        assert_eq!(*log.borrow(), vec!["high", "normal-a", "normal-b", "low"]);
        assert_eq!(
            registry.listeners(HookPoint::CancelQueuedCraft),
            vec!["high", "normal-a", "normal-b", "low"]
        );
        assert!(registry.listeners(HookPoint::BeginInstantConsumption).is_empty());
    }

    #[test]
    fn test_event_points() {
        let call = ConsumptionCall {
            invocation: InvocationId(1),
            actor: ActorId(1),
            item: "drinkJarBoiledWater".to_string(),
            action: ConsumeAction::plain(),
        };
        let event = HookEvent::Consumption {
            kind: ConsumptionKind::Instant,
            phase: Phase::Complete,
            call: &call,
        };
        assert_eq!(event.point(), HookPoint::CompleteInstantConsumption);
        assert_eq!(HookPoint::ALL.len(), 7);
    }
}
