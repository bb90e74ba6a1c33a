//! # Consumption Interceptor
//!
//! Hooks the begin/complete points of both consumption shapes and turns
//! them into a deferred outcome check.
//!
//! ```text
//! Begin*     reset state for this invocation (and older state of the actor)
//!            ineligible item or non-player actor -> stop
//!            OutcomeSampler::begin -> pending[invocation]
//!
//! Complete*  pending.remove(invocation) -> none: no-op
//!            schedule_after(3): resolve -> EffectDispatcher
//! ```
//!
//! Each interceptor owns its pending map and its continuations. Two
//! interceptors on the same consumption (notification and reward) each
//! derive the outcome on their own.

use std::collections::HashMap;

use jarkeeper_shared::{InvocationId, REFUND_CHECK_DELAY_TICKS};

use crate::dispatcher::EffectDispatcher;
use crate::hooks::{
    ConsumptionCall, Hook, HookContext, HookEvent, HookPoint, HookVerdict, Phase, Priority,
};
use crate::sampler::{OutcomeSampler, TrackingToken};

const POINTS: [HookPoint; 4] = [
    HookPoint::BeginAnimatedConsumption,
    HookPoint::CompleteAnimatedConsumption,
    HookPoint::BeginInstantConsumption,
    HookPoint::CompleteInstantConsumption,
];

/// Tracks refund-eligible consumptions and reacts to broken jars.
#[derive(Debug)]
pub struct ConsumptionInterceptor {
    name: String,
    priority: Priority,
    sampler: OutcomeSampler,
    dispatcher: EffectDispatcher,
    pending: HashMap<InvocationId, TrackingToken>,
    verbose: bool,
}

impl ConsumptionInterceptor {
    /// Creates an interceptor that runs `dispatcher` on every broken jar.
    #[must_use]
    pub fn new(name: impl Into<String>, priority: Priority, dispatcher: EffectDispatcher) -> Self {
        Self {
            name: name.into(),
            priority,
            sampler: OutcomeSampler::new(),
            dispatcher,
            pending: HashMap::new(),
            verbose: false,
        }
    }

    /// Logs every tracked consumption at info level.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Consumptions begun but not yet completed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn on_begin(&mut self, call: &ConsumptionCall, cx: &mut HookContext<'_>) {
        // Never let a stale token from an earlier call leak forward.
        self.pending.remove(&call.invocation);
        self.pending
            .retain(|_, token| token.event().is_some_and(|event| event.actor != call.actor));

        if !cx.host.is_local_player(call.actor) {
            return;
        }

        let now = cx.now();
        let token = self
            .sampler
            .begin(&*cx.host, cx.scanner, now, call.actor, &call.action);
        if let Some(event) = token.event() {
            if self.verbose {
                tracing::info!(
                    "[{}] {} consumes {} - tracking {} (before {})",
                    self.name,
                    call.actor,
                    call.item,
                    event.container_name,
                    event.before.total()
                );
            }
            self.pending.insert(call.invocation, token);
        }
    }

    fn on_complete(&mut self, call: &ConsumptionCall, cx: &mut HookContext<'_>) {
        let Some(token) = self.pending.remove(&call.invocation) else {
            return;
        };

        let sampler = self.sampler;
        let dispatcher = self.dispatcher.clone();
        let name = self.name.clone();
        let verbose = self.verbose;

        cx.scheduler.schedule_after(REFUND_CHECK_DELAY_TICKS, move |tick| {
            let Some(outcome) = sampler.resolve(&*tick.host, tick.scanner, tick.now, &token) else {
                return;
            };
            let Some(event) = token.event() else {
                return;
            };
            if verbose {
                tracing::info!("[{name}] {} for {}: {outcome:?}", event.container_name, event.actor);
            }
            dispatcher.dispatch(tick.host, event.actor, outcome);
        });
    }
}

impl Hook for ConsumptionInterceptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn points(&self) -> &[HookPoint] {
        &POINTS
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn handle(&mut self, event: &HookEvent<'_>, cx: &mut HookContext<'_>) -> HookVerdict {
        if let HookEvent::Consumption { phase, call, .. } = *event {
            match phase {
                Phase::Begin => self.on_begin(call, cx),
                Phase::Complete => self.on_complete(call, cx),
            }
        }
        HookVerdict::Continue
    }
}
