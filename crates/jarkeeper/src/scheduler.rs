//! # Tick Scheduler
//!
//! Cooperative delayed execution. The host advances the scheduler once per
//! update; a continuation registered with [`TickScheduler::schedule_after`]
//! runs on the first `advance` whose tick reaches its due tick.
//!
//! Continuations own their inputs by value. They receive the host and the
//! scanner through [`TickContext`] when they run, never at scheduling time,
//! so nothing borrowed outlives the hook that scheduled it.
//!
//! Ordering: due tick first, then scheduling order.

use std::collections::BTreeMap;

use jarkeeper_shared::Tick;

use crate::host::Host;
use crate::scanner::LocationScanner;

/// What a continuation sees when it runs.
pub struct TickContext<'a> {
    /// The host engine.
    pub host: &'a mut dyn Host,
    /// Shared location scanner.
    pub scanner: &'a mut LocationScanner,
    /// Tick being executed.
    pub now: Tick,
}

/// A deferred piece of work.
pub type Continuation = Box<dyn FnOnce(&mut TickContext<'_>)>;

/// Single-threaded tick scheduler.
#[derive(Default)]
pub struct TickScheduler {
    now: Tick,
    next_seq: u64,
    queue: BTreeMap<(Tick, u64), Continuation>,
}

impl std::fmt::Debug for TickScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickScheduler")
            .field("now", &self.now)
            .field("pending", &self.queue.len())
            .finish()
    }
}

impl TickScheduler {
    /// Creates a scheduler at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tick.
    #[inline]
    #[must_use]
    pub const fn now(&self) -> Tick {
        self.now
    }

    /// Continuations not yet run.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Runs `task` `ticks` ticks from now. Returns the due tick.
    ///
    /// A delay of 0 still waits for the next `advance`.
    pub fn schedule_after<F>(&mut self, ticks: u64, task: F) -> Tick
    where
        F: FnOnce(&mut TickContext<'_>) + 'static,
    {
        let due = self.now.saturating_add(ticks.max(1));
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((due, seq), Box::new(task));
        due
    }

    /// Moves to the next tick and runs everything due. Returns how many
    /// continuations ran.
    pub fn advance(&mut self, host: &mut dyn Host, scanner: &mut LocationScanner) -> usize {
        self.now += 1;

        // Split first: anything due later stays queued untouched.
        let later = self.queue.split_off(&(self.now + 1, 0));
        let due = std::mem::replace(&mut self.queue, later);

        let mut cx = TickContext {
            host,
            scanner,
            now: self.now,
        };
        let ran = due.len();
        for (_, task) in due {
            task(&mut cx);
        }
        ran
    }
}
