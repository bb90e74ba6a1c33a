//! # JARKEEPER
//!
//! Infers whether a consumed glass jar survived, and keeps the crafting
//! queue from handing out jars twice.
//!
//! The host engine rolls jar survival internally and never reports the
//! result. This crate reconstructs it from what the host does expose:
//! item counts in the backpack, the toolbelt and on the ground, sampled
//! before the consumption and again a few ticks after.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                             JarKeeper<H>                             │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                                                                      │
//! │   host op ──► HookRegistry ──┬─► ConsumptionInterceptor (notify)     │
//! │                              ├─► ConsumptionInterceptor (reward)     │
//! │                              ├─► CraftQueueTracker                   │
//! │                              └─► RefundPolicy                        │
//! │                                        │                             │
//! │   OutcomeSampler ◄── TickScheduler ◄───┘    JarContentRegistry       │
//! │        │                                    (jarkeeper_economy)      │
//! │        ▼                                                             │
//! │   EffectDispatcher ──► Host (sound, grant, ground drop, tooltip)     │
//! │                                                                      │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `host`: the host boundary trait and the fallible-call adapter
//! - `scanner`, `sampler`: counting and outcome classification
//! - `dispatcher`: sound, grants, refunds with ground overflow
//! - `hooks`, `scheduler`: dispatch table and deferred work
//! - `interceptor`, `craft_queue`, `refund`: the installed hooks
//! - `keeper`: the session runtime
//! - `sim`: an in-memory host

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod craft_queue;
pub mod dispatcher;
pub mod hooks;
pub mod host;
pub mod interceptor;
pub mod keeper;
pub mod refund;
pub mod sampler;
pub mod scanner;
pub mod scheduler;
pub mod sim;

pub use craft_queue::{Admission, AdmissionState, CraftQueueTracker, QueueSnapshot};
pub use dispatcher::{EffectDispatcher, GrantOutcome, RefundSummary};
pub use hooks::{
    AdmissionCall, CancelCall, ConsumptionCall, ConsumptionKind, Hook, HookContext, HookEvent,
    HookPoint, HookRegistry, HookVerdict, Phase, Priority,
};
pub use host::{guarded, Compartment, Host, HostError, HostResult};
pub use interceptor::ConsumptionInterceptor;
pub use keeper::JarKeeper;
pub use refund::RefundPolicy;
pub use sampler::{ConsumptionEvent, Outcome, OutcomeSampler, TrackingToken};
pub use scanner::{LocationKind, LocationScanner, SampleSnapshot};
pub use scheduler::{TickContext, TickScheduler};

pub use jarkeeper_economy as economy;
pub use jarkeeper_shared as shared;
