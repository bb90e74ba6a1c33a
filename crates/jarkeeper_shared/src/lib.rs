//! # JARKEEPER Shared
//!
//! Common types used by the economy model, the inference engine and the
//! simulated host.
//!
//! ## RULE
//!
//! This crate must never depend on a host engine. Everything here is plain
//! data that can cross the host boundary by value.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod ids;
pub mod math;

pub use constants::{
    DEFAULT_JAR_ITEM, DROP_DESPAWN_SECONDS, GROUND_SCAN_RADIUS, INVENTORY_FULL_TOOLTIP,
    REFUND_CHECK_DELAY_TICKS,
};
pub use ids::{ActorId, InvocationId, Tick};
pub use math::{Bounds, Vec3};
