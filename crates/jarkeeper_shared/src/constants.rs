//! # Engine Contract Constants
//!
//! Values the inference engine depends on. These are contracts with the host
//! engine, not tuning knobs.

/// Ticks between a consumption completing and its outcome being resolved.
///
/// The host applies the container return a little after the consume call
/// returns; three ticks is the smallest delay at which the inventory query
/// reliably observes it.
pub const REFUND_CHECK_DELAY_TICKS: u64 = 3;

/// Half-extent of the cube scanned for dropped containers around an actor.
pub const GROUND_SCAN_RADIUS: f32 = 5.0;

/// Despawn horizon (seconds) for items dropped at an actor's feet.
pub const DROP_DESPAWN_SECONDS: f32 = 120.0;

/// Container item used when a configured override does not name one.
pub const DEFAULT_JAR_ITEM: &str = "drinkJarEmpty";

/// Localization key shown when a grant or refund overflows to the ground.
pub const INVENTORY_FULL_TOOLTIP: &str = "xuiInventoryFullDropping";
