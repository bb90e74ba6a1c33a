//! Identifier newtypes shared across the host boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheduler tick index.
pub type Tick = u64;

/// An entity in the host world that can hold an inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// One logical execution context of a host operation.
///
/// The start and completion phases of the same host call carry the same
/// invocation id. Two calls that may overlap never share one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InvocationId(pub u64);

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call#{}", self.0)
    }
}
