//! Capability check port.

use crate::journey::domain::{Caller, Capability};

/// Black-box decision on whether a caller holds a capability.
pub trait CapabilityPolicy: Send + Sync {
    /// Returns `true` when `caller` may perform `capability`.
    fn permits(&self, caller: &Caller, capability: Capability) -> bool;
}
