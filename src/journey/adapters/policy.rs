//! Default capability policy keyed on the caller's surface.

use crate::journey::{
    domain::{Caller, Capability, Surface},
    ports::CapabilityPolicy,
};

/// Grants the admin surface everything and the portal surface reads,
/// status updates, progress queries and, when enabled, task creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfacePolicy {
    portal_may_create_tasks: bool,
}

impl SurfacePolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(portal_may_create_tasks: bool) -> Self {
        Self {
            portal_may_create_tasks,
        }
    }
}

impl CapabilityPolicy for SurfacePolicy {
    fn permits(&self, caller: &Caller, capability: Capability) -> bool {
        match caller.surface() {
            Surface::Admin => true,
            Surface::Portal { .. } => match capability {
                Capability::ReadTasks | Capability::UpdateStatus | Capability::InspectProgress => {
                    true
                }
                Capability::CreateTask => self.portal_may_create_tasks,
                Capability::EditTask
                | Capability::DeleteTask
                | Capability::ToggleCalendarSync
                | Capability::AdvanceStage => false,
            },
        }
    }
}
