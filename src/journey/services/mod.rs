//! Orchestration services for the journey stage engine.

mod audit_trail;
mod calendar;
mod coordinator;
mod error;
mod gate;
mod generator;
mod locks;
mod registry;
mod requests;
mod verdicts;

pub use calendar::{CalendarOutcome, CalendarReconciler};
pub use coordinator::{JourneyPorts, TaskCoordinator};
pub use error::{JourneyError, JourneyResult};
pub use gate::ProgressionGate;
pub use generator::TaskGenerator;
pub use locks::{EntityGuard, EntityLocks};
pub use registry::PipelineRegistryService;
pub use requests::{CreateFreeformTaskRequest, RegisterEntityRequest};

use audit_trail::AuditTrail;
use verdicts::GateVerdicts;
