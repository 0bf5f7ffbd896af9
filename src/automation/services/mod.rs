//! Application services for automation management and execution.

mod engine;
mod executor;
mod management;

pub use engine::{AutomationEngine, AutomationExecution, CascadeLimitExceeded, CascadeReport};
pub use executor::{ActionExecution, ActionExecutor};
pub use management::{
    AutomationService, AutomationServiceError, AutomationServiceResult, CreateAutomationRequest,
    UpdateAutomationRequest,
};
