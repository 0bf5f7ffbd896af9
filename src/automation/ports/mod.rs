//! Port definitions for automation persistence and badge awards.

mod badges;
mod repository;

pub use badges::{BadgeLedger, BadgeLedgerError, BadgeLedgerResult};
pub use repository::{AutomationRepository, AutomationRepositoryError, AutomationRepositoryResult};
