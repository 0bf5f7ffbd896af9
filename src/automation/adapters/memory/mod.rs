//! In-memory adapters for automation persistence and badges.

mod automation;
mod badges;

pub use automation::InMemoryAutomationRepository;
pub use badges::InMemoryBadgeLedger;
