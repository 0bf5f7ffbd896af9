//! Domain model for projects and their status registries.
//!
//! Status names are plain validated strings looked up in the owning
//! project's registry rather than a closed enumeration, since each project
//! defines its own columns and the owner may change them at any time.

mod error;
mod ids;
mod member;
mod project;
mod status;

pub use error::ProjectDomainError;
pub use ids::{ProjectId, UserId};
pub use member::{Member, MemberRole, ParseMemberRoleError};
pub use project::{AccessDenied, NewProject, PersistedProjectData, Project};
pub use status::{DEFAULT_STATUS_COLOR, StatusDefinition, StatusEntry, StatusName, StatusRegistry};
