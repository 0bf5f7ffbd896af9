//! Application services for project and membership management.

mod management;

pub use management::{
    AddMemberRequest, CreateProjectRequest, ProjectService, ProjectServiceError,
    ProjectServiceResult, UpdateProjectRequest,
};
