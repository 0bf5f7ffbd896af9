//! Project lifecycle, membership, and status registry management.

use crate::concurrency::ProjectWriteLocks;
use crate::error::ErrorKind;
use crate::event::{Causation, DomainChange, DomainEvent};
use crate::project::{
    domain::{
        AccessDenied, Member, MemberRole, NewProject, Project, ProjectDomainError, ProjectId,
        StatusDefinition, StatusRegistry, UserId,
    },
    ports::{ProjectRepository, ProjectRepositoryError},
};
use crate::realtime::ports::EventDispatcher;
use crate::task::ports::{TaskRepository, TaskRepositoryError};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    statuses: Option<Vec<StatusDefinition>>,
}

impl CreateProjectRequest {
    /// Creates a request seeded with the default status registry.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            statuses: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets an explicit status registry.
    #[must_use]
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = StatusDefinition>) -> Self {
        self.statuses = Some(statuses.into_iter().collect());
        self
    }
}

/// Request payload for editing project details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl UpdateProjectRequest {
    /// Creates an empty edit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a new title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets a new description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Request payload for inviting a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    user: UserId,
    #[serde(default)]
    role: MemberRole,
}

impl AddMemberRequest {
    /// Invites a user as a viewer.
    #[must_use]
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            role: MemberRole::default(),
        }
    }

    /// Sets the role.
    #[must_use]
    pub const fn with_role(mut self, role: MemberRole) -> Self {
        self.role = role;
        self
    }
}

/// Service-level errors for project operations.
#[derive(Debug, Error)]
pub enum ProjectServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ProjectDomainError),

    /// Project repository operation failed.
    #[error(transparent)]
    Repository(#[from] ProjectRepositoryError),

    /// Task repository operation failed.
    #[error(transparent)]
    TaskRepository(#[from] TaskRepositoryError),

    /// The project does not exist or the caller is not a member.
    #[error("project not found: {0}")]
    NotFound(ProjectId),

    /// The caller is a member but not the owner.
    #[error("only the owner may modify project {0}")]
    NotOwner(ProjectId),

    /// A status being removed still has tasks in it.
    #[error("status '{status}' still holds {tasks} task(s)")]
    StatusInUse {
        /// Status that would be removed.
        status: String,
        /// Number of tasks still in it.
        tasks: usize,
    },
}

impl ProjectServiceError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(ProjectDomainError::NotMember(_))
            | Self::NotFound(_)
            | Self::Repository(ProjectRepositoryError::NotFound(_)) => ErrorKind::NotFound,
            Self::Domain(_) | Self::StatusInUse { .. } => ErrorKind::Validation,
            Self::NotOwner(_) => ErrorKind::Authorization,
            Self::Repository(_) | Self::TaskRepository(_) => ErrorKind::Persistence,
        }
    }
}

/// Result type for project service operations.
pub type ProjectServiceResult<T> = Result<T, ProjectServiceError>;

/// Project management service.
#[derive(Clone)]
pub struct ProjectService<P, T, C>
where
    P: ProjectRepository,
    T: TaskRepository,
    C: Clock + Send + Sync,
{
    projects: Arc<P>,
    tasks: Arc<T>,
    dispatcher: Arc<dyn EventDispatcher>,
    locks: Arc<ProjectWriteLocks>,
    clock: Arc<C>,
}

impl<P, T, C> ProjectService<P, T, C>
where
    P: ProjectRepository,
    T: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new project service.
    #[must_use]
    pub fn new(
        projects: Arc<P>,
        tasks: Arc<T>,
        dispatcher: Arc<dyn EventDispatcher>,
        locks: Arc<ProjectWriteLocks>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            projects,
            tasks,
            dispatcher,
            locks,
            clock,
        }
    }

    /// Creates a project owned by the caller.
    ///
    /// Without explicit statuses the project is seeded with `To Do`,
    /// `In Progress`, and `Done`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Domain`] for a blank title or an
    /// invalid status list.
    pub async fn create_project(
        &self,
        owner: UserId,
        request: CreateProjectRequest,
    ) -> ProjectServiceResult<Project> {
        let statuses = request
            .statuses
            .map(StatusRegistry::from_definitions)
            .transpose()?;
        let project = Project::new(
            NewProject {
                title: request.title,
                description: request.description,
                owner,
                statuses,
            },
            &*self.clock,
        )?;
        self.projects.store(&project).await?;
        info!(project_id = %project.id(), owner = %owner, "project created");
        Ok(project)
    }

    /// Returns a project the caller belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotFound`] for missing projects and
    /// non-members.
    pub async fn get_project(
        &self,
        user: UserId,
        project_id: ProjectId,
    ) -> ProjectServiceResult<Project> {
        let project = self.load(project_id).await?;
        authorize(&project, user, MemberRole::Viewer)?;
        Ok(project)
    }

    /// Returns every project the caller belongs to, most recently updated
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Repository`] when the lookup fails.
    pub async fn list_projects(&self, user: UserId) -> ProjectServiceResult<Vec<Project>> {
        Ok(self.projects.list_for_member(user).await?)
    }

    /// Edits title and description.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotOwner`] for non-owners and
    /// [`ProjectServiceError::Domain`] for a blank title.
    pub async fn update_project(
        &self,
        user: UserId,
        project_id: ProjectId,
        request: UpdateProjectRequest,
    ) -> ProjectServiceResult<Project> {
        let _guard = self.locks.acquire(project_id).await;
        let mut project = self.load(project_id).await?;
        authorize(&project, user, MemberRole::Owner)?;
        project.update_details(request.title, request.description, &*self.clock)?;
        self.projects.update(&project).await?;

        info!(project_id = %project_id, "project updated");
        self.publish(
            project_id,
            DomainChange::ProjectUpdated {
                project: project.clone(),
            },
            user,
        );
        Ok(project)
    }

    /// Deletes a project together with its tasks.
    ///
    /// The project's automations are kept; with the project gone they no
    /// longer match any event.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotOwner`] for non-owners.
    pub async fn delete_project(
        &self,
        user: UserId,
        project_id: ProjectId,
    ) -> ProjectServiceResult<()> {
        let guard = self.locks.acquire(project_id).await;
        let project = self.load(project_id).await?;
        authorize(&project, user, MemberRole::Owner)?;
        let removed_tasks = self.tasks.delete_by_project(project_id).await?;
        self.projects.delete(project_id).await?;

        info!(project_id = %project_id, removed_tasks, "project deleted");
        self.publish(project_id, DomainChange::ProjectDeleted, user);
        drop(guard);
        self.locks.forget(project_id);
        Ok(())
    }

    /// Adds a member to the project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotOwner`] for non-owners and
    /// [`ProjectServiceError::Domain`] when the user is already a member.
    pub async fn add_member(
        &self,
        user: UserId,
        project_id: ProjectId,
        request: AddMemberRequest,
    ) -> ProjectServiceResult<Member> {
        let _guard = self.locks.acquire(project_id).await;
        let mut project = self.load(project_id).await?;
        authorize(&project, user, MemberRole::Owner)?;
        let member = project.add_member(request.user, request.role, &*self.clock)?;
        self.projects.update(&project).await?;

        info!(project_id = %project_id, member = %member.user(), role = member.role().as_str(), "member added");
        self.publish(
            project_id,
            DomainChange::MemberAdded {
                project,
                member: member.clone(),
            },
            user,
        );
        Ok(member)
    }

    /// Removes a member from the project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotOwner`] for non-owners and
    /// [`ProjectServiceError::Domain`] when removing the owner or a
    /// non-member.
    pub async fn remove_member(
        &self,
        user: UserId,
        project_id: ProjectId,
        member_id: UserId,
    ) -> ProjectServiceResult<Project> {
        let _guard = self.locks.acquire(project_id).await;
        let mut project = self.load(project_id).await?;
        authorize(&project, user, MemberRole::Owner)?;
        project.remove_member(member_id, &*self.clock)?;
        self.projects.update(&project).await?;

        info!(project_id = %project_id, member = %member_id, "member removed");
        self.publish(
            project_id,
            DomainChange::MemberRemoved {
                project: project.clone(),
                member_id,
            },
            user,
        );
        Ok(project)
    }

    /// Replaces the status registry.
    ///
    /// Runs under the project write lock, so task transitions either see
    /// the old registry or the new one in full.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotOwner`] for non-owners,
    /// [`ProjectServiceError::Domain`] for an empty or duplicated list, and
    /// [`ProjectServiceError::StatusInUse`] when a removed status still holds
    /// tasks.
    pub async fn update_statuses(
        &self,
        user: UserId,
        project_id: ProjectId,
        statuses: Vec<StatusDefinition>,
    ) -> ProjectServiceResult<Project> {
        let registry = StatusRegistry::from_definitions(statuses)?;
        let _guard = self.locks.acquire(project_id).await;
        let mut project = self.load(project_id).await?;
        authorize(&project, user, MemberRole::Owner)?;

        for removed in project
            .statuses()
            .names()
            .filter(|name| !registry.contains(name))
        {
            let tasks = self.tasks.count_in_status(project_id, removed).await?;
            if tasks > 0 {
                return Err(ProjectServiceError::StatusInUse {
                    status: removed.to_string(),
                    tasks,
                });
            }
        }

        project.replace_statuses(registry, &*self.clock);
        self.projects.update(&project).await?;

        info!(project_id = %project_id, statuses = project.statuses().len(), "statuses updated");
        self.publish(
            project_id,
            DomainChange::StatusesUpdated {
                project: project.clone(),
            },
            user,
        );
        Ok(project)
    }

    async fn load(&self, project_id: ProjectId) -> ProjectServiceResult<Project> {
        self.projects
            .find_by_id(project_id)
            .await?
            .ok_or(ProjectServiceError::NotFound(project_id))
    }

    fn publish(&self, project_id: ProjectId, change: DomainChange, user: UserId) {
        let event = DomainEvent::new(project_id, change, Causation::user(user), &*self.clock);
        self.dispatcher.publish(&event);
    }
}

fn authorize(project: &Project, user: UserId, required: MemberRole) -> ProjectServiceResult<()> {
    let access = match required {
        MemberRole::Owner => project.ensure_owner(user),
        MemberRole::Editor | MemberRole::Viewer => project.ensure_member(user),
    };
    access.map_err(|denied| match denied {
        AccessDenied::NotMember => ProjectServiceError::NotFound(project.id()),
        AccessDenied::NotOwner => ProjectServiceError::NotOwner(project.id()),
    })
}
