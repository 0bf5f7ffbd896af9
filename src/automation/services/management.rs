//! Owner-facing automation management.

use crate::automation::{
    domain::{
        Action, ActionPayload, Automation, AutomationDomainError, AutomationId, NewAutomation,
        Trigger, TriggerPayload,
    },
    ports::{AutomationRepository, AutomationRepositoryError},
};
use crate::error::ErrorKind;
use crate::project::{
    domain::{AccessDenied, MemberRole, Project, ProjectId, UserId},
    ports::{ProjectRepository, ProjectRepositoryError},
};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Request payload for creating an automation.
///
/// Trigger and action arrive in their loose `{type, conditions}` and
/// `{type, details}` shapes and are validated by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAutomationRequest {
    project: ProjectId,
    name: String,
    #[serde(default)]
    description: Option<String>,
    trigger: TriggerPayload,
    action: ActionPayload,
}

impl CreateAutomationRequest {
    /// Creates a request for a rule in `project`.
    #[must_use]
    pub fn new(
        project: ProjectId,
        name: impl Into<String>,
        trigger: TriggerPayload,
        action: ActionPayload,
    ) -> Self {
        Self {
            project,
            name: name.into(),
            description: None,
            trigger,
            action,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the target project.
    #[must_use]
    pub const fn project(&self) -> ProjectId {
        self.project
    }
}

/// Request payload for editing an automation. Absent fields are unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAutomationRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    active: Option<bool>,
    #[serde(default)]
    trigger: Option<TriggerPayload>,
    #[serde(default)]
    action: Option<ActionPayload>,
}

impl UpdateAutomationRequest {
    /// Creates an empty edit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renames the rule.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Activates or deactivates the rule.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Replaces the trigger.
    #[must_use]
    pub fn with_trigger(mut self, trigger: TriggerPayload) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Replaces the action.
    #[must_use]
    pub fn with_action(mut self, action: ActionPayload) -> Self {
        self.action = Some(action);
        self
    }
}

/// Service-level errors for automation management.
#[derive(Debug, Error)]
pub enum AutomationServiceError {
    /// Trigger, action, or name validation failed.
    #[error(transparent)]
    Domain(#[from] AutomationDomainError),

    /// Automation repository operation failed.
    #[error(transparent)]
    Repository(#[from] AutomationRepositoryError),

    /// Project repository operation failed.
    #[error(transparent)]
    ProjectRepository(#[from] ProjectRepositoryError),

    /// The project does not exist or the caller is not a member.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The automation does not exist or the caller is not a member of its
    /// project.
    #[error("automation not found: {0}")]
    NotFound(AutomationId),

    /// The caller is a member but not the owner.
    #[error("only the owner may manage automations of project {0}")]
    NotOwner(ProjectId),
}

impl AutomationServiceError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) => ErrorKind::Validation,
            Self::NotOwner(_) => ErrorKind::Authorization,
            Self::ProjectNotFound(_)
            | Self::NotFound(_)
            | Self::Repository(AutomationRepositoryError::NotFound(_))
            | Self::ProjectRepository(ProjectRepositoryError::NotFound(_)) => ErrorKind::NotFound,
            Self::Repository(_) | Self::ProjectRepository(_) => ErrorKind::Persistence,
        }
    }
}

/// Result type for automation management operations.
pub type AutomationServiceResult<T> = Result<T, AutomationServiceError>;

/// Automation management service.
#[derive(Clone)]
pub struct AutomationService<A, P, C>
where
    A: AutomationRepository,
    P: ProjectRepository,
    C: Clock + Send + Sync,
{
    automations: Arc<A>,
    projects: Arc<P>,
    clock: Arc<C>,
}

impl<A, P, C> AutomationService<A, P, C>
where
    A: AutomationRepository,
    P: ProjectRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new automation service.
    #[must_use]
    pub const fn new(automations: Arc<A>, projects: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            automations,
            projects,
            clock,
        }
    }

    /// Returns the project's automations, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationServiceError::ProjectNotFound`] for missing
    /// projects and non-members.
    pub async fn list_automations(
        &self,
        user: UserId,
        project_id: ProjectId,
    ) -> AutomationServiceResult<Vec<Automation>> {
        let project = self.load_project(project_id).await?;
        authorize(&project, user, MemberRole::Viewer)?;
        let mut automations = self.automations.list_for_project(project_id).await?;
        automations.reverse();
        automations.sort_by_key(|automation| Reverse(automation.created_at()));
        Ok(automations)
    }

    /// Returns one automation of a project the caller belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationServiceError::NotFound`] for missing automations
    /// and non-members.
    pub async fn get_automation(
        &self,
        user: UserId,
        automation_id: AutomationId,
    ) -> AutomationServiceResult<Automation> {
        let (automation, project) = self.load(automation_id).await?;
        authorize(&project, user, MemberRole::Viewer)
            .map_err(|_| AutomationServiceError::NotFound(automation_id))?;
        Ok(automation)
    }

    /// Creates an active automation.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationServiceError::NotOwner`] for non-owners and
    /// [`AutomationServiceError::Domain`] for an unknown trigger or action
    /// type, missing or inapplicable fields, or a status the project does
    /// not define.
    pub async fn create_automation(
        &self,
        user: UserId,
        request: CreateAutomationRequest,
    ) -> AutomationServiceResult<Automation> {
        let project = self.load_project(request.project).await?;
        authorize(&project, user, MemberRole::Owner)?;

        let trigger = Trigger::try_from(request.trigger)?;
        let action = Action::try_from(request.action)?;
        let automation = Automation::new(
            NewAutomation {
                project_id: project.id(),
                name: request.name,
                description: request.description,
                created_by: user,
                trigger,
                action,
            },
            &*self.clock,
        )?;
        automation.check_statuses(project.statuses())?;
        self.automations.store(&automation).await?;

        info!(
            automation_id = %automation.id(),
            project_id = %project.id(),
            trigger = %automation.trigger().kind(),
            action = %automation.action().kind(),
            "automation created"
        );
        Ok(automation)
    }

    /// Applies a partial edit.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationServiceError::NotOwner`] for non-owners and the
    /// validation errors of [`Self::create_automation`].
    pub async fn update_automation(
        &self,
        user: UserId,
        automation_id: AutomationId,
        request: UpdateAutomationRequest,
    ) -> AutomationServiceResult<Automation> {
        let (mut automation, project) = self.load(automation_id).await?;
        authorize(&project, user, MemberRole::Owner)?;

        let trigger = request.trigger.map(Trigger::try_from).transpose()?;
        let action = request.action.map(Action::try_from).transpose()?;

        let clock = &*self.clock;
        if let Some(new_name) = request.name {
            automation.rename(&new_name, clock)?;
        }
        if let Some(text) = request.description {
            automation.set_description(Some(text), clock);
        }
        if let Some(flag) = request.active {
            automation.set_active(flag, clock);
        }
        if let Some(replacement) = trigger {
            automation.replace_trigger(replacement, clock);
        }
        if let Some(replacement) = action {
            automation.replace_action(replacement, clock);
        }
        automation.check_statuses(project.statuses())?;
        self.automations.update(&automation).await?;

        info!(automation_id = %automation_id, active = automation.is_active(), "automation updated");
        self.automations
            .find_by_id(automation_id)
            .await?
            .ok_or(AutomationServiceError::NotFound(automation_id))
    }

    /// Stops the rule from matching any further events.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationServiceError::NotOwner`] for non-owners.
    pub async fn deactivate_automation(
        &self,
        user: UserId,
        automation_id: AutomationId,
    ) -> AutomationServiceResult<Automation> {
        self.update_automation(
            user,
            automation_id,
            UpdateAutomationRequest::new().with_active(false),
        )
        .await
    }

    /// Deletes a rule.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationServiceError::NotOwner`] for non-owners.
    pub async fn delete_automation(
        &self,
        user: UserId,
        automation_id: AutomationId,
    ) -> AutomationServiceResult<()> {
        let (_automation, project) = self.load(automation_id).await?;
        authorize(&project, user, MemberRole::Owner)?;
        self.automations.delete(automation_id).await?;
        info!(automation_id = %automation_id, project_id = %project.id(), "automation deleted");
        Ok(())
    }

    async fn load_project(&self, project_id: ProjectId) -> AutomationServiceResult<Project> {
        self.projects
            .find_by_id(project_id)
            .await?
            .ok_or(AutomationServiceError::ProjectNotFound(project_id))
    }

    async fn load(
        &self,
        automation_id: AutomationId,
    ) -> AutomationServiceResult<(Automation, Project)> {
        let automation = self
            .automations
            .find_by_id(automation_id)
            .await?
            .ok_or(AutomationServiceError::NotFound(automation_id))?;
        let project = self
            .projects
            .find_by_id(automation.project_id())
            .await?
            .ok_or(AutomationServiceError::NotFound(automation_id))?;
        Ok((automation, project))
    }
}

fn authorize(
    project: &Project,
    user: UserId,
    required: MemberRole,
) -> AutomationServiceResult<()> {
    let access = match required {
        MemberRole::Owner => project.ensure_owner(user),
        MemberRole::Editor | MemberRole::Viewer => project.ensure_member(user),
    };
    access.map_err(|denied| match denied {
        AccessDenied::NotMember => AutomationServiceError::ProjectNotFound(project.id()),
        AccessDenied::NotOwner => AutomationServiceError::NotOwner(project.id()),
    })
}
