//! Repository port for automation persistence and execution bookkeeping.

use crate::automation::domain::{Automation, AutomationId};
use crate::project::domain::ProjectId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for automation repository operations.
pub type AutomationRepositoryResult<T> = Result<T, AutomationRepositoryError>;

/// Automation persistence contract.
#[async_trait]
pub trait AutomationRepository: Send + Sync {
    /// Stores a new automation.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationRepositoryError::DuplicateAutomation`] when the
    /// automation ID already exists.
    async fn store(&self, automation: &Automation) -> AutomationRepositoryResult<()>;

    /// Persists owner edits to an existing automation.
    ///
    /// Implementations keep the stored execution bookkeeping, so an edit
    /// racing an execution never loses a count.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationRepositoryError::NotFound`] when the automation
    /// does not exist.
    async fn update(&self, automation: &Automation) -> AutomationRepositoryResult<()>;

    /// Removes an automation.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationRepositoryError::NotFound`] when the automation
    /// does not exist.
    async fn delete(&self, id: AutomationId) -> AutomationRepositoryResult<()>;

    /// Finds an automation by identifier.
    ///
    /// Returns `None` when the automation does not exist.
    async fn find_by_id(&self, id: AutomationId) -> AutomationRepositoryResult<Option<Automation>>;

    /// Returns every automation of a project in creation order.
    async fn list_for_project(
        &self,
        project_id: ProjectId,
    ) -> AutomationRepositoryResult<Vec<Automation>>;

    /// Atomically increments the execution count and advances
    /// `last_executed` to `max(last_executed, at)`.
    ///
    /// Returns the automation as stored after the update.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationRepositoryError::NotFound`] when the automation
    /// does not exist.
    async fn record_execution(
        &self,
        id: AutomationId,
        at: DateTime<Utc>,
    ) -> AutomationRepositoryResult<Automation>;
}

/// Errors returned by automation repository implementations.
#[derive(Debug, Clone, Error)]
pub enum AutomationRepositoryError {
    /// An automation with the same identifier already exists.
    #[error("duplicate automation identifier: {0}")]
    DuplicateAutomation(AutomationId),

    /// The automation was not found.
    #[error("automation not found: {0}")]
    NotFound(AutomationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AutomationRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
