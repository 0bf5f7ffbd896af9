//! In-memory repository for automations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::automation::{
    domain::{Automation, AutomationId},
    ports::{AutomationRepository, AutomationRepositoryError, AutomationRepositoryResult},
};
use crate::project::domain::ProjectId;

/// Thread-safe in-memory automation repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAutomationRepository {
    state: Arc<RwLock<InMemoryAutomationState>>,
}

#[derive(Debug, Default)]
struct InMemoryAutomationState {
    automations: HashMap<AutomationId, Automation>,
    insertion_order: Vec<AutomationId>,
}

impl InMemoryAutomationRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AutomationRepository for InMemoryAutomationRepository {
    async fn store(&self, automation: &Automation) -> AutomationRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            AutomationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.automations.contains_key(&automation.id()) {
            return Err(AutomationRepositoryError::DuplicateAutomation(
                automation.id(),
            ));
        }
        state.insertion_order.push(automation.id());
        state.automations.insert(automation.id(), automation.clone());
        Ok(())
    }

    async fn update(&self, automation: &Automation) -> AutomationRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            AutomationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let stored = state
            .automations
            .get_mut(&automation.id())
            .ok_or(AutomationRepositoryError::NotFound(automation.id()))?;

        // Execution bookkeeping is owned by `record_execution`.
        let mut updated = automation.clone();
        updated.carry_execution_stats(stored);
        *stored = updated;
        Ok(())
    }

    async fn delete(&self, id: AutomationId) -> AutomationRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            AutomationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.automations.remove(&id).is_none() {
            return Err(AutomationRepositoryError::NotFound(id));
        }
        state.insertion_order.retain(|stored| *stored != id);
        Ok(())
    }

    async fn find_by_id(&self, id: AutomationId) -> AutomationRepositoryResult<Option<Automation>> {
        let state = self.state.read().map_err(|err| {
            AutomationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.automations.get(&id).cloned())
    }

    async fn list_for_project(
        &self,
        project_id: ProjectId,
    ) -> AutomationRepositoryResult<Vec<Automation>> {
        let state = self.state.read().map_err(|err| {
            AutomationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state
            .insertion_order
            .iter()
            .filter_map(|id| state.automations.get(id))
            .filter(|automation| automation.project_id() == project_id)
            .cloned()
            .collect())
    }

    async fn record_execution(
        &self,
        id: AutomationId,
        at: DateTime<Utc>,
    ) -> AutomationRepositoryResult<Automation> {
        let mut state = self.state.write().map_err(|err| {
            AutomationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let stored = state
            .automations
            .get_mut(&id)
            .ok_or(AutomationRepositoryError::NotFound(id))?;
        stored.record_execution(at);
        Ok(stored.clone())
    }
}
