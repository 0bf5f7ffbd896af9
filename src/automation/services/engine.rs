//! Cascade-controlled automation engine.
//!
//! The engine drains a FIFO worklist of committed domain events. For each
//! event it runs the matching automations in creation order and appends
//! the events their actions commit to the back of the worklist. An
//! automation is refused for an event whose causation chain already
//! contains it, or whose chain has reached the hop limit. Refusals are
//! recorded in the [`CascadeReport`] and never returned as errors.

use super::executor::ActionExecutor;
use crate::automation::{
    domain::{ActionOutcome, Automation, AutomationId, RuleMatcher},
    ports::{AutomationRepository, BadgeLedger},
};
use crate::concurrency::ProjectWriteLocks;
use crate::config::DEFAULT_HOP_LIMIT;
use crate::event::{DomainChange, DomainEvent};
use crate::project::ports::ProjectRepository;
use crate::realtime::ports::EventDispatcher;
use crate::task::{
    domain::{Task, TaskId},
    ports::TaskRepository,
};
use mockable::Clock;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A refused automation execution that truncated a cascade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CascadeLimitExceeded {
    /// The automation already contributed to the event's causation chain.
    #[error("automation {automation_id} already appears in the causation chain")]
    Cycle {
        /// Refused automation.
        automation_id: AutomationId,
        /// Causation chain of the event it would have reacted to.
        chain: Vec<AutomationId>,
    },

    /// The event's causation chain reached the hop limit.
    #[error("causation chain of length {depth} reached the hop limit of {limit}")]
    HopLimit {
        /// Refused automation.
        automation_id: AutomationId,
        /// Length of the event's causation chain.
        depth: usize,
        /// Configured hop limit.
        limit: usize,
    },
}

impl CascadeLimitExceeded {
    /// Returns the refused automation.
    #[must_use]
    pub const fn automation_id(&self) -> AutomationId {
        match self {
            Self::Cycle { automation_id, .. } | Self::HopLimit { automation_id, .. } => {
                *automation_id
            }
        }
    }
}

/// One automation run recorded by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomationExecution {
    automation_id: AutomationId,
    task_id: TaskId,
    outcome: ActionOutcome,
}

impl AutomationExecution {
    /// Returns the automation that ran.
    #[must_use]
    pub const fn automation_id(&self) -> AutomationId {
        self.automation_id
    }

    /// Returns the task the triggering event concerned.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns what the action did.
    #[must_use]
    pub const fn outcome(&self) -> &ActionOutcome {
        &self.outcome
    }
}

/// Summary of one cascade run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    executions: Vec<AutomationExecution>,
    truncations: Vec<CascadeLimitExceeded>,
    events_processed: usize,
}

impl CascadeReport {
    /// Returns every automation run, in execution order.
    #[must_use]
    pub fn executions(&self) -> &[AutomationExecution] {
        &self.executions
    }

    /// Returns every refused execution.
    #[must_use]
    pub fn truncations(&self) -> &[CascadeLimitExceeded] {
        &self.truncations
    }

    /// Returns how many events the worklist drained.
    #[must_use]
    pub const fn events_processed(&self) -> usize {
        self.events_processed
    }

    /// Returns how many times the automation ran during this cascade.
    #[must_use]
    pub fn runs_of(&self, automation_id: AutomationId) -> usize {
        self.executions
            .iter()
            .filter(|execution| execution.automation_id == automation_id)
            .count()
    }

    /// Returns `true` when at least one execution was refused.
    #[must_use]
    pub fn was_truncated(&self) -> bool {
        !self.truncations.is_empty()
    }
}

/// Runs automations for committed events until the cascade settles.
pub struct AutomationEngine<T, P, A, B, C>
where
    T: TaskRepository,
    P: ProjectRepository,
    A: AutomationRepository,
    B: BadgeLedger,
    C: Clock + Send + Sync,
{
    automations: Arc<A>,
    executor: ActionExecutor<T, P, B, C>,
    dispatcher: Arc<dyn EventDispatcher>,
    locks: Arc<ProjectWriteLocks>,
    clock: Arc<C>,
    hop_limit: usize,
}

impl<T, P, A, B, C> AutomationEngine<T, P, A, B, C>
where
    T: TaskRepository,
    P: ProjectRepository,
    A: AutomationRepository,
    B: BadgeLedger,
    C: Clock + Send + Sync,
{
    /// Creates an engine with the default hop limit of 10.
    #[must_use]
    pub const fn new(
        automations: Arc<A>,
        executor: ActionExecutor<T, P, B, C>,
        dispatcher: Arc<dyn EventDispatcher>,
        locks: Arc<ProjectWriteLocks>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            automations,
            executor,
            dispatcher,
            locks,
            clock,
            hop_limit: DEFAULT_HOP_LIMIT,
        }
    }

    /// Overrides the hop limit.
    ///
    /// A limit of zero refuses every automation with
    /// [`CascadeLimitExceeded::HopLimit`], which switches automations off.
    /// [`EngineConfig::validate`](crate::config::EngineConfig::validate)
    /// rejects zero for configured engines.
    #[must_use]
    pub const fn with_hop_limit(mut self, hop_limit: usize) -> Self {
        self.hop_limit = hop_limit;
        self
    }

    /// Processes the events and every event their automations commit.
    ///
    /// Repository failures are logged and skip the affected step; the
    /// cascade itself never fails.
    pub async fn run(&self, events: impl IntoIterator<Item = DomainEvent>) -> CascadeReport {
        let mut worklist: VecDeque<DomainEvent> = events.into_iter().collect();
        let mut report = CascadeReport::default();

        while let Some(event) = worklist.pop_front() {
            report.events_processed += 1;
            let Some(task_id) = event.task().map(Task::id) else {
                continue;
            };
            if event.trigger_kind().is_none() {
                continue;
            }
            let candidates = match self.automations.list_for_project(event.project_id()).await {
                Ok(loaded) => loaded,
                Err(err) => {
                    warn!(
                        project_id = %event.project_id(),
                        error = %err,
                        "failed to load automations, event skipped"
                    );
                    continue;
                }
            };
            let matched = RuleMatcher::matching(&event, &candidates);
            debug!(
                project_id = %event.project_id(),
                task_id = %task_id,
                depth = event.causation().depth(),
                matched = matched.len(),
                "event matched"
            );

            for automation in matched {
                if let Some(truncation) = self.refusal(automation, &event) {
                    warn!(
                        automation_id = %automation.id(),
                        project_id = %event.project_id(),
                        task_id = %task_id,
                        %truncation,
                        "cascade truncated"
                    );
                    report.truncations.push(truncation);
                    continue;
                }

                let (outcome, follow_up) =
                    self.executor.execute(automation, &event).await.into_parts();
                self.record(automation, &event, task_id, &outcome).await;
                report.executions.push(AutomationExecution {
                    automation_id: automation.id(),
                    task_id,
                    outcome,
                });
                if let Some(next) = follow_up {
                    worklist.push_back(next);
                }
            }
        }
        report
    }

    fn refusal(
        &self,
        automation: &Automation,
        event: &DomainEvent,
    ) -> Option<CascadeLimitExceeded> {
        let causation = event.causation();
        if causation.involves(automation.id()) {
            return Some(CascadeLimitExceeded::Cycle {
                automation_id: automation.id(),
                chain: causation.chain().to_vec(),
            });
        }
        if causation.depth() >= self.hop_limit {
            return Some(CascadeLimitExceeded::HopLimit {
                automation_id: automation.id(),
                depth: causation.depth(),
                limit: self.hop_limit,
            });
        }
        None
    }

    /// Bumps the execution statistics and announces the run.
    async fn record(
        &self,
        automation: &Automation,
        event: &DomainEvent,
        task_id: TaskId,
        outcome: &ActionOutcome,
    ) {
        let project_id = automation.project_id();
        let _guard = self.locks.acquire(project_id).await;
        let recorded = match self
            .automations
            .record_execution(automation.id(), self.clock.utc())
            .await
        {
            Ok(updated) => updated,
            Err(err) => {
                warn!(
                    automation_id = %automation.id(),
                    error = %err,
                    "failed to record automation execution"
                );
                return;
            }
        };

        info!(
            automation_id = %recorded.id(),
            project_id = %project_id,
            task_id = %task_id,
            outcome = outcome.label(),
            execution_count = recorded.execution_count(),
            "automation executed"
        );
        let announcement = DomainEvent::new(
            project_id,
            DomainChange::AutomationTriggered {
                automation_id: recorded.id(),
                name: recorded.name().to_owned(),
                task_id,
                outcome: outcome.clone(),
                execution_count: recorded.execution_count(),
            },
            event.causation().caused_by(recorded.id()),
            &*self.clock,
        );
        self.dispatcher.publish(&announcement);
    }
}
