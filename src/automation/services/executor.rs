//! Action execution for matched automations.
//!
//! Every failure is caught here and turned into an
//! [`ActionOutcome::Failed`]: an automation never fails the request that
//! triggered it.

use crate::automation::{
    domain::{Action, ActionOutcome, Automation, Badge},
    ports::BadgeLedger,
};
use crate::config::DEFAULT_ACTION_TIMEOUT_MS;
use crate::event::DomainEvent;
use crate::notification::{
    domain::{Notification, NotificationKind},
    ports::NotificationDelivery,
};
use crate::project::{
    domain::{StatusName, UserId},
    ports::ProjectRepository,
};
use crate::task::{
    domain::{Actor, Task},
    ports::TaskRepository,
    services::TaskService,
};
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{debug, warn};

/// Result of running one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionExecution {
    outcome: ActionOutcome,
    follow_up: Option<DomainEvent>,
}

impl ActionExecution {
    const fn settled(outcome: ActionOutcome) -> Self {
        Self {
            outcome,
            follow_up: None,
        }
    }

    /// Returns what the action did.
    #[must_use]
    pub const fn outcome(&self) -> &ActionOutcome {
        &self.outcome
    }

    /// Returns the event the action committed, if it changed a task.
    #[must_use]
    pub const fn follow_up(&self) -> Option<&DomainEvent> {
        self.follow_up.as_ref()
    }

    /// Consumes the execution, returning the outcome and follow-up event.
    #[must_use]
    pub fn into_parts(self) -> (ActionOutcome, Option<DomainEvent>) {
        (self.outcome, self.follow_up)
    }
}

/// Carries out the action of a matched automation.
///
/// `moveTask` re-enters the task state machine with the automation as actor
/// and the causation chain extended by the automation id. Badge awards and
/// notification deliveries are bounded by the action timeout.
#[derive(Clone)]
pub struct ActionExecutor<T, P, B, C>
where
    T: TaskRepository,
    P: ProjectRepository,
    B: BadgeLedger,
    C: Clock + Send + Sync,
{
    tasks: Arc<TaskService<T, P, C>>,
    projects: Arc<P>,
    badges: Arc<B>,
    delivery: Arc<dyn NotificationDelivery>,
    clock: Arc<C>,
    timeout: Duration,
}

impl<T, P, B, C> ActionExecutor<T, P, B, C>
where
    T: TaskRepository,
    P: ProjectRepository,
    B: BadgeLedger,
    C: Clock + Send + Sync,
{
    /// Creates an executor with the default two-second action timeout.
    #[must_use]
    pub const fn new(
        tasks: Arc<TaskService<T, P, C>>,
        projects: Arc<P>,
        badges: Arc<B>,
        delivery: Arc<dyn NotificationDelivery>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            tasks,
            projects,
            badges,
            delivery,
            clock,
            timeout: Duration::from_millis(DEFAULT_ACTION_TIMEOUT_MS),
        }
    }

    /// Overrides the action timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the automation's action against the event's task.
    ///
    /// The task is re-read first so the action sees changes made earlier in
    /// the same cascade.
    pub async fn execute(&self, automation: &Automation, event: &DomainEvent) -> ActionExecution {
        let Some(task_id) = event.task().map(Task::id) else {
            return ActionExecution::settled(ActionOutcome::failed("event concerns no task"));
        };
        let task = match self
            .tasks
            .find_task(task_id, Actor::Automation(automation.id()))
            .await
        {
            Ok(current) => current,
            Err(err) => {
                warn!(
                    automation_id = %automation.id(),
                    task_id = %task_id,
                    error = %err,
                    "automation target task unavailable"
                );
                return ActionExecution::settled(ActionOutcome::failed(err.to_string()));
            }
        };

        match automation.action() {
            Action::AssignBadge {
                badge_name,
                badge_description,
            } => ActionExecution::settled(
                self.assign_badge(automation, &task, badge_name, badge_description.as_deref())
                    .await,
            ),
            Action::MoveTask { target_status } => {
                self.move_task(automation, event, &task, target_status).await
            }
            Action::SendNotification { message } => {
                ActionExecution::settled(self.send_notification(automation, &task, message).await)
            }
        }
    }

    async fn assign_badge(
        &self,
        automation: &Automation,
        task: &Task,
        badge_name: &str,
        badge_description: Option<&str>,
    ) -> ActionOutcome {
        let Some(recipient) = task.assignee() else {
            debug!(
                automation_id = %automation.id(),
                task_id = %task.id(),
                "task unassigned, no badge awarded"
            );
            return ActionOutcome::NoAssignee;
        };
        let badge = Badge::new(
            badge_name.to_owned(),
            badge_description.map(str::to_owned),
            self.clock.utc(),
        );
        match self.bounded(self.badges.award(recipient, badge)).await {
            Ok(Ok(())) => ActionOutcome::BadgeAwarded {
                recipient,
                badge_name: badge_name.to_owned(),
            },
            Ok(Err(err)) => failure(automation, task, &err.to_string()),
            Err(elapsed) => failure(automation, task, &elapsed.to_string()),
        }
    }

    async fn move_task(
        &self,
        automation: &Automation,
        event: &DomainEvent,
        task: &Task,
        target_status: &StatusName,
    ) -> ActionExecution {
        let causation = event.causation().caused_by(automation.id());
        let from_status = task.status().clone();
        match self
            .tasks
            .transition_status(task.id(), target_status.as_str(), &causation)
            .await
        {
            Ok(commit) => {
                let (moved, follow_up) = commit.into_parts();
                ActionExecution {
                    outcome: ActionOutcome::TaskMoved {
                        from_status,
                        to_status: moved.status().clone(),
                    },
                    follow_up,
                }
            }
            Err(err) => ActionExecution::settled(failure(automation, task, &err.to_string())),
        }
    }

    async fn send_notification(
        &self,
        automation: &Automation,
        task: &Task,
        message: &str,
    ) -> ActionOutcome {
        let recipient = match self.recipient(task).await {
            Ok(addressee) => addressee,
            Err(reason) => return failure(automation, task, &reason),
        };
        let notification = Notification::new(
            recipient,
            NotificationKind::AutomationTriggered,
            message,
            &*self.clock,
        )
        .with_task(task.project_id(), task.id());

        match self.bounded(self.delivery.deliver(&notification)).await {
            Ok(Ok(())) => ActionOutcome::NotificationDelivered { recipient },
            Ok(Err(err)) => failure(automation, task, &err.to_string()),
            Err(elapsed) => failure(automation, task, &elapsed.to_string()),
        }
    }

    /// Addresses the assignee, or the project owner when the task is
    /// unassigned.
    async fn recipient(&self, task: &Task) -> Result<UserId, String> {
        if let Some(assignee) = task.assignee() {
            return Ok(assignee);
        }
        match self.projects.find_by_id(task.project_id()).await {
            Ok(Some(project)) => Ok(project.owner()),
            Ok(None) => Err(format!("project not found: {}", task.project_id())),
            Err(err) => Err(err.to_string()),
        }
    }

    async fn bounded<F>(&self, future: F) -> Result<F::Output, time::error::Elapsed>
    where
        F: Future + Send,
    {
        time::timeout(self.timeout, future).await
    }
}

fn failure(automation: &Automation, task: &Task, reason: &str) -> ActionOutcome {
    warn!(
        automation_id = %automation.id(),
        task_id = %task.id(),
        action = %automation.action().kind(),
        reason,
        "automation action failed"
    );
    ActionOutcome::failed(reason)
}
