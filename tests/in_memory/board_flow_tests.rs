//! End-to-end board flows over in-memory adapters.

use std::sync::Arc;

use super::helpers::{App, app, drain};
use async_trait::async_trait;
use eyre::{ensure, eyre};
use rstest::rstest;
use serde_json::json;
use taskboard::{
    automation::{
        domain::{ActionOutcome, ActionPayload, TriggerPayload},
        ports::BadgeLedger,
        services::{CascadeLimitExceeded, CreateAutomationRequest},
    },
    config::EngineConfig,
    error::ErrorKind,
    notification::{
        adapters::memory::InMemoryNotificationStore,
        domain::Notification,
        ports::{NotificationDelivery, NotificationDeliveryError, NotificationDeliveryResult},
    },
    project::domain::UserId,
    realtime::domain::EventName,
    task::{
        adapters::memory::InMemoryTaskRepository,
        domain::{Actor, HistoryAction},
        ports::TaskRepository,
        services::{CreateTaskRequest, MoveTaskRequest},
    },
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn finishing_a_task_awards_the_assignee_a_badge(app: App) -> eyre::Result<()> {
    let owner = UserId::new();
    let editor = UserId::new();
    let project = app.shared_project(owner, editor).await?;
    let finisher = app
        .automations
        .create_automation(
            owner,
            CreateAutomationRequest::new(
                project.id(),
                "Finisher",
                TriggerPayload::new("taskMoved")
                    .with_from_status("In Progress")
                    .with_to_status("Done"),
                ActionPayload::assign_badge("Finisher"),
            ),
        )
        .await?;
    let task = app
        .board
        .create_task(
            owner,
            CreateTaskRequest::new(project.id(), "Ship release").with_assignee(editor),
        )
        .await?
        .into_task();
    let started = app
        .board
        .move_task(editor, &MoveTaskRequest::new(task.id(), "In Progress"))
        .await?;
    ensure!(
        started.cascade().executions().is_empty(),
        "leaving To Do should not fire the finisher"
    );
    let history_before = started.task().history().len();
    let mut connection = app.watch(&project)?;

    let settled = app
        .board
        .move_task(editor, &MoveTaskRequest::new(task.id(), "Done"))
        .await?;

    ensure!(settled.task().status().as_str() == "Done", "task should be Done");
    ensure!(
        settled.task().history().len() == history_before + 1,
        "the move should add exactly one history entry"
    );
    ensure!(
        settled.cascade().runs_of(finisher.id()) == 1,
        "finisher should run once"
    );
    let badges = app.badges.badges_for(editor).await?;
    ensure!(
        badges.iter().map(|badge| badge.name()).collect::<Vec<_>>() == ["Finisher"],
        "editor should hold exactly the Finisher badge"
    );
    let stored = app.automations.get_automation(owner, finisher.id()).await?;
    ensure!(stored.execution_count() == 1, "execution should be counted");

    let messages = drain(&mut connection);
    let names: Vec<EventName> = messages.iter().map(|message| message.event()).collect();
    ensure!(
        names == [EventName::TaskMoved, EventName::AutomationTriggered],
        "unexpected messages: {names:?}"
    );
    let moved = messages
        .first()
        .ok_or_else(|| eyre!("missing task_moved message"))?;
    ensure!(
        moved.payload()["prevStatus"] == json!("In Progress")
            && moved.payload()["newStatus"] == json!("Done"),
        "unexpected move payload: {}",
        moved.payload()
    );
    let triggered = messages
        .last()
        .ok_or_else(|| eyre!("missing automation_triggered message"))?;
    ensure!(
        triggered.payload()["executionCount"] == json!(1)
            && triggered.payload()["outcome"]["result"] == json!("badgeAwarded"),
        "unexpected automation payload: {}",
        triggered.payload()
    );
    ensure!(
        triggered.room().as_str() == format!("project-{}", project.id()),
        "message should target the project room"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn looping_rules_settle_and_report_the_truncation(app: App) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = app.shared_project(owner, UserId::new()).await?;
    let mut rules = Vec::new();
    for (name, from, to) in [
        ("Reopen", "Done", "In Progress"),
        ("Close", "In Progress", "Done"),
    ] {
        rules.push(
            app.automations
                .create_automation(
                    owner,
                    CreateAutomationRequest::new(
                        project.id(),
                        name,
                        TriggerPayload::new("taskMoved").with_to_status(from),
                        ActionPayload::move_task(to),
                    ),
                )
                .await?,
        );
    }
    let task = app
        .board
        .create_task(owner, CreateTaskRequest::new(project.id(), "Loop"))
        .await?
        .into_task();

    let settled = app
        .board
        .move_task(owner, &MoveTaskRequest::new(task.id(), "Done"))
        .await?;

    let [reopen, close] = rules.as_slice() else {
        return Err(eyre!("expected two rules"));
    };
    ensure!(
        settled.task().status().as_str() == "Done",
        "task should settle in Done, found {}",
        settled.task().status()
    );
    ensure!(
        settled.cascade().runs_of(reopen.id()) == 1 && settled.cascade().runs_of(close.id()) == 1,
        "each rule should run once"
    );
    ensure!(
        matches!(
            settled.cascade().truncations(),
            [CascadeLimitExceeded::Cycle { automation_id, .. }] if *automation_id == reopen.id()
        ),
        "unexpected truncations: {:?}",
        settled.cascade().truncations()
    );
    let moves = settled
        .task()
        .history()
        .iter()
        .filter(|entry| entry.action() == HistoryAction::Moved)
        .count();
    ensure!(moves == 3, "expected three recorded moves, found {moves}");
    Ok(())
}

/// Delivery that deletes the task a notification concerns before storing
/// the notification.
struct DeletingDelivery {
    tasks: Arc<InMemoryTaskRepository>,
    inbox: Arc<InMemoryNotificationStore>,
}

#[async_trait]
impl NotificationDelivery for DeletingDelivery {
    async fn deliver(&self, notification: &Notification) -> NotificationDeliveryResult<()> {
        if let Some(task_id) = notification.task() {
            self.tasks
                .delete(task_id)
                .await
                .map_err(NotificationDeliveryError::transport)?;
        }
        self.inbox.deliver(notification).await
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn task_deleted_during_the_cascade_still_reports_the_move() -> eyre::Result<()> {
    let app = App::with_delivery(
        &EngineConfig::default(),
        |tasks, inbox| -> Arc<dyn NotificationDelivery> {
            Arc::new(DeletingDelivery { tasks, inbox })
        },
    );
    let owner = UserId::new();
    let project = app.shared_project(owner, UserId::new()).await?;
    let announce = app
        .automations
        .create_automation(
            owner,
            CreateAutomationRequest::new(
                project.id(),
                "Announce",
                TriggerPayload::new("taskMoved").with_to_status("Done"),
                ActionPayload::send_notification("Task finished"),
            ),
        )
        .await?;
    let task = app
        .board
        .create_task(owner, CreateTaskRequest::new(project.id(), "Short lived"))
        .await?
        .into_task();

    let settled = app
        .board
        .move_task(owner, &MoveTaskRequest::new(task.id(), "Done"))
        .await?;

    ensure!(settled.task().id() == task.id(), "expected the moved task back");
    ensure!(
        settled.task().status().as_str() == "Done",
        "expected the committed status, found {}",
        settled.task().status()
    );
    match settled.cascade().executions() {
        [run] => {
            ensure!(run.automation_id() == announce.id(), "unexpected automation ran");
            ensure!(
                *run.outcome() == ActionOutcome::NotificationDelivered { recipient: owner },
                "unexpected outcome {:?}",
                run.outcome()
            );
        }
        other => return Err(eyre!("expected one execution, found {other:?}")),
    }
    let gone = app
        .board
        .tasks()
        .find_task(task.id(), Actor::User(owner))
        .await;
    ensure!(
        gone.map_err(|err| err.kind()).err() == Some(ErrorKind::NotFound),
        "the delivery should have deleted the task"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_to_an_unknown_status_changes_nothing(app: App) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = app.shared_project(owner, UserId::new()).await?;
    let task = app
        .board
        .create_task(owner, CreateTaskRequest::new(project.id(), "Stay"))
        .await?
        .into_task();
    let mut connection = app.watch(&project)?;

    let result = app
        .board
        .move_task(owner, &MoveTaskRequest::new(task.id(), "Archived"))
        .await;

    ensure!(
        result.as_ref().map_err(|err| err.kind()).err() == Some(ErrorKind::Validation),
        "expected a validation error, got {result:?}"
    );
    ensure!(drain(&mut connection).is_empty(), "nothing should be broadcast");
    let stored = app
        .board
        .tasks()
        .find_task(task.id(), Actor::User(owner))
        .await?;
    ensure!(stored == task, "task should be unchanged");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn outsiders_cannot_touch_project_tasks(app: App) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = app.shared_project(owner, UserId::new()).await?;
    let task = app
        .board
        .create_task(owner, CreateTaskRequest::new(project.id(), "Private"))
        .await?
        .into_task();
    let outsider = UserId::new();

    let create = app
        .board
        .create_task(outsider, CreateTaskRequest::new(project.id(), "Intrusion"))
        .await;
    let comment = app.board.add_comment(outsider, task.id(), "Hello").await;

    ensure!(
        create.map_err(|err| err.kind()).err() == Some(ErrorKind::NotFound),
        "non-members should not see the project"
    );
    ensure!(
        comment.map_err(|err| err.kind()).err() == Some(ErrorKind::NotFound),
        "non-members should not see the task"
    );
    Ok(())
}
