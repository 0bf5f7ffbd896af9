//! Automation notifications and inbox handling.

use super::helpers::{App, app};
use eyre::{ensure, eyre};
use rstest::rstest;
use taskboard::{
    automation::{
        domain::{ActionOutcome, ActionPayload, TriggerPayload},
        services::CreateAutomationRequest,
    },
    error::ErrorKind,
    notification::domain::NotificationKind,
    project::domain::{Project, UserId},
    task::services::CreateTaskRequest,
};

async fn notify_on_create(app: &App, owner: UserId) -> eyre::Result<Project> {
    let project = app.shared_project(owner, UserId::new()).await?;
    app.automations
        .create_automation(
            owner,
            CreateAutomationRequest::new(
                project.id(),
                "Announce",
                TriggerPayload::new("taskCreated"),
                ActionPayload::send_notification("A new task was filed"),
            ),
        )
        .await?;
    Ok(project)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unassigned_task_notifies_the_owner(app: App) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = notify_on_create(&app, owner).await?;

    let settled = app
        .board
        .create_task(owner, CreateTaskRequest::new(project.id(), "Triage"))
        .await?;

    let execution = settled
        .cascade()
        .executions()
        .first()
        .ok_or_else(|| eyre!("announcement rule should run"))?;
    ensure!(
        execution.outcome() == &ActionOutcome::NotificationDelivered { recipient: owner },
        "unexpected outcome {:?}",
        execution.outcome()
    );
    let inbox = app.notifications.list_notifications(owner).await?;
    let notification = inbox
        .first()
        .ok_or_else(|| eyre!("owner should have a notification"))?;
    ensure!(inbox.len() == 1, "expected one notification");
    ensure!(
        notification.kind() == NotificationKind::AutomationTriggered,
        "unexpected kind"
    );
    ensure!(
        notification.task() == Some(settled.task().id()),
        "notification should reference the task"
    );
    ensure!(!notification.is_read(), "new notifications are unread");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inbox_operations_are_scoped_to_the_recipient(app: App) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = notify_on_create(&app, owner).await?;
    for title in ["First", "Second", "Third"] {
        app.board
            .create_task(owner, CreateTaskRequest::new(project.id(), title))
            .await?;
    }
    let inbox = app.notifications.list_notifications(owner).await?;
    let [newest, .., oldest] = inbox.as_slice() else {
        return Err(eyre!("expected three notifications, found {}", inbox.len()));
    };
    ensure!(
        newest.created_at() >= oldest.created_at(),
        "inbox should list newest first"
    );
    let stranger = UserId::new();

    let foreign_read = app.notifications.mark_read(stranger, newest.id()).await;
    let read = app.notifications.mark_read(owner, newest.id()).await?;
    let remaining = app.notifications.mark_all_read(owner).await?;
    let foreign_delete = app
        .notifications
        .delete_notification(stranger, oldest.id())
        .await;
    app.notifications
        .delete_notification(owner, oldest.id())
        .await?;

    ensure!(
        foreign_read.map_err(|err| err.kind()).err() == Some(ErrorKind::NotFound),
        "strangers must not mark others' notifications"
    );
    ensure!(read.is_read(), "notification should be read");
    ensure!(remaining == 2, "two notifications were still unread");
    ensure!(
        foreign_delete.map_err(|err| err.kind()).err() == Some(ErrorKind::NotFound),
        "strangers must not delete others' notifications"
    );
    let after = app.notifications.list_notifications(owner).await?;
    ensure!(after.len() == 2, "one notification should be deleted");
    ensure!(
        after.iter().all(|notification| notification.is_read()),
        "every remaining notification should be read"
    );
    Ok(())
}
