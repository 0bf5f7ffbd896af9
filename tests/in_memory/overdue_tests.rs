//! Due-date sweeps and `dueDatePassed` automations.

use super::helpers::{App, app};
use chrono::{Duration, Utc};
use eyre::ensure;
use rstest::rstest;
use taskboard::{
    automation::{
        domain::{ActionPayload, TriggerPayload},
        services::CreateAutomationRequest,
    },
    project::domain::UserId,
    task::{domain::TaskFieldChanges, services::CreateTaskRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overdue_tasks_are_reported_once_per_due_date(app: App) -> eyre::Result<()> {
    let owner = UserId::new();
    let editor = UserId::new();
    let project = app.shared_project(owner, editor).await?;
    let reminder = app
        .automations
        .create_automation(
            owner,
            CreateAutomationRequest::new(
                project.id(),
                "Overdue reminder",
                TriggerPayload::new("dueDatePassed"),
                ActionPayload::send_notification("This task is overdue"),
            ),
        )
        .await?;
    let late = app
        .board
        .create_task(
            owner,
            CreateTaskRequest::new(project.id(), "Late")
                .with_assignee(editor)
                .with_due_date(Utc::now() - Duration::hours(1)),
        )
        .await?
        .into_task();
    app.board
        .create_task(
            owner,
            CreateTaskRequest::new(project.id(), "Fine")
                .with_due_date(Utc::now() + Duration::days(3)),
        )
        .await?;

    let first = app.board.sweep_overdue(project.id()).await?;
    let second = app.board.sweep_overdue(project.id()).await?;

    let reported: Vec<_> = first.tasks().iter().map(|task| task.id()).collect();
    ensure!(reported == vec![late.id()], "only the late task is overdue");
    ensure!(
        first.cascade().runs_of(reminder.id()) == 1,
        "reminder should run for the late task"
    );
    ensure!(second.tasks().is_empty(), "a due date is reported only once");
    ensure!(
        app.notifications.list_notifications(editor).await?.len() == 1,
        "the assignee should be reminded once"
    );

    app.board
        .update_task(
            owner,
            late.id(),
            &TaskFieldChanges::new().with_due_date(Some(Utc::now() - Duration::minutes(5))),
        )
        .await?;
    let third = app.board.sweep_overdue(project.id()).await?;
    ensure!(
        third.tasks().len() == 1,
        "a new due date re-arms the overdue report"
    );
    Ok(())
}
