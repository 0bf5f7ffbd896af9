//! Registry changes and project deletion as seen by subscribers.

use super::helpers::{App, app, drain};
use eyre::ensure;
use rstest::rstest;
use taskboard::{
    error::ErrorKind,
    project::domain::{StatusDefinition, UserId},
    realtime::domain::EventName,
    task::{
        domain::Actor,
        services::{CreateTaskRequest, MoveTaskRequest},
    },
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn replaced_registry_is_broadcast_and_enforced(app: App) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = app.shared_project(owner, UserId::new()).await?;
    let task = app
        .board
        .create_task(owner, CreateTaskRequest::new(project.id(), "Review me"))
        .await?
        .into_task();
    let mut connection = app.watch(&project)?;

    app.projects
        .update_statuses(
            owner,
            project.id(),
            vec![
                StatusDefinition::new("To Do"),
                StatusDefinition::new("Review").with_color("#8e44ad"),
                StatusDefinition::new("Done"),
            ],
        )
        .await?;
    let moved = app
        .board
        .move_task(owner, &MoveTaskRequest::new(task.id(), "Review"))
        .await?;
    let rejected = app
        .board
        .move_task(owner, &MoveTaskRequest::new(task.id(), "In Progress"))
        .await;

    ensure!(
        moved.task().status().as_str() == "Review",
        "new status should be usable"
    );
    ensure!(
        rejected.map_err(|err| err.kind()).err() == Some(ErrorKind::Validation),
        "removed status should be rejected"
    );
    let names: Vec<EventName> = drain(&mut connection)
        .iter()
        .map(|message| message.event())
        .collect();
    ensure!(
        names == [EventName::StatusesUpdated, EventName::TaskMoved],
        "unexpected messages: {names:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_project_closes_it_for_everyone(app: App) -> eyre::Result<()> {
    let owner = UserId::new();
    let editor = UserId::new();
    let project = app.shared_project(owner, editor).await?;
    let task = app
        .board
        .create_task(owner, CreateTaskRequest::new(project.id(), "Doomed"))
        .await?
        .into_task();
    let mut connection = app.watch(&project)?;

    let by_editor = app.projects.delete_project(editor, project.id()).await;
    app.projects.delete_project(owner, project.id()).await?;

    ensure!(
        by_editor.map_err(|err| err.kind()).err() == Some(ErrorKind::Authorization),
        "only the owner may delete"
    );
    let names: Vec<EventName> = drain(&mut connection)
        .iter()
        .map(|message| message.event())
        .collect();
    ensure!(
        names == [EventName::ProjectDeleted],
        "unexpected messages: {names:?}"
    );
    ensure!(
        app.board
            .tasks()
            .find_task(task.id(), Actor::System)
            .await
            .is_err(),
        "tasks should go with their project"
    );
    ensure!(
        app.projects
            .get_project(owner, project.id())
            .await
            .map_err(|err| err.kind())
            .err()
            == Some(ErrorKind::NotFound),
        "project should be gone"
    );
    Ok(())
}
