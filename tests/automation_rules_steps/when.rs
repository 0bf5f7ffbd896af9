//! When steps for automation rule BDD scenarios.

use super::world::{AutomationWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use taskboard::{
    automation::{
        domain::{ActionPayload, TriggerPayload},
        services::CreateAutomationRequest,
    },
    task::services::{CreateTaskRequest, MoveTaskRequest},
};

#[when(r#""{user}" moves the task to "{status}""#)]
fn move_the_task(
    world: &mut AutomationWorld,
    user: String,
    status: String,
) -> Result<(), eyre::Report> {
    let user_id = world.known_user(&user)?;
    let task = world.task()?;
    let task_id = task.id();
    world.history_before_move = Some(task.history().len());
    let settled = run_async(
        world
            .board
            .move_task(user_id, &MoveTaskRequest::new(task_id, status.as_str())),
    )
    .wrap_err_with(|| format!("move task to {status}"))?;
    world.last_cascade = Some(settled.cascade().clone());
    world.task = Some(settled.into_task());
    Ok(())
}

#[when(r#""{user}" creates a task "{title}""#)]
fn create_a_task(
    world: &mut AutomationWorld,
    user: String,
    title: String,
) -> Result<(), eyre::Report> {
    let user_id = world.known_user(&user)?;
    let project_id = world.project()?.id();
    let settled = run_async(
        world
            .board
            .create_task(user_id, CreateTaskRequest::new(project_id, title)),
    )
    .wrap_err("create task")?;
    world.last_cascade = Some(settled.cascade().clone());
    world.task = Some(settled.into_task());
    Ok(())
}

#[when(
    r#""{user}" tries to create an automation "{name}" awarding badge "{badge}" when a task moves to "{status}""#
)]
fn try_create_rule(
    world: &mut AutomationWorld,
    user: String,
    name: String,
    badge: String,
    status: String,
) -> Result<(), eyre::Report> {
    let user_id = world.known_user(&user)?;
    let project_id = world.project()?.id();
    let result = run_async(world.automations.create_automation(
        user_id,
        CreateAutomationRequest::new(
            project_id,
            name,
            TriggerPayload::new("taskMoved").with_to_status(status),
            ActionPayload::assign_badge(badge),
        ),
    ));
    match result {
        Ok(automation) => {
            world
                .rules
                .insert(automation.name().to_owned(), automation.id());
        }
        Err(err) => world.refusal = Some(err.kind()),
    }
    Ok(())
}

#[when(r#""{user}" assigns the task to "{assignee}""#)]
fn assign_the_task(
    world: &mut AutomationWorld,
    user: String,
    assignee: String,
) -> Result<(), eyre::Report> {
    let user_id = world.known_user(&user)?;
    let assignee_id = world.known_user(&assignee)?;
    let task_id = world.task()?.id();
    let settled = run_async(
        world
            .board
            .reassign_task(user_id, task_id, Some(assignee_id)),
    )
    .wrap_err_with(|| format!("assign task to {assignee}"))?;
    world.last_cascade = Some(settled.cascade().clone());
    world.task = Some(settled.into_task());
    Ok(())
}
