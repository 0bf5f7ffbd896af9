//! Given steps for automation rule BDD scenarios.

use super::world::{AutomationWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::{
    automation::{
        domain::{ActionPayload, TriggerPayload},
        services::CreateAutomationRequest,
    },
    project::{
        domain::MemberRole,
        services::{AddMemberRequest, CreateProjectRequest},
    },
    task::services::{CreateTaskRequest, MoveTaskRequest},
};

#[given(r#"a project owned by "{owner}" with editor "{editor}""#)]
fn project_with_editor(
    world: &mut AutomationWorld,
    owner: String,
    editor: String,
) -> Result<(), eyre::Report> {
    let owner_id = world.user(&owner);
    let editor_id = world.user(&editor);
    let project = run_async(async {
        let created = world
            .projects
            .create_project(owner_id, CreateProjectRequest::new("Launch"))
            .await?;
        world
            .projects
            .add_member(
                owner_id,
                created.id(),
                AddMemberRequest::new(editor_id).with_role(MemberRole::Editor),
            )
            .await?;
        world.projects.get_project(owner_id, created.id()).await
    })
    .wrap_err("create shared project")?;
    world.project = Some(project);
    Ok(())
}

fn define_rule(
    world: &mut AutomationWorld,
    name: &str,
    trigger: TriggerPayload,
    action: ActionPayload,
) -> Result<(), eyre::Report> {
    let project_id = world.project()?.id();
    let owner = world.project()?.owner();
    let automation = run_async(world.automations.create_automation(
        owner,
        CreateAutomationRequest::new(project_id, name, trigger, action),
    ))
    .wrap_err_with(|| format!("create automation {name}"))?;
    world.rules.insert(name.to_owned(), automation.id());
    Ok(())
}

#[given(
    r#"an automation "{name}" awarding badge "{badge}" when a task moves from "{from}" to "{to}""#
)]
fn badge_rule(
    world: &mut AutomationWorld,
    name: String,
    badge: String,
    from: String,
    to: String,
) -> Result<(), eyre::Report> {
    define_rule(
        world,
        &name,
        TriggerPayload::new("taskMoved")
            .with_from_status(from)
            .with_to_status(to),
        ActionPayload::assign_badge(badge),
    )
}

#[given(r#"an automation "{name}" awarding badge "{badge}" when a task is assigned to "{user}""#)]
fn assignment_rule(
    world: &mut AutomationWorld,
    name: String,
    badge: String,
    user: String,
) -> Result<(), eyre::Report> {
    let assignee = world.known_user(&user)?;
    define_rule(
        world,
        &name,
        TriggerPayload::new("taskAssigned").with_assignee(assignee),
        ActionPayload::assign_badge(badge),
    )
}

#[given(r#"an automation "{name}" moving tasks to "{target}" when a task moves to "{status}""#)]
fn move_rule(
    world: &mut AutomationWorld,
    name: String,
    target: String,
    status: String,
) -> Result<(), eyre::Report> {
    define_rule(
        world,
        &name,
        TriggerPayload::new("taskMoved").with_to_status(status),
        ActionPayload::move_task(target),
    )
}

#[given(r#""{user}" deactivates the automation "{name}""#)]
fn deactivate_rule(
    world: &mut AutomationWorld,
    user: String,
    name: String,
) -> Result<(), eyre::Report> {
    let user_id = world.known_user(&user)?;
    let automation_id = world.rule(&name)?;
    run_async(
        world
            .automations
            .deactivate_automation(user_id, automation_id),
    )
    .wrap_err_with(|| format!("deactivate automation {name}"))?;
    Ok(())
}

#[given(r#"a task "{title}" assigned to "{user}""#)]
fn assigned_task(
    world: &mut AutomationWorld,
    title: String,
    user: String,
) -> Result<(), eyre::Report> {
    let assignee = world.known_user(&user)?;
    let project_id = world.project()?.id();
    let owner = world.project()?.owner();
    let settled = run_async(world.board.create_task(
        owner,
        CreateTaskRequest::new(project_id, title).with_assignee(assignee),
    ))
    .wrap_err("create assigned task")?;
    world.task = Some(settled.into_task());
    Ok(())
}

#[given(r#""{user}" has already moved the task to "{status}""#)]
fn task_already_moved(
    world: &mut AutomationWorld,
    user: String,
    status: String,
) -> Result<(), eyre::Report> {
    let user_id = world.known_user(&user)?;
    let task_id = world.task()?.id();
    let settled = run_async(
        world
            .board
            .move_task(user_id, &MoveTaskRequest::new(task_id, status.as_str())),
    )
    .wrap_err_with(|| format!("move task to {status}"))?;
    world.task = Some(settled.into_task());
    Ok(())
}
