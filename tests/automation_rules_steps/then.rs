//! Then steps for automation rule BDD scenarios.

use super::world::{AutomationWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::then;
use taskboard::{
    automation::{ports::BadgeLedger, services::CascadeLimitExceeded},
    error::ErrorKind,
};

#[then(r#"the task is in "{status}""#)]
fn task_is_in(world: &AutomationWorld, status: String) -> Result<(), eyre::Report> {
    let task = world.task()?;
    if task.status().as_str() != status {
        return Err(eyre::eyre!(
            "expected status {status}, found {}",
            task.status()
        ));
    }
    Ok(())
}

#[then(r#""{user}" holds the badge "{badge}""#)]
fn holds_badge(world: &AutomationWorld, user: String, badge: String) -> Result<(), eyre::Report> {
    let user_id = world.known_user(&user)?;
    let badges = run_async(world.badges.badges_for(user_id)).wrap_err("list badges")?;
    if !badges.iter().any(|held| held.name() == badge) {
        return Err(eyre::eyre!("{user} does not hold the badge {badge}"));
    }
    Ok(())
}

#[then(r#""{user}" holds no badges"#)]
fn holds_no_badges(world: &AutomationWorld, user: String) -> Result<(), eyre::Report> {
    let user_id = world.known_user(&user)?;
    let badges = run_async(world.badges.badges_for(user_id)).wrap_err("list badges")?;
    if !badges.is_empty() {
        return Err(eyre::eyre!("{user} holds {} badges", badges.len()));
    }
    Ok(())
}

#[then(r#"the automation "{name}" has run {count:u64} times"#)]
fn automation_has_run(
    world: &AutomationWorld,
    name: String,
    count: u64,
) -> Result<(), eyre::Report> {
    let automation_id = world.rule(&name)?;
    let owner = world.project()?.owner();
    let automation = run_async(world.automations.get_automation(owner, automation_id))
        .wrap_err_with(|| format!("load automation {name}"))?;
    if automation.execution_count() != count {
        return Err(eyre::eyre!(
            "expected {name} to have run {count} times, found {}",
            automation.execution_count()
        ));
    }
    Ok(())
}

#[then(r#"the project columns are "{columns}""#)]
fn project_columns(world: &AutomationWorld, columns: String) -> Result<(), eyre::Report> {
    let project = world.project()?;
    let actual: Vec<&str> = project
        .statuses()
        .names()
        .map(|name| name.as_str())
        .collect();
    let expected: Vec<&str> = columns.split(',').map(str::trim).collect();
    if actual != expected {
        return Err(eyre::eyre!(
            "expected columns {expected:?}, found {actual:?}"
        ));
    }
    Ok(())
}

#[then(r#"the cascade stopped because "{name}" would repeat"#)]
fn cascade_stopped_on_repeat(world: &AutomationWorld, name: String) -> Result<(), eyre::Report> {
    let automation_id = world.rule(&name)?;
    let cascade = world
        .last_cascade
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing cascade report"))?;
    match cascade.truncations() {
        [CascadeLimitExceeded::Cycle { automation_id: refused, .. }] if *refused == automation_id => {
            Ok(())
        }
        other => Err(eyre::eyre!("unexpected truncations: {other:?}")),
    }
}

#[then("the request is refused as unauthorized")]
fn refused_as_unauthorized(world: &AutomationWorld) -> Result<(), eyre::Report> {
    match world.refusal {
        Some(ErrorKind::Authorization) => Ok(()),
        other => Err(eyre::eyre!("expected an authorization refusal, found {other:?}")),
    }
}

#[then("the move added {count:usize} history entry")]
fn move_added_history(world: &AutomationWorld, count: usize) -> Result<(), eyre::Report> {
    let before = world
        .history_before_move
        .ok_or_else(|| eyre::eyre!("no move was recorded"))?;
    let after = world.task()?.history().len();
    if after != before + count {
        return Err(eyre::eyre!(
            "expected {count} new history entries, found {}",
            after.saturating_sub(before)
        ));
    }
    Ok(())
}
