//! Cascade cleanup after entity deletion.
//!
//! Each entity type has an explicit, ordered cleanup list. The primary
//! delete must complete; every follow-up step is best-effort, with
//! failures logged and collected in the report rather than raised —
//! scheduling-data cleanup is advisory, not transactional with the delete
//! it follows.

use log::{info, warn};

use crate::api::{CleanupReport, CleanupStep, PanelId, TeamId, UserId};
use crate::db::ReviewRepository;
use crate::error::{EngineError, EngineResult};
use crate::models::team::Team;

/// Delete a team, then its schedule entries.
pub async fn delete_team(repo: &dyn ReviewRepository, team_id: TeamId) -> EngineResult<CleanupReport> {
    repo.delete_team(team_id)
        .await
        .map_err(EngineError::on_missing("team", team_id.value()))?;
    info!("deleted team {}", team_id);

    let mut report = CleanupReport::default();
    report.push(step(
        format!("delete schedule entries of team {}", team_id),
        repo.delete_schedules_for_team(team_id).await.map(|_| ()),
    ));
    Ok(report)
}

/// Delete a panel, then detach it from every team and drop its schedule
/// entries.
pub async fn delete_panel(
    repo: &dyn ReviewRepository,
    panel_id: PanelId,
) -> EngineResult<CleanupReport> {
    let teams = repo.list_teams().await?;

    repo.delete_panel(panel_id)
        .await
        .map_err(EngineError::on_missing("panel", panel_id.value()))?;
    info!("deleted panel {}", panel_id);

    let mut report = CleanupReport::default();
    for team in teams.iter().filter(|t| t.panel == Some(panel_id)) {
        report.push(step(
            format!("detach panel from team {}", team.id),
            repo.clear_panel(team.id).await.map(|_| ()),
        ));
    }
    report.push(step(
        format!("delete schedule entries of panel {}", panel_id),
        repo.delete_schedules_for_panel(panel_id).await.map(|_| ()),
    ));
    Ok(report)
}

/// Delete a user, then scrub every reference: guide preferences, team
/// membership (with the empty-team postcondition), panel membership and
/// coordinated panels.
pub async fn delete_user(
    repo: &dyn ReviewRepository,
    user_id: UserId,
) -> EngineResult<CleanupReport> {
    // Gather references before the record disappears.
    let teams = repo.list_teams().await?;
    let panels = repo.list_panels().await?;

    repo.delete_user(user_id)
        .await
        .map_err(EngineError::on_missing("user", user_id.value()))?;
    info!("deleted user {}", user_id);

    let mut report = CleanupReport::default();

    for team in &teams {
        if team.guide_preference == Some(user_id) {
            report.push(step(
                format!("clear guide preference of team {}", team.id),
                repo.clear_guide(team.id).await.map(|_| ()),
            ));
        }
        if team.leader == Some(user_id) || team.members.contains(&user_id) {
            match repo.remove_team_member(team.id, user_id).await {
                Ok(updated) => {
                    report.push(CleanupStep::ok(format!(
                        "remove user from team {}",
                        team.id
                    )));
                    if updated.is_empty() {
                        report.push(step(
                            format!("delete emptied team {}", team.id),
                            repo.delete_team(team.id).await,
                        ));
                        report.push(step(
                            format!("delete schedule entries of team {}", team.id),
                            repo.delete_schedules_for_team(team.id).await.map(|_| ()),
                        ));
                    }
                }
                Err(err) => {
                    report.push(CleanupStep::failed(
                        format!("remove user from team {}", team.id),
                        &err,
                    ));
                }
            }
        }
    }

    for panel in &panels {
        if panel.members.contains(&user_id) {
            let mut updated = panel.clone();
            updated.members.retain(|m| *m != user_id);
            report.push(step(
                format!("remove user from panel {}", panel.id),
                repo.update_panel(updated).await.map(|_| ()),
            ));
        }
        // A panel cannot stand without its coordinator; it is torn down
        // with its own cascade.
        if panel.coordinator == user_id {
            match delete_panel(repo, panel.id).await {
                Ok(sub) => {
                    report.push(CleanupStep::ok(format!(
                        "delete panel {} coordinated by deleted user",
                        panel.id
                    )));
                    report.steps.extend(sub.steps);
                }
                Err(err) => {
                    report.push(CleanupStep::failed(
                        format!("delete panel {} coordinated by deleted user", panel.id),
                        &err,
                    ));
                }
            }
        }
    }

    for failure in report.failures() {
        warn!(
            "cleanup step failed after deleting user {}: {}: {}",
            user_id,
            failure.description,
            failure.error.as_deref().unwrap_or("unknown")
        );
    }
    Ok(report)
}

/// Remove one member from a team, enforcing the empty-team postcondition:
/// a team left with no leader and no members is deleted outright (with its
/// schedule cascade). Returns the surviving team, or `None` when it was
/// deleted.
pub async fn remove_team_member(
    repo: &dyn ReviewRepository,
    team_id: TeamId,
    user_id: UserId,
) -> EngineResult<Option<Team>> {
    let team = repo
        .remove_team_member(team_id, user_id)
        .await
        .map_err(EngineError::on_missing("team", team_id.value()))?;
    if !team.is_empty() {
        return Ok(Some(team));
    }
    let report = delete_team(repo, team_id).await?;
    for failure in report.failures() {
        warn!(
            "cleanup step failed after deleting emptied team {}: {}",
            team_id, failure.description
        );
    }
    Ok(None)
}

fn step<E: std::fmt::Display>(description: String, result: Result<(), E>) -> CleanupStep {
    match result {
        Ok(()) => CleanupStep::ok(description),
        Err(err) => {
            warn!("cleanup step failed: {}: {}", description, err);
            CleanupStep::failed(description, err)
        }
    }
}
