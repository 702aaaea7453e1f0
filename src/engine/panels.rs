//! Panel composition and conflict-of-interest-aware panel assignment.
//!
//! The denormalized `team.coordinator` is a derived value: it is copied on
//! assignment, recomputed on every panel mutation and cleared on removal,
//! never hand-edited on its own.

use log::info;

use crate::api::{PanelId, TeamId, UserId};
use crate::db::models::NewPanel;
use crate::db::ReviewRepository;
use crate::error::{EngineError, EngineResult};
use crate::models::panel::Panel;
use crate::models::team::Team;
use crate::models::user::MemberType;

/// Create a panel after validating its composition.
pub async fn create_panel(repo: &dyn ReviewRepository, panel: NewPanel) -> EngineResult<Panel> {
    validate_composition(repo, &panel.members, panel.coordinator).await?;
    Ok(repo.insert_panel(panel).await?)
}

/// Replace a panel's members/coordinator, re-validating composition and
/// recomputing the derived coordinator on every team the panel is assigned
/// to.
pub async fn update_panel(repo: &dyn ReviewRepository, panel: Panel) -> EngineResult<Panel> {
    validate_composition(repo, &panel.members, panel.coordinator).await?;
    let panel_id = panel.id;
    let panel = repo
        .update_panel(panel)
        .await
        .map_err(EngineError::on_missing("panel", panel_id.value()))?;

    for team in repo.list_teams().await? {
        if team.panel == Some(panel.id) && team.coordinator != Some(panel.coordinator) {
            repo.set_team_coordinator(team.id, Some(panel.coordinator))
                .await?;
        }
    }
    Ok(panel)
}

/// Assign `panel` to `team`.
///
/// Rejected with [`EngineError::ConflictOfInterest`] when the team's guide
/// sits on the panel, and with [`EngineError::AlreadyAssigned`] when the
/// team already has one. The panel's coordinator is copied onto the team.
pub async fn assign_panel(
    repo: &dyn ReviewRepository,
    team_id: TeamId,
    panel_id: PanelId,
) -> EngineResult<Team> {
    let team = repo
        .get_team(team_id)
        .await
        .map_err(EngineError::on_missing("team", team_id.value()))?;
    let panel = repo
        .get_panel(panel_id)
        .await
        .map_err(EngineError::on_missing("panel", panel_id.value()))?;

    if team.panel.is_some() {
        return Err(EngineError::AlreadyAssigned { team: team_id });
    }
    if let Some(guide) = team.guide_preference {
        if panel.includes(guide) {
            return Err(EngineError::ConflictOfInterest {
                guide,
                panel: panel_id,
            });
        }
    }

    let team = repo
        .assign_panel_if_unassigned(team_id, panel_id, panel.coordinator)
        .await
        .map_err(|err| {
            if err.is_conflict() {
                EngineError::AlreadyAssigned { team: team_id }
            } else {
                EngineError::Repository(err)
            }
        })?;
    info!("assigned panel {} to team {}", panel_id, team_id);
    Ok(team)
}

/// Detach the team's panel, clearing the derived coordinator with it.
pub async fn remove_panel(repo: &dyn ReviewRepository, team_id: TeamId) -> EngineResult<Team> {
    repo.clear_panel(team_id)
        .await
        .map_err(EngineError::on_missing("team", team_id.value()))
}

/// Panel composition invariants: at most one external member, the
/// coordinator is internal and does not appear among the members.
async fn validate_composition(
    repo: &dyn ReviewRepository,
    members: &[UserId],
    coordinator: UserId,
) -> EngineResult<()> {
    if members.contains(&coordinator) {
        return Err(EngineError::Validation(format!(
            "coordinator {} must not be a panel member",
            coordinator
        )));
    }

    let coordinator_user = repo
        .get_user(coordinator)
        .await
        .map_err(EngineError::on_missing("user", coordinator.value()))?;
    if coordinator_user.member_type != Some(MemberType::Internal) {
        return Err(EngineError::Validation(format!(
            "coordinator {} must be internal faculty",
            coordinator
        )));
    }

    let mut externals = 0usize;
    for member in members {
        let user = repo
            .get_user(*member)
            .await
            .map_err(EngineError::on_missing("user", member.value()))?;
        if user.is_external() {
            externals += 1;
        }
    }
    if externals > 1 {
        return Err(EngineError::Validation(format!(
            "panel may have at most one external member, found {}",
            externals
        )));
    }
    Ok(())
}
