//! Guide assignment: manual override, load-balanced bulk assignment and the
//! accept/reject request flow.

use std::collections::HashMap;

use log::{debug, info};

use crate::api::{BulkAssignReport, GuideAssignment, SkippedTeam, TeamId, UserId};
use crate::db::ReviewRepository;
use crate::error::{EngineError, EngineResult};
use crate::models::team::{Team, TeamStatus};
use crate::models::user::Role;

/// Admin override: set `guide` on `team` and approve it directly.
///
/// No eligibility check beyond the guide role; the admin may override a
/// prior rejection.
pub async fn assign_guide(
    repo: &dyn ReviewRepository,
    team_id: TeamId,
    guide_id: UserId,
) -> EngineResult<Team> {
    require_guide_role(repo, guide_id).await?;
    let team = repo
        .set_guide(team_id, guide_id)
        .await
        .map_err(EngineError::on_missing("team", team_id.value()))?;
    info!("assigned guide {} to team {} (override)", guide_id, team_id);
    Ok(team)
}

/// Team (re)requests a guide; resets the request to pending.
pub async fn request_guide(
    repo: &dyn ReviewRepository,
    team_id: TeamId,
    guide_id: UserId,
) -> EngineResult<Team> {
    require_guide_role(repo, guide_id).await?;
    repo.request_guide(team_id, guide_id)
        .await
        .map_err(EngineError::on_missing("team", team_id.value()))
}

/// Load-balanced automatic assignment across every team still needing a
/// guide.
///
/// Guides are ranked by current approved-team count ascending, ties broken
/// by id order (stable). Each pick is greedy and re-ranks before the next
/// team, so the run is deterministic but order-sensitive, not globally
/// optimal. A team every guide has rejected is skipped, not failed, and
/// stays eligible for a later run.
pub async fn bulk_assign_guides(repo: &dyn ReviewRepository) -> EngineResult<BulkAssignReport> {
    let guides: Vec<UserId> = repo
        .list_users()
        .await?
        .into_iter()
        .filter(|u| u.has_role(Role::Guide))
        .map(|u| u.id)
        .collect();

    let teams = repo.list_teams().await?;
    let mut load: HashMap<UserId, usize> = guides.iter().map(|g| (*g, 0)).collect();
    for team in &teams {
        if team.status == TeamStatus::Approved {
            if let Some(guide) = team.guide_preference {
                if let Some(count) = load.get_mut(&guide) {
                    *count += 1;
                }
            }
        }
    }

    let mut report = BulkAssignReport::default();
    for team in teams.iter().filter(|t| t.needs_guide()) {
        // Stable sort: equal counts keep id order.
        let mut ranked = guides.clone();
        ranked.sort_by_key(|g| load[g]);

        let pick = ranked.into_iter().find(|g| !team.has_rejected(*g));
        let Some(guide) = pick else {
            debug!("team {} has rejected every guide, skipping", team.id);
            report.skipped.push(SkippedTeam {
                team: team.id,
                reason: "no eligible guide: all guides rejected".into(),
            });
            continue;
        };

        match repo.assign_guide_if_needed(team.id, guide).await {
            Ok(_) => {
                if let Some(count) = load.get_mut(&guide) {
                    *count += 1;
                }
                report.assigned.push(GuideAssignment {
                    team: team.id,
                    guide,
                });
            }
            // A concurrent accept or override beat us to this team; the
            // precondition write lost, which is a skip, not a failure.
            Err(err) if err.is_conflict() => {
                report.skipped.push(SkippedTeam {
                    team: team.id,
                    reason: format!("assignment superseded concurrently: {}", err),
                });
            }
            Err(err) => return Err(err.into()),
        }
    }

    info!(
        "bulk guide assignment: {} assigned, {} skipped",
        report.assigned.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// A guide accepts one pending request.
///
/// First-acceptance-wins: the accepted team is approved and every other
/// pending request for the same guide is force-rejected as a side effect.
pub async fn accept_guide_request(
    repo: &dyn ReviewRepository,
    guide_id: UserId,
    team_id: TeamId,
) -> EngineResult<Team> {
    let team = repo
        .accept_request_if_pending(team_id, guide_id)
        .await
        .map_err(|err| {
            if err.is_conflict() {
                EngineError::AlreadyProcessed { team: team_id }
            } else {
                EngineError::on_missing("team", team_id.value())(err)
            }
        })?;
    info!("guide {} accepted team {}", guide_id, team_id);

    // Implicitly decline every other pending request for this guide. Each
    // decline is its own conditional write; one that races with a
    // concurrent transition simply loses and is skipped.
    for other in repo.list_teams().await? {
        if other.id == team_id
            || other.guide_preference != Some(guide_id)
            || other.status != TeamStatus::Pending
        {
            continue;
        }
        match repo.reject_request_if_pending(other.id, guide_id).await {
            Ok(_) => debug!(
                "force-rejected pending request of team {} for guide {}",
                other.id, guide_id
            ),
            Err(err) if err.is_conflict() => {}
            Err(err) => return Err(err.into()),
        }
    }

    Ok(team)
}

/// A guide declines one pending request: the preference is cleared, the
/// team marked rejected, and the guide recorded in the team's rejected
/// list so automatic assignment never re-selects them.
pub async fn reject_guide_request(
    repo: &dyn ReviewRepository,
    guide_id: UserId,
    team_id: TeamId,
) -> EngineResult<Team> {
    let team = repo
        .reject_request_if_pending(team_id, guide_id)
        .await
        .map_err(|err| {
            if err.is_conflict() {
                EngineError::AlreadyProcessed { team: team_id }
            } else {
                EngineError::on_missing("team", team_id.value())(err)
            }
        })?;
    info!("guide {} rejected team {}", guide_id, team_id);
    Ok(team)
}

async fn require_guide_role(repo: &dyn ReviewRepository, guide_id: UserId) -> EngineResult<()> {
    let user = repo
        .get_user(guide_id)
        .await
        .map_err(EngineError::on_missing("user", guide_id.value()))?;
    if !user.has_role(Role::Guide) {
        return Err(EngineError::InvalidRole {
            user: guide_id,
            role: Role::Guide,
        });
    }
    Ok(())
}
