//! Slot booking: finds a free period per team per review stage and
//! persists it exactly once.
//!
//! Candidates come from the period grid in its canonical order, so a
//! re-run against unchanged state picks the same slot. Two conflict layers
//! gate every candidate: an availability match against the panel members'
//! submitted intervals, and a booking clash check against every scheduled
//! entry sharing the team, the panel or any individual participant. The
//! final write is a conditional unique insert; a losing writer re-runs the
//! search against fresh state instead of failing hard.

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};

use crate::api::{
    PanelId, ScheduleGenerationReport, SkippedTeam, SlotAssignment, SlotOutcome, SlotRequest,
    TeamId, UserId,
};
use crate::db::models::NewScheduleEntry;
use crate::db::ReviewRepository;
use crate::engine::grid::ReviewPeriodGrid;
use crate::engine::sequence;
use crate::error::{EngineError, EngineResult};
use crate::models::config::{ReviewConfig, ReviewPeriod};
use crate::models::panel::Panel;
use crate::models::schedule::{ScheduleEntry, SlotType};
use crate::models::team::Team;
use crate::models::time::TimeSlot;
use crate::models::AvailabilityRole;

/// Book the next pending review stage for every team that has a guide and
/// a panel. Teams that cannot be booked are reported as skipped, never
/// failed; re-running converges because booked teams no longer qualify.
pub async fn generate_schedules_for_all_teams(
    repo: &dyn ReviewRepository,
    config: &ReviewConfig,
) -> EngineResult<ScheduleGenerationReport> {
    let window = review_window(config)?;
    let mut report = ScheduleGenerationReport::default();

    for team in repo.list_teams().await? {
        let Some(panel_id) = team.panel else {
            report.skipped.push(SkippedTeam {
                team: team.id,
                reason: "no panel assigned".into(),
            });
            continue;
        };
        if team.guide_preference.is_none() {
            report.skipped.push(SkippedTeam {
                team: team.id,
                reason: "no guide assigned".into(),
            });
            continue;
        }

        let entries = repo.schedules_for_team(team.id).await?;
        let Some(stage) = sequence::next_stage(&entries, team.id) else {
            report.skipped.push(SkippedTeam {
                team: team.id,
                reason: "all review stages already scheduled".into(),
            });
            continue;
        };
        if let Err(violation) = sequence::validate_stage(&entries, team.id, stage) {
            // Unreachable for the next pending stage, but kept as the gate
            // every booking goes through.
            report.skipped.push(SkippedTeam {
                team: team.id,
                reason: violation.to_string(),
            });
            continue;
        }

        let panel = repo
            .get_panel(panel_id)
            .await
            .map_err(EngineError::on_missing("panel", panel_id.value()))?;
        match book_slot(repo, &team, &panel, stage, window).await? {
            SlotOutcome::Booked(entry) => report.created.push(entry),
            SlotOutcome::NoSlotFound => {
                warn!(
                    "no suitable slot for team {} stage {} within the review period",
                    team.id, stage
                );
                report.skipped.push(SkippedTeam {
                    team: team.id,
                    reason: "no suitable slot found in review period".into(),
                });
            }
        }
    }

    info!(
        "schedule generation: {} created, {} skipped",
        report.created.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Book the next pending stage for one team.
pub async fn generate_slot_for_team(
    repo: &dyn ReviewRepository,
    config: &ReviewConfig,
    team_id: TeamId,
) -> EngineResult<SlotOutcome> {
    let window = review_window(config)?;
    let team = repo
        .get_team(team_id)
        .await
        .map_err(EngineError::on_missing("team", team_id.value()))?;
    let Some(panel_id) = team.panel else {
        return Err(EngineError::Validation(format!(
            "team {} has no panel assigned",
            team_id
        )));
    };
    if team.guide_preference.is_none() {
        return Err(EngineError::Validation(format!(
            "team {} has no guide assigned",
            team_id
        )));
    }

    let entries = repo.schedules_for_team(team_id).await?;
    let Some(stage) = sequence::next_stage(&entries, team_id) else {
        return Err(EngineError::Validation(format!(
            "team {} already has every review stage scheduled",
            team_id
        )));
    };

    let panel = repo
        .get_panel(panel_id)
        .await
        .map_err(EngineError::on_missing("panel", panel_id.value()))?;
    book_slot(repo, &team, &panel, stage, window).await
}

/// Coordinator-driven batch assignment of explicit slots for one stage.
///
/// Sequence validation for the whole batch runs before any write; a single
/// violation rejects the batch with an itemized list and nothing persisted.
/// Coordinator slots skip the availability match, but not the clash layer:
/// a slot overlapping a booking that shares the team, the panel or any
/// participant is refused per team, as is an insert losing to a duplicate.
pub async fn coordinator_assign_slots(
    repo: &dyn ReviewRepository,
    slot_type: SlotType,
    requests: &[SlotRequest],
) -> EngineResult<Vec<SlotAssignment>> {
    // Phase 1: load and validate everything before the first write.
    let mut validated: Vec<(Team, Panel)> = Vec::with_capacity(requests.len());
    let mut entries_per_team: Vec<Vec<ScheduleEntry>> = Vec::with_capacity(requests.len());
    for request in requests {
        if request.end <= request.start {
            return Err(EngineError::Validation(format!(
                "slot for team {} has a non-positive duration",
                request.team
            )));
        }
        let team = repo
            .get_team(request.team)
            .await
            .map_err(EngineError::on_missing("team", request.team.value()))?;
        let Some(panel_id) = team.panel else {
            return Err(EngineError::Validation(format!(
                "team {} has no panel assigned",
                request.team
            )));
        };
        let panel = repo
            .get_panel(panel_id)
            .await
            .map_err(EngineError::on_missing("panel", panel_id.value()))?;
        entries_per_team.push(repo.schedules_for_team(team.id).await?);
        validated.push((team, panel));
    }

    let violations = sequence::validate_batch(
        validated
            .iter()
            .zip(entries_per_team.iter())
            .map(|((team, _), entries)| (team.id, slot_type, entries.as_slice())),
    );
    if !violations.is_empty() {
        return Err(EngineError::SequenceViolation { violations });
    }

    // Phase 2: persist, itemizing per-team outcomes. Entries are re-read
    // per request so earlier slots in the same batch count as booked.
    let teams: HashMap<TeamId, Team> = repo
        .list_teams()
        .await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();
    let panels: HashMap<PanelId, Panel> = repo
        .list_panels()
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut outcomes = Vec::with_capacity(requests.len());
    for (request, (team, panel)) in requests.iter().zip(validated.iter()) {
        let booked = repo.scheduled_entries().await?;
        let ours = participants(Some(team), Some(panel));
        let slot = TimeSlot::new(request.start, request.end);
        if clashes(&slot, team.id, panel.id, &ours, &booked, &teams, &panels) {
            outcomes.push(SlotAssignment::Failed {
                team: team.id,
                reason: format!("slot {} overlaps an existing booking", slot),
            });
            continue;
        }

        let insert = repo
            .insert_schedule(NewScheduleEntry {
                team: team.id,
                panel: panel.id,
                slot_type,
                start: request.start,
                end: request.end,
            })
            .await;
        match insert {
            Ok(entry) => outcomes.push(SlotAssignment::Created(entry)),
            Err(err) if err.is_conflict() => outcomes.push(SlotAssignment::Failed {
                team: team.id,
                reason: EngineError::DuplicateSlot {
                    team: team.id,
                    start: request.start,
                }
                .to_string(),
            }),
            Err(err) => return Err(err.into()),
        }
    }
    Ok(outcomes)
}

fn review_window(config: &ReviewConfig) -> EngineResult<ReviewPeriod> {
    config.review_period.ok_or(EngineError::ReviewPeriodNotSet)
}

/// Whether `slot` collides with any booked entry sharing the team, the
/// panel or an individual participant. This layer is unconditional: every
/// booking path goes through it, availability-matched or not.
fn clashes(
    slot: &TimeSlot,
    team: TeamId,
    panel: PanelId,
    ours: &HashSet<UserId>,
    booked: &[ScheduleEntry],
    teams: &HashMap<TeamId, Team>,
    panels: &HashMap<PanelId, Panel>,
) -> bool {
    booked.iter().any(|entry| {
        if !entry.slot().overlaps(slot) {
            return false;
        }
        if entry.team == team || entry.panel == panel {
            return true;
        }
        let theirs = participants(teams.get(&entry.team), panels.get(&entry.panel));
        !ours.is_disjoint(&theirs)
    })
}

/// Everyone whose calendar an entry occupies.
fn participants(
    team: Option<&Team>,
    panel: Option<&Panel>,
) -> HashSet<UserId> {
    let mut set = HashSet::new();
    if let Some(team) = team {
        if let Some(guide) = team.guide_preference {
            set.insert(guide);
        }
    }
    if let Some(panel) = panel {
        set.extend(panel.members.iter().copied());
        set.insert(panel.coordinator);
    }
    set
}

async fn book_slot(
    repo: &dyn ReviewRepository,
    team: &Team,
    panel: &Panel,
    slot_type: SlotType,
    window: ReviewPeriod,
) -> EngineResult<SlotOutcome> {
    // Availability does not change with bookings; fetch it once. The guide
    // is excluded: the availability match wants a panel member who can
    // actually sit the review.
    let mut availabilities: Vec<Vec<TimeSlot>> = Vec::new();
    for member in &panel.members {
        if team.guide_preference == Some(*member) {
            continue;
        }
        availabilities.push(repo.availability_for(*member, AvailabilityRole::Panel).await?);
    }

    loop {
        let booked = repo.scheduled_entries().await?;
        let teams: HashMap<TeamId, Team> = repo
            .list_teams()
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();
        let panels: HashMap<_, Panel> = repo
            .list_panels()
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let ours = participants(Some(team), Some(panel));

        let candidate = ReviewPeriodGrid::new(window.start, window.end).find(|slot| {
            let slot = TimeSlot::new(slot.start, slot.end);

            let available = availabilities
                .iter()
                .any(|intervals| intervals.iter().any(|w| w.overlaps(&slot)));
            available && !clashes(&slot, team.id, panel.id, &ours, &booked, &teams, &panels)
        });

        let Some(slot) = candidate else {
            return Ok(SlotOutcome::NoSlotFound);
        };

        let insert = repo
            .insert_schedule(NewScheduleEntry {
                team: team.id,
                panel: panel.id,
                slot_type,
                start: slot.start,
                end: slot.end,
            })
            .await;
        match insert {
            Ok(entry) => {
                info!(
                    "booked {} for team {} on {} period {}",
                    slot_type, team.id, slot.date, slot.period
                );
                return Ok(SlotOutcome::Booked(entry));
            }
            Err(err) if err.is_conflict() => {
                // Distinguish which uniqueness key was lost. Losing the
                // slot key means another booking took this period and a
                // re-search can still succeed; losing the stage key means
                // a concurrent writer booked this team and stage, and no
                // candidate can ever pass it.
                let entries = repo.schedules_for_team(team.id).await?;
                if sequence::has_live_entry(&entries, team.id, slot_type) {
                    return Err(err.into());
                }
                debug!(
                    "booking conflict for team {} at {}, retrying search",
                    team.id, slot.start
                );
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }
}
