//! Review sequence validation.
//!
//! Stages are gated by prior completion of the sequence, not by time order:
//! review2 needs a live review1 entry, review3 needs both, viva needs all
//! three. Cancelled entries do not satisfy a prerequisite. Batch validation
//! runs before any slot is written; one failing team rejects the whole
//! batch.

use crate::api::TeamId;
use crate::error::SequenceViolation;
use crate::models::schedule::{ScheduleEntry, SlotType};

/// Check that `team` may schedule `slot_type` given its existing entries.
pub fn validate_stage(
    entries: &[ScheduleEntry],
    team: TeamId,
    slot_type: SlotType,
) -> Result<(), SequenceViolation> {
    let missing: Vec<SlotType> = slot_type
        .prerequisites()
        .iter()
        .copied()
        .filter(|stage| !has_live_entry(entries, team, *stage))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SequenceViolation {
            team,
            slot_type,
            missing,
        })
    }
}

/// Validate a batch of `(team, stage)` pairs against their entries; returns
/// every violation so the caller can reject the batch with an itemized list.
pub fn validate_batch<'a, I>(batch: I) -> Vec<SequenceViolation>
where
    I: IntoIterator<Item = (TeamId, SlotType, &'a [ScheduleEntry])>,
{
    batch
        .into_iter()
        .filter_map(|(team, slot_type, entries)| validate_stage(entries, team, slot_type).err())
        .collect()
}

/// The earliest stage the team has no live entry for, or `None` once the
/// whole sequence (through viva) is booked.
pub fn next_stage(entries: &[ScheduleEntry], team: TeamId) -> Option<SlotType> {
    SlotType::ORDERED
        .into_iter()
        .find(|stage| !has_live_entry(entries, team, *stage))
}

pub(crate) fn has_live_entry(entries: &[ScheduleEntry], team: TeamId, stage: SlotType) -> bool {
    entries
        .iter()
        .any(|e| e.team == team && e.slot_type == stage && e.is_live())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::api::{PanelId, ScheduleId};
    use crate::models::schedule::ScheduleStatus;

    fn entry(team: i64, slot_type: SlotType, status: ScheduleStatus) -> ScheduleEntry {
        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        ScheduleEntry {
            id: ScheduleId::new(1),
            team: TeamId::new(team),
            panel: PanelId::new(1),
            slot_type,
            start: day.and_hms_opt(9, 0, 0).unwrap(),
            end: day.and_hms_opt(9, 40, 0).unwrap(),
            status,
            is_notified: false,
        }
    }

    #[test]
    fn test_review1_has_no_precondition() {
        assert!(validate_stage(&[], TeamId::new(1), SlotType::Review1).is_ok());
    }

    #[test]
    fn test_review2_needs_review1() {
        let team = TeamId::new(1);
        let err = validate_stage(&[], team, SlotType::Review2).unwrap_err();
        assert_eq!(err.missing, vec![SlotType::Review1]);

        let entries = [entry(1, SlotType::Review1, ScheduleStatus::Scheduled)];
        assert!(validate_stage(&entries, team, SlotType::Review2).is_ok());
    }

    #[test]
    fn test_viva_reports_every_missing_stage() {
        let entries = [entry(1, SlotType::Review2, ScheduleStatus::Scheduled)];
        let err = validate_stage(&entries, TeamId::new(1), SlotType::Viva).unwrap_err();
        assert_eq!(err.missing, vec![SlotType::Review1, SlotType::Review3]);
    }

    #[test]
    fn test_cancelled_entry_does_not_satisfy() {
        let entries = [entry(1, SlotType::Review1, ScheduleStatus::Cancelled)];
        assert!(validate_stage(&entries, TeamId::new(1), SlotType::Review2).is_err());
    }

    #[test]
    fn test_completed_entry_satisfies() {
        let entries = [entry(1, SlotType::Review1, ScheduleStatus::Completed)];
        assert!(validate_stage(&entries, TeamId::new(1), SlotType::Review2).is_ok());
    }

    #[test]
    fn test_other_teams_entries_do_not_count() {
        let entries = [entry(2, SlotType::Review1, ScheduleStatus::Scheduled)];
        assert!(validate_stage(&entries, TeamId::new(1), SlotType::Review2).is_err());
    }

    #[test]
    fn test_next_stage_walks_the_sequence() {
        let team = TeamId::new(1);
        assert_eq!(next_stage(&[], team), Some(SlotType::Review1));
        let entries = [
            entry(1, SlotType::Review1, ScheduleStatus::Scheduled),
            entry(1, SlotType::Review2, ScheduleStatus::Scheduled),
        ];
        assert_eq!(next_stage(&entries, team), Some(SlotType::Review3));
        let all = [
            entry(1, SlotType::Review1, ScheduleStatus::Scheduled),
            entry(1, SlotType::Review2, ScheduleStatus::Scheduled),
            entry(1, SlotType::Review3, ScheduleStatus::Scheduled),
            entry(1, SlotType::Viva, ScheduleStatus::Scheduled),
        ];
        assert_eq!(next_stage(&all, team), None);
    }

    #[test]
    fn test_validate_batch_collects_all_violations() {
        let empty: [ScheduleEntry; 0] = [];
        let violations = validate_batch([
            (TeamId::new(1), SlotType::Review1, &empty[..]),
            (TeamId::new(2), SlotType::Viva, &empty[..]),
            (TeamId::new(3), SlotType::Review2, &empty[..]),
        ]);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].team, TeamId::new(2));
        assert_eq!(violations[1].team, TeamId::new(3));
    }
}
