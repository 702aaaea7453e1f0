use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::{PanelId, ScheduleId, TeamId};
use crate::models::time::TimeSlot;

/// Ordered review stages. Every team walks them in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotType {
    Review1,
    Review2,
    Review3,
    Viva,
}

impl SlotType {
    /// All stages in sequence order.
    pub const ORDERED: [SlotType; 4] = [
        SlotType::Review1,
        SlotType::Review2,
        SlotType::Review3,
        SlotType::Viva,
    ];

    /// Stages that must already hold a live entry before this one may be
    /// scheduled.
    pub fn prerequisites(&self) -> &'static [SlotType] {
        match self {
            SlotType::Review1 => &[],
            SlotType::Review2 => &[SlotType::Review1],
            SlotType::Review3 => &[SlotType::Review1, SlotType::Review2],
            SlotType::Viva => &[SlotType::Review1, SlotType::Review2, SlotType::Review3],
        }
    }
}

impl std::fmt::Display for SlotType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SlotType::Review1 => "review1",
            SlotType::Review2 => "review2",
            SlotType::Review3 => "review3",
            SlotType::Viva => "viva",
        };
        f.write_str(name)
    }
}

/// Lifecycle of a schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Scheduled,
    Completed,
    Cancelled,
}

/// A persisted booking of one team + one panel + one review stage to one
/// time interval.
///
/// Invariants enforced by the store at write time: a team holds at most one
/// live entry per stage, and `(team, panel, start)` is unique among live
/// entries. `is_notified` flips to true exactly once; booking alone does not
/// make the slot visible to participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: ScheduleId,
    pub team: TeamId,
    pub panel: PanelId,
    pub slot_type: SlotType,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: ScheduleStatus,
    pub is_notified: bool,
}

impl ScheduleEntry {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.start, self.end)
    }

    /// Entries that still occupy their interval. Cancelled entries release
    /// the slot and no longer gate the review sequence.
    pub fn is_live(&self) -> bool {
        !matches!(self.status, ScheduleStatus::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_and_prerequisites() {
        assert!(SlotType::Review1.prerequisites().is_empty());
        assert_eq!(SlotType::Review2.prerequisites(), &[SlotType::Review1]);
        assert_eq!(SlotType::Viva.prerequisites().len(), 3);
        assert_eq!(SlotType::ORDERED[0], SlotType::Review1);
        assert_eq!(SlotType::ORDERED[3], SlotType::Viva);
    }

    #[test]
    fn test_slot_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&SlotType::Review2).unwrap(),
            "\"review2\""
        );
        assert_eq!(serde_json::to_string(&SlotType::Viva).unwrap(), "\"viva\"");
    }
}
