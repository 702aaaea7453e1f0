//! Public API surface for the review engine.
//!
//! This file consolidates the identifier newtypes and the report/outcome
//! types returned by engine operations. All types derive
//! Serialize/Deserialize for JSON serialization by the CRUD layer.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use crate::models::schedule::ScheduleEntry;
pub use crate::models::schedule::SlotType;

/// Team identifier (database primary key).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub i64);

/// Faculty/student user identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Evaluation panel identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PanelId(pub i64);

/// Schedule entry identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScheduleId(pub i64);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            pub fn new(value: i64) -> Self {
                $name(value)
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

impl_id!(TeamId);
impl_id!(UserId);
impl_id!(PanelId);
impl_id!(ScheduleId);

/// One guide picked for one team during a bulk assignment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideAssignment {
    pub team: TeamId,
    pub guide: UserId,
}

/// A team left untouched by a batch run, with the reason it was passed over.
///
/// Skips are negative results, not errors: the team stays eligible for a
/// later run or a manual override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTeam {
    pub team: TeamId,
    pub reason: String,
}

/// Itemized outcome of a bulk guide assignment run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkAssignReport {
    pub assigned: Vec<GuideAssignment>,
    pub skipped: Vec<SkippedTeam>,
}

impl BulkAssignReport {
    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }
}

/// Result of a single slot search for one team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SlotOutcome {
    /// A period passed both conflict layers and was persisted.
    Booked(ScheduleEntry),
    /// The whole review window was searched without a usable period.
    NoSlotFound,
}

impl SlotOutcome {
    pub fn is_booked(&self) -> bool {
        matches!(self, SlotOutcome::Booked(_))
    }
}

/// Itemized outcome of a bulk schedule generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleGenerationReport {
    pub created: Vec<ScheduleEntry>,
    pub skipped: Vec<SkippedTeam>,
}

/// One explicit slot supplied by a coordinator for one team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRequest {
    pub team: TeamId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Per-team outcome of a coordinator batch assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SlotAssignment {
    Created(ScheduleEntry),
    Failed { team: TeamId, reason: String },
}

/// One step of a cascade cleanup, with its (non-fatal) failure if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupStep {
    pub description: String,
    pub error: Option<String>,
}

impl CleanupStep {
    pub fn ok(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            error: None,
        }
    }

    pub fn failed(description: impl Into<String>, error: impl ToString) -> Self {
        Self {
            description: description.into(),
            error: Some(error.to_string()),
        }
    }
}

/// Collected cleanup steps following an entity deletion.
///
/// Cleanup is advisory: the primary delete has already completed by the time
/// this report is produced, and step failures are recorded, not raised.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupReport {
    pub steps: Vec<CleanupStep>,
}

impl CleanupReport {
    pub fn push(&mut self, step: CleanupStep) {
        self.steps.push(step);
    }

    pub fn failures(&self) -> impl Iterator<Item = &CleanupStep> {
        self.steps.iter().filter(|s| s.error.is_some())
    }
}
