use serde::{Deserialize, Serialize};

use crate::api::UserId;
use crate::models::time::TimeSlot;

/// Role context an availability submission applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityRole {
    Guide,
    Panel,
}

/// Candidate time intervals one user submitted for a review period.
///
/// The engine only ever reads these; submissions come from the surrounding
/// CRUD layer. Intervals are kept ordered and disjoint by the writer.
///
/// Submissions are keyed by `(owner, role)` only: one review window is
/// active at a time, and intervals always belong to the currently
/// configured window. Opening a new window starts from fresh submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub owner: UserId,
    pub role: AvailabilityRole,
    pub intervals: Vec<TimeSlot>,
}

impl Availability {
    /// Whether any submitted interval intersects the candidate slot.
    pub fn covers(&self, slot: &TimeSlot) -> bool {
        self.intervals.iter().any(|w| w.overlaps(slot))
    }
}
