use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Half-open interval intersection test.
///
/// True iff `[a_start, a_end)` and `[b_start, b_end)` share any instant.
/// Touching endpoints do not count as overlapping, and a degenerate
/// interval (`start == end`) never overlaps anything.
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

/// A concrete time interval, used for availability windows and bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeSlot {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Whether this slot intersects `other` (half-open semantics).
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}
