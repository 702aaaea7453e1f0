//! Fixed daily period grid over a review window.
//!
//! Nine 40-minute periods per weekday, separated by 10-minute gaps with a
//! longer midday break after period 5. The iterator yields periods in
//! chronological then intra-day order; this is the canonical search order
//! of the slot booking service, so it must stay deterministic and
//! reproducible across runs.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Number of review periods on one day.
pub const PERIODS_PER_DAY: usize = 9;

/// Clock offsets `(start, end)` of each period as `(hour, minute)` pairs.
/// The break after period 5 (13:00 to 13:50) is the midday gap.
const PERIOD_OFFSETS: [((u32, u32), (u32, u32)); PERIODS_PER_DAY] = [
    ((9, 0), (9, 40)),
    ((9, 50), (10, 30)),
    ((10, 40), (11, 20)),
    ((11, 30), (12, 10)),
    ((12, 20), (13, 0)),
    ((13, 50), (14, 30)),
    ((14, 40), (15, 20)),
    ((15, 30), (16, 10)),
    ((16, 20), (17, 0)),
];

fn clock(pair: (u32, u32)) -> NaiveTime {
    let (hour, minute) = pair;
    // The offset table above only holds valid clock times.
    NaiveTime::from_hms_opt(hour, minute, 0).expect("period table holds valid clock times")
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// One candidate review period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSlot {
    pub date: NaiveDate,
    /// Zero-based period index within the day.
    pub period: usize,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Lazy, finite, restartable sequence of review periods over an inclusive
/// date range, weekends excluded.
#[derive(Debug, Clone)]
pub struct ReviewPeriodGrid {
    cursor: Option<NaiveDate>,
    end: NaiveDate,
    period: usize,
}

impl ReviewPeriodGrid {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            cursor: (start <= end).then_some(start),
            end,
            period: 0,
        }
    }
}

impl Iterator for ReviewPeriodGrid {
    type Item = GridSlot;

    fn next(&mut self) -> Option<GridSlot> {
        loop {
            let date = self.cursor?;
            if date > self.end {
                self.cursor = None;
                return None;
            }
            if is_weekend(date) || self.period >= PERIODS_PER_DAY {
                self.cursor = date.succ_opt();
                self.period = 0;
                continue;
            }
            let (start, end) = PERIOD_OFFSETS[self.period];
            let slot = GridSlot {
                date,
                period: self.period,
                start: date.and_time(clock(start)),
                end: date.and_time(clock(end)),
            };
            self.period += 1;
            return Some(slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_nine_periods_per_weekday() {
        // 2026-03-02 is a Monday.
        let slots: Vec<GridSlot> = ReviewPeriodGrid::new(date(2026, 3, 2), date(2026, 3, 2)).collect();
        assert_eq!(slots.len(), PERIODS_PER_DAY);
        assert_eq!(slots[0].start.time(), clock((9, 0)));
        assert_eq!(slots[8].end.time(), clock((17, 0)));
    }

    #[test]
    fn test_period_durations_and_gaps() {
        let slots: Vec<GridSlot> = ReviewPeriodGrid::new(date(2026, 3, 2), date(2026, 3, 2)).collect();
        for slot in &slots {
            assert_eq!((slot.end - slot.start).num_minutes(), 40);
        }
        for pair in slots.windows(2) {
            let gap = (pair[1].start - pair[0].end).num_minutes();
            if pair[0].period == 4 {
                // Midday break after period 5.
                assert_eq!(gap, 50);
            } else {
                assert_eq!(gap, 10);
            }
        }
    }

    #[test]
    fn test_weekend_only_window_is_empty() {
        // 2026-03-07/08 are Saturday and Sunday.
        let slots: Vec<GridSlot> = ReviewPeriodGrid::new(date(2026, 3, 7), date(2026, 3, 8)).collect();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_friday_to_monday_skips_weekend() {
        // 2026-03-06 Friday through 2026-03-09 Monday.
        let slots: Vec<GridSlot> = ReviewPeriodGrid::new(date(2026, 3, 6), date(2026, 3, 9)).collect();
        assert_eq!(slots.len(), 2 * PERIODS_PER_DAY);
        assert_eq!(slots[0].date, date(2026, 3, 6));
        assert_eq!(slots[PERIODS_PER_DAY].date, date(2026, 3, 9));
    }

    #[test]
    fn test_chronological_order_and_restartability() {
        let make = || ReviewPeriodGrid::new(date(2026, 3, 2), date(2026, 3, 13));
        let first: Vec<GridSlot> = make().collect();
        let second: Vec<GridSlot> = make().collect();
        assert_eq!(first, second);
        for pair in first.windows(2) {
            assert!(pair[0].start < pair[1].start);
        }
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let slots: Vec<GridSlot> = ReviewPeriodGrid::new(date(2026, 3, 9), date(2026, 3, 2)).collect();
        assert!(slots.is_empty());
    }
}
