//! Time types for timetable availability.
//!
//! This module provides [`TimeSlot`] for candidate scheduling intervals,
//! [`BusyInterval`] for committed events coming from a calendar source, and
//! [`DateRange`] for the day-granular query range.
//!
//! All instants are naive datetimes expressed in the institution's timezone.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A candidate scheduling interval `[start, end]` with `start < end`.
///
/// Slots are value objects: two slots are equal iff their boundaries are
/// equal, and they order by `(start, end)`, which makes them usable as map
/// keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TimeSlot {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeSlot {
    /// Creates a new slot, or `None` if `start` is not strictly before `end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Start of the slot.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// End of the slot.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Returns the duration of this slot.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if `other` lies within this slot (boundaries inclusive).
    pub fn contains(&self, other: &TimeSlot) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Checks if the two slots share any instant other than a boundary.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.date() == self.end.date() {
            write!(
                f,
                "{} {}-{}",
                self.start.format("%a %Y-%m-%d"),
                self.start.format("%H:%M"),
                self.end.format("%H:%M")
            )
        } else {
            write!(
                f,
                "{} - {}",
                self.start.format("%a %Y-%m-%d %H:%M"),
                self.end.format("%a %Y-%m-%d %H:%M")
            )
        }
    }
}

/// A committed occupation reported by a calendar source.
///
/// `locations` holds the labels exactly as the source declared them; they are
/// checked against the location universe only when aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    /// When the occupation starts.
    pub start: NaiveDateTime,
    /// When the occupation ends.
    pub end: NaiveDateTime,
    /// Declared location labels, possibly empty.
    #[serde(default)]
    pub locations: Vec<String>,
}

impl BusyInterval {
    /// Creates a busy interval without locations.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            locations: Vec::new(),
        }
    }

    /// Builder method to set the declared locations.
    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = locations.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the interval as a slot key, or `None` if it is empty or inverted.
    pub fn as_slot(&self) -> Option<TimeSlot> {
        TimeSlot::new(self.start, self.end)
    }
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day (inclusive).
    pub first: NaiveDate,
    /// Last day (inclusive).
    pub last: NaiveDate,
}

impl DateRange {
    /// Creates a date range, or `None` if `first` is after `last`.
    pub fn new(first: NaiveDate, last: NaiveDate) -> Option<Self> {
        (first <= last).then_some(Self { first, last })
    }

    /// Creates a range covering a single day.
    pub fn single(day: NaiveDate) -> Self {
        Self {
            first: day,
            last: day,
        }
    }

    /// Number of days in the range.
    pub fn num_days(&self) -> i64 {
        (self.last - self.first).num_days() + 1
    }

    /// Checks if a day falls inside the range.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.first <= day && day <= self.last
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.first.format("%Y-%m-%d"),
            self.last.format("%Y-%m-%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod time_slot {
        use super::*;

        #[test]
        fn creation() {
            let slot = TimeSlot::new(at(2022, 1, 24, 7, 0), at(2022, 1, 24, 9, 0)).unwrap();
            assert_eq!(slot.start(), at(2022, 1, 24, 7, 0));
            assert_eq!(slot.end(), at(2022, 1, 24, 9, 0));
            assert_eq!(slot.duration(), Duration::hours(2));
        }

        #[test]
        fn rejects_empty_and_inverted() {
            assert!(TimeSlot::new(at(2022, 1, 24, 9, 0), at(2022, 1, 24, 9, 0)).is_none());
            assert!(TimeSlot::new(at(2022, 1, 24, 9, 0), at(2022, 1, 24, 7, 0)).is_none());
        }

        #[test]
        fn ordering_is_by_start_then_end() {
            let a = TimeSlot::new(at(2022, 1, 24, 7, 0), at(2022, 1, 24, 9, 0)).unwrap();
            let b = TimeSlot::new(at(2022, 1, 24, 7, 0), at(2022, 1, 24, 11, 0)).unwrap();
            let c = TimeSlot::new(at(2022, 1, 24, 9, 0), at(2022, 1, 24, 11, 0)).unwrap();
            assert!(a < b);
            assert!(b < c);
        }

        #[test]
        fn containment_and_overlap() {
            let outer = TimeSlot::new(at(2022, 1, 24, 7, 0), at(2022, 1, 24, 11, 0)).unwrap();
            let inner = TimeSlot::new(at(2022, 1, 24, 8, 0), at(2022, 1, 24, 9, 0)).unwrap();
            let after = TimeSlot::new(at(2022, 1, 24, 11, 0), at(2022, 1, 24, 13, 0)).unwrap();

            assert!(outer.contains(&inner));
            assert!(outer.contains(&outer));
            assert!(!inner.contains(&outer));
            assert!(outer.overlaps(&inner));
            // Touching boundaries do not overlap
            assert!(!outer.overlaps(&after));
        }

        #[test]
        fn display() {
            let slot = TimeSlot::new(at(2022, 1, 24, 13, 0), at(2022, 1, 24, 15, 0)).unwrap();
            assert_eq!(slot.to_string(), "Mon 2022-01-24 13:00-15:00");
        }
    }

    mod busy_interval {
        use super::*;

        #[test]
        fn as_slot() {
            let iv = BusyInterval::new(at(2022, 1, 24, 9, 0), at(2022, 1, 24, 11, 0))
                .with_locations(["S10", "S11"]);
            assert_eq!(iv.locations, vec!["S10".to_string(), "S11".to_string()]);
            assert_eq!(
                iv.as_slot(),
                TimeSlot::new(at(2022, 1, 24, 9, 0), at(2022, 1, 24, 11, 0))
            );

            let inverted = BusyInterval::new(at(2022, 1, 24, 11, 0), at(2022, 1, 24, 9, 0));
            assert!(inverted.as_slot().is_none());
        }

        #[test]
        fn serde_defaults_locations() {
            let json = r#"{"start":"2022-01-24T09:00:00","end":"2022-01-24T11:00:00"}"#;
            let iv: BusyInterval = serde_json::from_str(json).unwrap();
            assert!(iv.locations.is_empty());
        }
    }

    mod date_range {
        use super::*;

        #[test]
        fn creation() {
            let range = DateRange::new(date(2022, 1, 24), date(2022, 1, 28)).unwrap();
            assert_eq!(range.num_days(), 5);
            assert!(range.contains(date(2022, 1, 26)));
            assert!(!range.contains(date(2022, 1, 29)));
            assert_eq!(range.to_string(), "2022-01-24..2022-01-28");
        }

        #[test]
        fn inverted_range() {
            assert!(DateRange::new(date(2022, 1, 28), date(2022, 1, 24)).is_none());
            assert_eq!(DateRange::single(date(2022, 1, 24)).num_days(), 1);
        }
    }
}
