//! Weekly business-hours policy and candidate slot generation.
//!
//! The policy is a table mapping each weekday to a [`DayRule`] (or to nothing
//! when the day is closed). [`WeeklyPolicy::generate_slots`] walks a cursor
//! over the requested days and consults the table at every step:
//!
//! - past the day's `close` time, or on a closed day, the cursor jumps to the
//!   next day's opening time;
//! - inside a [`Break`], the cursor snaps to the end of the break;
//! - otherwise the cursor advances by the day's step and the two boundaries
//!   form a [`TimeSlot`].
//!
//! Jumps never produce slots.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::slot::{DateRange, TimeSlot};

/// Errors for malformed weekly policies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// A day has a zero step.
    #[error("{day}: step must be at least one minute")]
    ZeroStep { day: Weekday },

    /// A break ends before it starts.
    #[error("{day}: break {from}-{until} is empty or inverted")]
    InvalidBreak {
        day: Weekday,
        from: NaiveTime,
        until: NaiveTime,
    },

    /// A break reaches outside the day's open hours.
    #[error("{day}: break {from}-{until} is outside the open hours {open}-{close}")]
    BreakOutsideDay {
        day: Weekday,
        from: NaiveTime,
        until: NaiveTime,
        open: NaiveTime,
        close: NaiveTime,
    },

    /// The day opens after it closes.
    #[error("{day}: closes at {close}, before the day starts at {open}")]
    ClosesBeforeOpening {
        day: Weekday,
        open: NaiveTime,
        close: NaiveTime,
    },

    /// The daily window is empty.
    #[error("day starts at {start} but the range limit is {end}")]
    InvalidDayBounds { start: NaiveTime, end: NaiveTime },

    /// Every weekday is closed.
    #[error("policy has no open weekday")]
    NoOpenDay,
}

/// A span of the day during which the cursor snaps forward to `until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Break {
    /// Start of the break (inclusive).
    pub from: NaiveTime,
    /// Where the cursor resumes.
    pub until: NaiveTime,
}

impl Break {
    /// Creates a new break.
    pub fn new(from: NaiveTime, until: NaiveTime) -> Self {
        Self { from, until }
    }

    fn contains(&self, time: NaiveTime) -> bool {
        self.from <= time && time < self.until
    }
}

/// The stepping rule for one open weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRule {
    /// Length of one slot, in minutes.
    pub step_minutes: u32,
    /// Breaks skipped without producing a slot.
    #[serde(default)]
    pub breaks: Vec<Break>,
    /// Once the cursor reaches this time, the day is over.
    pub close: NaiveTime,
}

impl DayRule {
    /// Creates a rule with the given step and closing time.
    pub fn new(step_minutes: u32, close: NaiveTime) -> Self {
        Self {
            step_minutes,
            breaks: Vec::new(),
            close,
        }
    }

    /// Builder method to add a break.
    pub fn with_break(mut self, from: NaiveTime, until: NaiveTime) -> Self {
        self.breaks.push(Break::new(from, until));
        self
    }

    /// Returns the step as a duration.
    pub fn step(&self) -> Duration {
        Duration::minutes(i64::from(self.step_minutes))
    }
}

/// What the cursor does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Move forward by one step; the covered span is a slot.
    Advance(NaiveDateTime),
    /// Move forward without producing a slot.
    Jump(NaiveDateTime),
}

/// Weekday table driving slot generation.
///
/// A weekday set to `None` is closed for the whole day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPolicy {
    /// Time at which every open day starts.
    pub day_start: NaiveTime,
    /// Time of the last day after which no slot may end.
    pub day_end: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monday: Option<DayRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuesday: Option<DayRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wednesday: Option<DayRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thursday: Option<DayRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friday: Option<DayRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturday: Option<DayRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunday: Option<DayRule>,
}

impl Default for WeeklyPolicy {
    fn default() -> Self {
        Self::institutional()
    }
}

const fn hm(hour: u32, minute: u32) -> NaiveTime {
    let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) else {
        panic!("invalid time of day");
    };
    time
}

const OPENING: NaiveTime = hm(7, 0);
const CLOSING: NaiveTime = hm(17, 0);
const LUNCH: NaiveTime = hm(11, 0);
const LUNCH_END: NaiveTime = hm(13, 0);
const FRIDAY_LUNCH_END: NaiveTime = hm(12, 30);
const FRIDAY_CLOSING: NaiveTime = hm(16, 30);

impl WeeklyPolicy {
    /// The IUT timetable: 2-hour slots from 07:00, lunch 11:00-13:00
    /// (11:00-12:30 on Friday), Thursday afternoons off, Friday ending at
    /// 16:30, weekends closed.
    pub fn institutional() -> Self {
        let regular = DayRule::new(120, CLOSING).with_break(LUNCH, LUNCH_END);
        Self {
            day_start: OPENING,
            day_end: CLOSING,
            monday: Some(regular.clone()),
            tuesday: Some(regular.clone()),
            wednesday: Some(regular),
            thursday: Some(DayRule::new(120, LUNCH)),
            friday: Some(DayRule::new(120, FRIDAY_CLOSING).with_break(LUNCH, FRIDAY_LUNCH_END)),
            saturday: None,
            sunday: None,
        }
    }

    /// Returns the rule for a weekday, or `None` if the day is closed.
    pub fn rule(&self, day: Weekday) -> Option<&DayRule> {
        match day {
            Weekday::Mon => self.monday.as_ref(),
            Weekday::Tue => self.tuesday.as_ref(),
            Weekday::Wed => self.wednesday.as_ref(),
            Weekday::Thu => self.thursday.as_ref(),
            Weekday::Fri => self.friday.as_ref(),
            Weekday::Sat => self.saturday.as_ref(),
            Weekday::Sun => self.sunday.as_ref(),
        }
    }

    /// Checks that every rule can drive the stepping loop.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, in Monday-to-Sunday order.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.day_start >= self.day_end {
            return Err(PolicyError::InvalidDayBounds {
                start: self.day_start,
                end: self.day_end,
            });
        }

        let mut open_days = 0;
        for day in WEEK {
            let Some(rule) = self.rule(day) else {
                continue;
            };
            open_days += 1;

            if rule.step_minutes == 0 {
                return Err(PolicyError::ZeroStep { day });
            }
            if rule.close < self.day_start {
                return Err(PolicyError::ClosesBeforeOpening {
                    day,
                    open: self.day_start,
                    close: rule.close,
                });
            }
            if let Some(b) = rule.breaks.iter().find(|b| b.from >= b.until) {
                return Err(PolicyError::InvalidBreak {
                    day,
                    from: b.from,
                    until: b.until,
                });
            }
            if let Some(b) = rule
                .breaks
                .iter()
                .find(|b| b.from < self.day_start || b.until > rule.close)
            {
                return Err(PolicyError::BreakOutsideDay {
                    day,
                    from: b.from,
                    until: b.until,
                    open: self.day_start,
                    close: rule.close,
                });
            }
        }

        if open_days == 0 {
            return Err(PolicyError::NoOpenDay);
        }
        Ok(())
    }

    /// Generates the candidate slots covering `range`, in chronological order.
    pub fn generate_slots(&self, range: DateRange) -> Vec<TimeSlot> {
        self.generate_between(range.first, range.last)
    }

    /// Generates the candidate slots from `first` to `last` inclusive.
    ///
    /// Returns an empty list when `first` is after `last`.
    pub fn generate_between(&self, first: NaiveDate, last: NaiveDate) -> Vec<TimeSlot> {
        let limit = last.and_time(self.day_end);
        let mut cursor = first.and_time(self.day_start);
        let mut slots = Vec::new();

        while cursor <= limit {
            match self.next_step(cursor) {
                Step::Advance(next) => {
                    if next > limit {
                        break;
                    }
                    if let Some(slot) = TimeSlot::new(cursor, next) {
                        trace!(slot = %slot, "Generated slot");
                        slots.push(slot);
                    }
                    cursor = next;
                }
                Step::Jump(next) => cursor = next,
            }
        }

        debug!(
            first = %first,
            last = %last,
            count = slots.len(),
            "Generated candidate slots"
        );

        slots
    }

    fn next_step(&self, cursor: NaiveDateTime) -> Step {
        let next_opening = (cursor.date() + Duration::days(1)).and_time(self.day_start);

        let Some(rule) = self.rule(cursor.weekday()) else {
            return Step::Jump(next_opening);
        };

        let time = cursor.time();
        if time >= rule.close || rule.step_minutes == 0 {
            return Step::Jump(next_opening);
        }

        if let Some(b) = rule.breaks.iter().find(|b| b.contains(time)) {
            return Step::Jump(cursor.date().and_time(b.until));
        }

        Step::Advance(cursor + rule.step())
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Generates candidate slots under [`WeeklyPolicy::institutional`].
pub fn generate_slots(first: NaiveDate, last: NaiveDate) -> Vec<TimeSlot> {
    WeeklyPolicy::institutional().generate_between(first, last)
}
