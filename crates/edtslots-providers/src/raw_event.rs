//! Raw event type from calendar sources.
//!
//! [`RawEvent`] keeps the fields of a timetable entry as the source delivered
//! them. The engine only consumes its [`BusyInterval`] projection and the
//! free-text fields used to recognise a professor.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use edtslots_core::BusyInterval;
use serde::{Deserialize, Serialize};

/// The time specification for a raw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum RawEventTime {
    /// A specific instant in UTC.
    DateTime(DateTime<Utc>),
    /// A wall-clock time without zone, read in the institution's timezone.
    Floating(NaiveDateTime),
    /// An all-day event date (no specific time).
    Date(NaiveDate),
}

impl RawEventTime {
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::Date(date)
    }

    /// Returns true if this is an all-day event time.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Converts to wall-clock time in `tz`; all-day dates have no instant.
    pub fn to_local(&self, tz: &Tz) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(dt.with_timezone(tz).naive_local()),
            Self::Floating(naive) => Some(*naive),
            Self::Date(_) => None,
        }
    }
}

/// A raw timetable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// The event UID. The same course published in several group calendars
    /// keeps the same UID.
    pub id: String,

    pub start: RawEventTime,

    pub end: RawEventTime,

    /// The course title.
    pub summary: Option<String>,

    /// Free text; on the timetable server it lists the groups and the
    /// professors, one per line.
    pub description: Option<String>,

    /// Comma-separated room list.
    pub location: Option<String>,

    /// The organizer field, if the source provides one.
    pub organizer: Option<String>,

    /// The event status (e.g., "confirmed", "cancelled").
    pub status: Option<String>,

    /// When the source stamped the event.
    pub stamp: Option<DateTime<Utc>>,

    /// The calendar (group) this event was fetched from.
    pub calendar_id: String,
}

impl RawEvent {
    /// Creates a new raw event with the minimum required fields.
    pub fn new(
        id: impl Into<String>,
        start: RawEventTime,
        end: RawEventTime,
        calendar_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            summary: None,
            description: None,
            location: None,
            organizer: None,
            status: None,
            stamp: None,
            calendar_id: calendar_id.into(),
        }
    }

    /// Returns the effective title, falling back to "(No title)" if empty.
    pub fn effective_title(&self) -> &str {
        self.summary
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.as_str())
            .unwrap_or("(No title)")
    }

    /// Returns true if the event is cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|s| s.eq_ignore_ascii_case("cancelled"))
    }

    /// Returns true if this is an all-day event.
    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }

    /// Trimmed, non-empty lines of the description.
    ///
    /// Escaped `\n` sequences left in the text are treated as line breaks.
    pub fn description_lines(&self) -> Vec<String> {
        self.description
            .as_deref()
            .map(|d| {
                d.replace("\\n", "\n")
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns true if `name` is one of the people attached to this event.
    ///
    /// A description line must equal the name, ignoring case and
    /// surrounding whitespace; the organizer field only has to contain it.
    pub fn mentions(&self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return false;
        }

        self.description_lines()
            .iter()
            .any(|line| line.to_lowercase() == wanted)
            || self
                .organizer
                .as_deref()
                .is_some_and(|o| o.to_lowercase().contains(&wanted))
    }

    /// Projects the event onto the engine's busy interval, in `tz` wall-clock
    /// time.
    ///
    /// All-day events have no interval and yield `None`.
    pub fn to_busy_interval(&self, tz: &Tz) -> Option<BusyInterval> {
        let start = self.start.to_local(tz)?;
        let end = self.end.to_local(tz)?;
        let interval = BusyInterval::new(start, end);
        Some(match self.location {
            Some(ref location) => interval.with_locations([location.as_str()]),
            None => interval,
        })
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_organizer(mut self, organizer: impl Into<String>) -> Self {
        self.organizer = Some(organizer.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_stamp(mut self, stamp: DateTime<Utc>) -> Self {
        self.stamp = Some(stamp);
        self
    }
}
