//! iCalendar export of query results.
//!
//! Free slots, free rooms and group events are written as VEVENTs that any
//! calendar client can import. Wall-clock times are converted from the
//! institution's timezone to UTC.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use edtslots_core::{FreeLocations, TimeSlot};
use edtslots_providers::{RawEvent, RawEventTime};
use icalendar::{Calendar, Component, Event, EventLike};
use tracing::debug;

/// Title of exported free slots.
pub const FREE_SLOT_SUMMARY: &str = "Créneau libre";

/// Title of exported free-room intervals.
pub const FREE_ROOMS_SUMMARY: &str = "Salles Libres";

/// Builds calendars stamped with a single export time.
#[derive(Debug, Clone)]
pub struct CalendarWriter {
    timezone: Tz,
    exported_at: DateTime<Utc>,
}

impl CalendarWriter {
    /// Creates a writer stamping events with the current time.
    pub fn new(timezone: Tz) -> Self {
        Self::at(timezone, Utc::now())
    }

    /// Creates a writer stamping events with `exported_at`.
    pub fn at(timezone: Tz, exported_at: DateTime<Utc>) -> Self {
        Self {
            timezone,
            exported_at,
        }
    }

    /// One event per free slot.
    pub fn free_slots_calendar(&self, slots: &[TimeSlot]) -> Calendar {
        let mut calendar = Calendar::new();
        for slot in slots {
            calendar.push(
                self.slot_event(slot)
                    .summary(FREE_SLOT_SUMMARY)
                    .done(),
            );
        }
        calendar.done()
    }

    /// One event per interval, located in every free room.
    pub fn free_rooms_calendar(&self, rooms: &FreeLocations) -> Calendar {
        let exported = self
            .exported_at
            .with_timezone(&self.timezone)
            .format("%Y/%m/%d %H:%M");
        let description = format!("\n\nIUT\n(Exported :{})\n", exported);

        let mut calendar = Calendar::new();
        for (slot, free) in rooms {
            calendar.push(
                self.slot_event(slot)
                    .summary(FREE_ROOMS_SUMMARY)
                    .location(&free.join(","))
                    .description(&description)
                    .done(),
            );
        }
        calendar.done()
    }

    /// Re-exports source events with their original identity and stamp.
    pub fn events_calendar(&self, events: &[RawEvent]) -> Calendar {
        let mut calendar = Calendar::new();
        for raw in events {
            let mut event = Event::new();
            event
                .uid(&raw.id)
                .timestamp(raw.stamp.unwrap_or(self.exported_at));

            match raw.start {
                RawEventTime::Date(date) => event.starts(date),
                other => event.starts(self.instant(&other)),
            };
            match raw.end {
                RawEventTime::Date(date) => event.ends(date),
                other => event.ends(self.instant(&other)),
            };

            if let Some(ref summary) = raw.summary {
                event.summary(summary);
            }
            if let Some(ref location) = raw.location {
                event.location(location);
            }
            if let Some(ref description) = raw.description {
                event.description(description);
            }
            calendar.push(event.done());
        }
        calendar.done()
    }

    fn slot_event(&self, slot: &TimeSlot) -> Event {
        Event::new()
            .uid(&format!("EDT-{}", uuid::Uuid::new_v4()))
            .timestamp(self.exported_at)
            .starts(self.to_utc(slot.start()))
            .ends(self.to_utc(slot.end()))
            .done()
    }

    fn instant(&self, time: &RawEventTime) -> DateTime<Utc> {
        match *time {
            RawEventTime::DateTime(dt) => dt,
            RawEventTime::Floating(naive) => self.to_utc(naive),
            RawEventTime::Date(date) => self.to_utc(date.and_time(chrono::NaiveTime::MIN)),
        }
    }

    /// Converts institution wall-clock time to UTC.
    ///
    /// Times skipped by a DST change are read as UTC.
    fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        self.timezone
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| local.and_utc())
    }
}

/// Writes `calendar` to `path`, replacing any existing file.
pub fn write_calendar(path: &Path, calendar: &Calendar) -> std::io::Result<()> {
    std::fs::write(path, calendar.to_string())?;
    debug!(path = %path.display(), events = calendar.len(), "Wrote calendar");
    Ok(())
}
