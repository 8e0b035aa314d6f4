//! ICS/iCalendar parsing utilities.
//!
//! This module parses iCalendar (RFC 5545) data and converts it to [`RawEvent`].

use chrono::{TimeZone, Utc};
use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event, EventLike,
};
use tracing::{debug, trace};

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::{RawEvent, RawEventTime};

/// Parses ICS content and extracts events.
///
/// A calendar with no VEVENT is valid and yields an empty list. Events
/// without a UID or a start are skipped.
///
/// # Errors
///
/// Returns an invalid-response error when the payload is not an iCalendar
/// document.
pub fn parse_ics_content(ics: &str, calendar_id: &str) -> ProviderResult<Vec<RawEvent>> {
    let body = ics.trim_start_matches('\u{feff}').trim_start();
    if !body.starts_with("BEGIN:VCALENDAR") {
        return Err(ProviderError::invalid_response(format!(
            "calendar '{}' is not an iCalendar document",
            calendar_id
        )));
    }

    let calendar = body.parse::<Calendar>().map_err(|e| {
        ProviderError::invalid_response(format!(
            "calendar '{}' could not be parsed: {}",
            calendar_id, e
        ))
    })?;

    let events: Vec<RawEvent> = calendar
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => parse_event(event, calendar_id),
            _ => None,
        })
        .collect();

    debug!(calendar = %calendar_id, count = events.len(), "Parsed ICS calendar");
    Ok(events)
}

/// Parses a single VEVENT component into a RawEvent.
fn parse_event(event: &Event, calendar_id: &str) -> Option<RawEvent> {
    let uid = event.get_uid()?;
    let start = convert_date_time(event.get_start()?);
    let end = event
        .get_end()
        .map(convert_date_time)
        .unwrap_or(start);

    let mut raw = RawEvent::new(uid, start, end, calendar_id);

    if let Some(summary) = event.get_summary() {
        raw = raw.with_summary(summary);
    }
    if let Some(description) = event.get_description() {
        raw = raw.with_description(description);
    }
    if let Some(location) = event.get_location() {
        raw = raw.with_location(location);
    }
    if let Some(organizer) = event.property_value("ORGANIZER") {
        raw = raw.with_organizer(organizer);
    }
    if let Some(status) = event.get_status() {
        raw = raw.with_status(format!("{:?}", status));
    }
    if let Some(stamp) = event.get_timestamp() {
        raw = raw.with_stamp(stamp);
    }

    trace!(
        uid = %raw.id,
        summary = ?raw.summary,
        start = ?raw.start,
        "Parsed event from ICS"
    );

    Some(raw)
}

/// Converts icalendar DatePerhapsTime to RawEventTime.
fn convert_date_time(dt: DatePerhapsTime) -> RawEventTime {
    match dt {
        DatePerhapsTime::Date(date) => RawEventTime::from_date(date),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => RawEventTime::from_datetime(dt),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            RawEventTime::Floating(naive)
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            // Unknown zone names fall back to institution-local time
            match tzid
                .parse::<chrono_tz::Tz>()
                .ok()
                .and_then(|tz| tz.from_local_datetime(&date_time).earliest())
            {
                Some(zoned) => RawEventTime::from_datetime(zoned.with_timezone(&Utc)),
                None => RawEventTime::Floating(date_time),
            }
        }
    }
}
