//! Query commands: slots, free time, free rooms, group events.

use std::path::Path;
use std::sync::Arc;

use edtslots_providers::{ErrorSource, EventSource};
use icalendar::Calendar;
use tracing::info;

use crate::calendar::{CalendarWriter, write_calendar};
use crate::cli::{CourseArgs, OutputArgs, RangeArgs};
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::output;
use crate::query::AvailabilityQuery;

/// Builds the query engine described by the configuration.
///
/// A source that cannot be created is replaced by one failing every fetch,
/// so commands that need no download keep working.
pub fn availability_query(config: &ClientConfig) -> ClientResult<AvailabilityQuery> {
    let source = event_source(config)?;
    Ok(
        AvailabilityQuery::new(source, config.group_universe(), config.location_universe())
            .with_policy(config.policy.clone())
            .with_timezone(config.timezone())
            .with_max_concurrent_fetches(config.query.max_concurrent_fetches),
    )
}

#[cfg(feature = "ade")]
fn event_source(config: &ClientConfig) -> ClientResult<Arc<dyn EventSource>> {
    use edtslots_providers::ade::AdeSource;

    let ade = config.ade_config()?;
    Ok(match AdeSource::new(ade, config.group_universe()) {
        Ok(source) => Arc::new(source),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to initialize ADE source");
            Arc::new(ErrorSource::new("ade", e))
        }
    })
}

#[cfg(not(feature = "ade"))]
fn event_source(_config: &ClientConfig) -> ClientResult<Arc<dyn EventSource>> {
    Ok(Arc::new(ErrorSource::new(
        "none",
        edtslots_providers::ProviderError::configuration("built without a timetable source"),
    )))
}

/// Print the candidate slots.
pub fn slots(query: &AvailabilityQuery, range: &RangeArgs) -> ClientResult<()> {
    let slots = query.candidate_slots(range.from, range.last())?;
    println!("{}", output::format_slots_tty(&slots));
    Ok(())
}

/// Print the slots where the group and the professor are both free.
pub async fn free(
    query: &AvailabilityQuery,
    course: &CourseArgs,
    out: &OutputArgs,
) -> ClientResult<()> {
    let free = query
        .free_time_for(&course.professor, &course.group, course.range.from, course.range.last())
        .await?;

    if let Some(ref path) = out.ics {
        let calendar = CalendarWriter::new(query.timezone()).free_slots_calendar(&free);
        export(path, &calendar)?;
    }

    if out.json {
        println!("{}", serde_json::to_string_pretty(&output::slots_json(&free))?);
    } else {
        println!("{}", output::format_slots_tty(&free));
    }
    Ok(())
}

/// Print the free rooms for the slots where the course could be moved.
pub async fn rooms(
    query: &AvailabilityQuery,
    course: &CourseArgs,
    out: &OutputArgs,
) -> ClientResult<()> {
    let rooms = query
        .rooms_to_move_course(&course.professor, &course.group, course.range.from, course.range.last())
        .await?;

    if let Some(ref path) = out.ics {
        let calendar = CalendarWriter::new(query.timezone()).free_rooms_calendar(&rooms);
        export(path, &calendar)?;
    }

    if out.json {
        println!("{}", serde_json::to_string_pretty(&output::rooms_json(&rooms))?);
    } else {
        println!("{}", output::format_rooms_tty(&rooms));
    }
    Ok(())
}

/// Print the events of one group, optionally exporting them.
pub async fn events(
    query: &AvailabilityQuery,
    group: &str,
    range: &RangeArgs,
    ics: Option<&Path>,
) -> ClientResult<()> {
    let events = query.group_events(group, range.from, range.last()).await?;

    if let Some(path) = ics {
        let calendar = CalendarWriter::new(query.timezone()).events_calendar(&events);
        export(path, &calendar)?;
    }

    println!("{}", output::format_events_tty(&events, &query.timezone()));
    Ok(())
}

/// List the monitored groups.
pub fn groups(query: &AvailabilityQuery) -> ClientResult<()> {
    for group in query.groups().groups() {
        match group.label {
            Some(ref label) => println!("{}\t{}", group.id, label),
            None => println!("{}", group.id),
        }
    }
    Ok(())
}

/// List the known rooms.
pub fn locations(query: &AvailabilityQuery) -> ClientResult<()> {
    for label in query.locations().labels() {
        println!("{}", label);
    }
    Ok(())
}

fn export(path: &Path, calendar: &Calendar) -> ClientResult<()> {
    write_calendar(path, calendar)?;
    info!(path = %path.display(), "Exported calendar");
    Ok(())
}
