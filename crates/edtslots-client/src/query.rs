//! Availability queries.
//!
//! [`AvailabilityQuery`] ties the pure engine (slot generation, filtering,
//! room occupancy) to an [`EventSource`]. Every query validates its inputs,
//! downloads what it needs and fails as a whole on the first source error;
//! partial results are never returned.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use futures_util::{StreamExt, TryStreamExt, stream};
use thiserror::Error;
use tracing::{debug, info};

use edtslots_core::{
    BusyInterval, DateRange, FreeLocations, GroupUniverse, LocationUniverse, TimeSlot,
    WeeklyPolicy, aggregate_occupancy, free_locations, remove_occupied, restrict_to_slots,
};
use edtslots_providers::{EventSource, FetchRequest, ProviderError, RawEvent};

/// Errors for availability queries.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The group is not part of the monitored universe.
    #[error("unknown group '{identity}'")]
    UnknownIdentity { identity: String },

    /// A calendar could not be obtained; an empty calendar is not an error.
    #[error("calendar '{identity}' is unavailable: {source}")]
    SourceUnavailable {
        identity: String,
        #[source]
        source: ProviderError,
    },

    /// The source itself is misconfigured; retrying will not help.
    #[error("calendar source for '{identity}' is misconfigured: {source}")]
    SourceMisconfigured {
        identity: String,
        #[source]
        source: ProviderError,
    },

    /// The first day comes after the last one.
    #[error("invalid date range: {first} is after {last}")]
    InvalidRange { first: NaiveDate, last: NaiveDate },
}

impl QueryError {
    fn from_provider(identity: &str, source: ProviderError) -> Self {
        let identity = identity.to_string();
        if source.is_unknown_identity() {
            Self::UnknownIdentity { identity }
        } else if source.is_source_unavailable() {
            Self::SourceUnavailable { identity, source }
        } else {
            Self::SourceMisconfigured { identity, source }
        }
    }
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Free-slot and free-room queries over the monitored groups.
pub struct AvailabilityQuery {
    source: Arc<dyn EventSource>,
    groups: GroupUniverse,
    locations: LocationUniverse,
    policy: WeeklyPolicy,
    timezone: Tz,
    max_concurrent_fetches: usize,
}

impl AvailabilityQuery {
    /// Default number of calendars downloaded at the same time.
    pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

    /// Creates a query over the given universes with the institutional
    /// weekly policy and the Europe/Paris timezone.
    pub fn new(
        source: Arc<dyn EventSource>,
        groups: GroupUniverse,
        locations: LocationUniverse,
    ) -> Self {
        Self {
            source,
            groups,
            locations,
            policy: WeeklyPolicy::institutional(),
            timezone: chrono_tz::Europe::Paris,
            max_concurrent_fetches: Self::DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }

    pub fn with_policy(mut self, policy: WeeklyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Sets the download width; zero is treated as one.
    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max.max(1);
        self
    }

    pub fn groups(&self) -> &GroupUniverse {
        &self.groups
    }

    pub fn locations(&self) -> &LocationUniverse {
        &self.locations
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Candidate slots over `first..=last` under the weekly policy.
    pub fn candidate_slots(&self, first: NaiveDate, last: NaiveDate) -> QueryResult<Vec<TimeSlot>> {
        let range = Self::range(first, last)?;
        Ok(self.policy.generate_slots(range))
    }

    /// Slots in which neither the group nor the professor has a course.
    ///
    /// The professor's courses are searched in every monitored group's
    /// calendar, since the same professor teaches several groups.
    pub async fn free_time_for(
        &self,
        professor: &str,
        group: &str,
        first: NaiveDate,
        last: NaiveDate,
    ) -> QueryResult<Vec<TimeSlot>> {
        self.check_group(group)?;
        let range = Self::range(first, last)?;

        let candidates = self.policy.generate_slots(range);

        let group_busy = self.busy_intervals(&self.fetch_group(group, range).await?);

        let all_events = self.fetch_all_groups(range).await?;
        let professor_events = professor_courses(&all_events, professor);
        let professor_busy = self.busy_intervals(&professor_events);

        debug!(
            group = %group,
            candidates = candidates.len(),
            group_events = group_busy.len(),
            professor_events = professor_busy.len(),
            "Filtering candidate slots"
        );

        let free = remove_occupied(&candidates, &[group_busy.as_slice(), professor_busy.as_slice()]);
        info!(group = %group, range = %range, free = free.len(), "Computed free slots");
        Ok(free)
    }

    /// Rooms free during each event interval that lies within one of
    /// `free_slots`.
    pub async fn free_rooms_for(
        &self,
        free_slots: &[TimeSlot],
        first: NaiveDate,
        last: NaiveDate,
    ) -> QueryResult<FreeLocations> {
        let range = Self::range(first, last)?;

        let all_events = self.fetch_all_groups(range).await?;
        let busy = self.busy_intervals(&all_events);
        let index = aggregate_occupancy(&busy, &self.locations);

        let rooms = restrict_to_slots(free_locations(&index, &self.locations), free_slots);
        info!(range = %range, intervals = rooms.len(), "Computed free rooms");
        Ok(rooms)
    }

    /// Free rooms for the slots in which a course of `group` with
    /// `professor` could be moved.
    pub async fn rooms_to_move_course(
        &self,
        professor: &str,
        group: &str,
        first: NaiveDate,
        last: NaiveDate,
    ) -> QueryResult<FreeLocations> {
        let free = self.free_time_for(professor, group, first, last).await?;
        self.free_rooms_for(&free, first, last).await
    }

    /// The timed, non-cancelled events of one group.
    pub async fn group_events(
        &self,
        group: &str,
        first: NaiveDate,
        last: NaiveDate,
    ) -> QueryResult<Vec<RawEvent>> {
        self.check_group(group)?;
        let range = Self::range(first, last)?;

        Ok(self
            .fetch_group(group, range)
            .await?
            .into_iter()
            .filter(|e| !e.is_cancelled() && !e.is_all_day())
            .collect())
    }

    fn range(first: NaiveDate, last: NaiveDate) -> QueryResult<DateRange> {
        DateRange::new(first, last).ok_or(QueryError::InvalidRange { first, last })
    }

    fn check_group(&self, group: &str) -> QueryResult<()> {
        if self.groups.contains(group) {
            Ok(())
        } else {
            Err(QueryError::UnknownIdentity {
                identity: group.to_string(),
            })
        }
    }

    async fn fetch_group(&self, group: &str, range: DateRange) -> QueryResult<Vec<RawEvent>> {
        self.source
            .fetch_events(FetchRequest::new(group, range))
            .await
            .map_err(|e| QueryError::from_provider(group, e))
    }

    /// Downloads every monitored group's calendar, at most
    /// `max_concurrent_fetches` at a time.
    ///
    /// Events come back in group declaration order. The first failure
    /// aborts the remaining downloads.
    async fn fetch_all_groups(&self, range: DateRange) -> QueryResult<Vec<RawEvent>> {
        let per_group: Vec<Vec<RawEvent>> = stream::iter(self.groups.ids())
            .map(|group| self.fetch_group(group, range))
            .buffered(self.max_concurrent_fetches)
            .try_collect()
            .await?;

        let events: Vec<RawEvent> = per_group.into_iter().flatten().collect();
        debug!(
            groups = self.groups.len(),
            events = events.len(),
            "Fetched all monitored calendars"
        );
        Ok(events)
    }

    /// Projects events onto busy intervals in institution time, dropping
    /// cancelled and all-day events.
    fn busy_intervals(&self, events: &[RawEvent]) -> Vec<BusyInterval> {
        events
            .iter()
            .filter(|e| !e.is_cancelled())
            .filter_map(|e| e.to_busy_interval(&self.timezone))
            .collect()
    }
}

/// Events mentioning `professor`, keeping the first copy of each UID.
fn professor_courses(events: &[RawEvent], professor: &str) -> Vec<RawEvent> {
    let mut seen = HashSet::new();
    events
        .iter()
        .filter(|e| e.mentions(professor))
        .filter(|e| seen.insert(e.id.clone()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use edtslots_core::Group;
    use edtslots_providers::{MemorySource, ProviderErrorCode, RawEventTime};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, d).unwrap()
    }

    fn course(uid: &str, group: &str, d: u32, (h1, m1): (u32, u32), (h2, m2): (u32, u32)) -> RawEvent {
        let start = day(d).and_hms_opt(h1, m1, 0).unwrap();
        let end = day(d).and_hms_opt(h2, m2, 0).unwrap();
        RawEvent::new(
            uid,
            RawEventTime::Floating(start),
            RawEventTime::Floating(end),
            group,
        )
    }

    fn slot(d: u32, (h1, m1): (u32, u32), (h2, m2): (u32, u32)) -> TimeSlot {
        TimeSlot::new(
            day(d).and_hms_opt(h1, m1, 0).unwrap(),
            day(d).and_hms_opt(h2, m2, 0).unwrap(),
        )
        .unwrap()
    }

    fn groups() -> GroupUniverse {
        GroupUniverse::new([
            Group::new("9311").with_label("S3 G1"),
            Group::new("9312").with_label("S3 G2"),
        ])
    }

    fn locations() -> LocationUniverse {
        LocationUniverse::new(["S10", "S11", "S12"])
    }

    fn query(source: MemorySource) -> (Arc<MemorySource>, AvailabilityQuery) {
        let source = Arc::new(source);
        let query = AvailabilityQuery::new(source.clone(), groups(), locations())
            .with_max_concurrent_fetches(2);
        (source, query)
    }

    mod free_time {
        use super::*;

        #[tokio::test]
        async fn empty_calendars_leave_every_candidate() {
            let (_, query) = query(
                MemorySource::new()
                    .with_empty_calendar("9311")
                    .with_empty_calendar("9312"),
            );

            let free = query.free_time_for("dupont jean", "9311", day(24), day(24)).await.unwrap();
            assert_eq!(
                free,
                vec![
                    slot(24, (7, 0), (9, 0)),
                    slot(24, (9, 0), (11, 0)),
                    slot(24, (13, 0), (15, 0)),
                    slot(24, (15, 0), (17, 0)),
                ]
            );
        }

        #[tokio::test]
        async fn group_course_removes_its_slot() {
            let (_, query) = query(
                MemorySource::new()
                    .with_calendar("9311", vec![course("c1", "9311", 24, (9, 0), (11, 0))])
                    .with_empty_calendar("9312"),
            );

            let free = query.free_time_for("dupont jean", "9311", day(24), day(24)).await.unwrap();
            assert_eq!(
                free,
                vec![
                    slot(24, (7, 0), (9, 0)),
                    slot(24, (13, 0), (15, 0)),
                    slot(24, (15, 0), (17, 0)),
                ]
            );
        }

        #[tokio::test]
        async fn professor_course_in_another_group_removes_its_slot() {
            let taught = course("c2", "9312", 24, (13, 0), (15, 0))
                .with_description("\n\nS3 G2\nDUPONT Jean\n");
            let other = course("c3", "9312", 24, (15, 0), (17, 0))
                .with_description("\n\nS3 G2\nMARTIN Paul\n");
            let (_, query) = query(
                MemorySource::new()
                    .with_empty_calendar("9311")
                    .with_calendar("9312", vec![taught, other]),
            );

            let free = query.free_time_for("dupont jean", "9311", day(24), day(24)).await.unwrap();
            assert_eq!(
                free,
                vec![
                    slot(24, (7, 0), (9, 0)),
                    slot(24, (9, 0), (11, 0)),
                    slot(24, (15, 0), (17, 0)),
                ]
            );
        }

        #[test]
        fn shared_course_is_counted_once() {
            let shared = |group: &str| {
                course("amphi-1", group, 24, (7, 0), (9, 0)).with_description("DUPONT Jean")
            };
            let all = vec![shared("9311"), shared("9312")];
            assert_eq!(professor_courses(&all, "dupont jean").len(), 1);
        }

        #[tokio::test]
        async fn fully_booked_week_is_not_an_error() {
            let busy: Vec<_> = (24..=28)
                .map(|d| course(&format!("day-{}", d), "9311", d, (7, 0), (17, 0)))
                .collect();
            let (_, query) = query(
                MemorySource::new()
                    .with_calendar("9311", busy)
                    .with_empty_calendar("9312"),
            );

            let free = query.free_time_for("dupont jean", "9311", day(24), day(28)).await.unwrap();
            assert!(free.is_empty());
        }

        #[tokio::test]
        async fn unknown_group_is_rejected_before_fetching() {
            let (source, query) = query(MemorySource::new().with_empty_calendar("9311"));

            let err = query.free_time_for("dupont jean", "0000", day(24), day(24)).await.unwrap_err();
            assert!(matches!(err, QueryError::UnknownIdentity { ref identity } if identity == "0000"));
            assert_eq!(source.fetch_count(), 0);
        }

        #[tokio::test]
        async fn inverted_range_is_rejected() {
            let (_, query) = query(MemorySource::new());

            let err = query.free_time_for("dupont jean", "9311", day(28), day(24)).await.unwrap_err();
            assert!(matches!(err, QueryError::InvalidRange { .. }));
        }

        #[tokio::test]
        async fn unavailable_calendar_is_distinct_from_empty() {
            let (source, query) = query(
                MemorySource::new()
                    .with_empty_calendar("9311")
                    .with_empty_calendar("9312"),
            );
            source.fail_with("9312", ProviderErrorCode::EmptyPayload);

            let err = query.free_time_for("dupont jean", "9311", day(24), day(24)).await.unwrap_err();
            match err {
                QueryError::SourceUnavailable { identity, source } => {
                    assert_eq!(identity, "9312");
                    assert_eq!(source.code(), ProviderErrorCode::EmptyPayload);
                }
                other => panic!("expected SourceUnavailable, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn misconfigured_source_is_not_reported_unavailable() {
            let source = edtslots_providers::ErrorSource::new(
                "none",
                ProviderError::configuration("built without a timetable source"),
            );
            let query = AvailabilityQuery::new(Arc::new(source), groups(), locations());

            let err = query.free_time_for("dupont jean", "9311", day(24), day(24)).await.unwrap_err();
            match err {
                QueryError::SourceMisconfigured { identity, source } => {
                    assert_eq!(identity, "9311");
                    assert_eq!(source.code(), ProviderErrorCode::ConfigurationError);
                }
                other => panic!("expected SourceMisconfigured, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn repeated_queries_agree() {
            let (_, query) = query(
                MemorySource::new()
                    .with_calendar("9311", vec![course("c1", "9311", 25, (9, 0), (11, 0))])
                    .with_empty_calendar("9312"),
            );

            let first = query.free_time_for("dupont jean", "9311", day(24), day(28)).await.unwrap();
            let second = query.free_time_for("dupont jean", "9311", day(24), day(28)).await.unwrap();
            assert_eq!(first, second);
            assert_eq!(first.len(), 17);
        }
    }

    mod free_rooms {
        use super::*;

        #[tokio::test]
        async fn rooms_in_use_are_excluded() {
            let (_, query) = query(
                MemorySource::new()
                    .with_calendar(
                        "9311",
                        vec![course("c1", "9311", 24, (9, 0), (11, 0)).with_location("S10")],
                    )
                    .with_calendar(
                        "9312",
                        vec![course("c2", "9312", 24, (9, 0), (11, 0)).with_location("S12,Amphi X")],
                    ),
            );

            let free_slots = [slot(24, (9, 0), (11, 0))];
            let rooms = query.free_rooms_for(&free_slots, day(24), day(24)).await.unwrap();

            assert_eq!(rooms.len(), 1);
            assert_eq!(rooms[&slot(24, (9, 0), (11, 0))], vec!["S11".to_string()]);
        }

        #[tokio::test]
        async fn intervals_outside_free_slots_are_dropped() {
            let (_, query) = query(
                MemorySource::new()
                    .with_calendar(
                        "9311",
                        vec![
                            course("c1", "9311", 24, (7, 0), (8, 0)).with_location("S10"),
                            course("c2", "9311", 24, (13, 0), (15, 0)).with_location("S11"),
                        ],
                    )
                    .with_empty_calendar("9312"),
            );

            let free_slots = [slot(24, (7, 0), (9, 0))];
            let rooms = query.free_rooms_for(&free_slots, day(24), day(24)).await.unwrap();

            assert_eq!(rooms.len(), 1);
            assert_eq!(
                rooms[&slot(24, (7, 0), (8, 0))],
                vec!["S11".to_string(), "S12".to_string()]
            );
        }

        #[tokio::test]
        async fn move_course_combines_both_queries() {
            let (_, query) = query(
                MemorySource::new()
                    .with_calendar(
                        "9311",
                        vec![course("c1", "9311", 24, (9, 0), (11, 0)).with_location("S10")],
                    )
                    .with_calendar(
                        "9312",
                        vec![course("c2", "9312", 24, (13, 0), (15, 0)).with_location("S10")],
                    ),
            );

            let rooms = query
                .rooms_to_move_course("dupont jean", "9311", day(24), day(24))
                .await
                .unwrap();

            // 09-11 is taken by the group itself
            assert_eq!(rooms.len(), 1);
            assert_eq!(
                rooms[&slot(24, (13, 0), (15, 0))],
                vec!["S11".to_string(), "S12".to_string()]
            );
        }
    }

    mod events {
        use super::*;

        #[tokio::test]
        async fn group_events_drop_all_day_and_cancelled() {
            let holiday = RawEvent::new(
                "holiday",
                RawEventTime::Date(day(24)),
                RawEventTime::Date(day(25)),
                "9311",
            );
            let cancelled = course("c0", "9311", 24, (7, 0), (9, 0)).with_status("Cancelled");
            let kept = course("c1", "9311", 24, (9, 0), (11, 0));
            let (_, query) = query(
                MemorySource::new().with_calendar("9311", vec![holiday, cancelled, kept]),
            );

            let events = query.group_events("9311", day(24), day(24)).await.unwrap();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].id, "c1");
        }

        #[test]
        fn candidate_slots_follow_policy() {
            let (_, query) = query(MemorySource::new());
            assert_eq!(query.candidate_slots(day(24), day(30)).unwrap().len(), 18);
            assert!(matches!(
                query.candidate_slots(day(30), day(24)),
                Err(QueryError::InvalidRange { .. })
            ));
        }
    }
}
