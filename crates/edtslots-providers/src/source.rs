//! EventSource trait definition.
//!
//! An [`EventSource`] turns a calendar identity (a group code) and a date
//! range into the events of that calendar. The query layer only depends on
//! this trait, so the timetable server can be swapped for an in-memory
//! source in tests.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use edtslots_core::DateRange;

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::raw_event::RawEvent;

/// A boxed future for async trait methods.
///
/// Keeps [`EventSource`] object-safe so queries can hold an
/// `Arc<dyn EventSource>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What to fetch: one calendar over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub identity: String,
    pub range: DateRange,
}

impl FetchRequest {
    pub fn new(identity: impl Into<String>, range: DateRange) -> Self {
        Self {
            identity: identity.into(),
            range,
        }
    }
}

/// A provider of timetable calendars.
///
/// # Implementation Notes
///
/// - A calendar with no events is `Ok(vec![])`, never an error
/// - A body that is missing or unparsable is an error whose code is
///   source-unavailable
/// - Identities outside the configured enumeration fail with
///   [`ProviderErrorCode::UnknownIdentity`] before any I/O
pub trait EventSource: Send + Sync {
    /// Returns the name of this source (e.g., "ade", "memory").
    fn name(&self) -> &str;

    /// Fetches the events of one calendar.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on unknown identities, network errors, empty
    /// or unparsable payloads.
    fn fetch_events(&self, request: FetchRequest) -> BoxFuture<'_, ProviderResult<Vec<RawEvent>>>;
}

/// A source serving canned calendars from memory.
///
/// Identities that were never registered are unknown. Individual identities
/// can be made to fail, which is how tests tell an unavailable calendar
/// apart from an empty one.
#[derive(Debug, Default)]
pub struct MemorySource {
    calendars: HashMap<String, Vec<RawEvent>>,
    failures: Mutex<HashMap<String, ProviderErrorCode>>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a calendar with its events.
    pub fn with_calendar(mut self, identity: impl Into<String>, events: Vec<RawEvent>) -> Self {
        self.calendars.insert(identity.into(), events);
        self
    }

    /// Registers an empty calendar.
    pub fn with_empty_calendar(self, identity: impl Into<String>) -> Self {
        self.with_calendar(identity, Vec::new())
    }

    /// Makes fetches of `identity` fail with `code` from now on.
    pub fn fail_with(&self, identity: impl Into<String>, code: ProviderErrorCode) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(identity.into(), code);
        }
    }

    /// Number of fetches served so far, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn lookup(&self, request: &FetchRequest) -> ProviderResult<Vec<RawEvent>> {
        let failure = self
            .failures
            .lock()
            .map_err(|_| ProviderError::internal("failure table poisoned"))?
            .get(&request.identity)
            .copied();
        if let Some(code) = failure {
            return Err(ProviderError::new(
                code,
                format!("calendar '{}' is unavailable", request.identity),
            ));
        }

        let events = self
            .calendars
            .get(&request.identity)
            .ok_or_else(|| ProviderError::unknown_identity(&request.identity))?;

        Ok(events
            .iter()
            .filter(|event| match event.start.to_local(&chrono_tz::UTC) {
                Some(start) => request.range.contains(start.date()),
                None => true,
            })
            .cloned()
            .collect())
    }
}

impl EventSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch_events(&self, request: FetchRequest) -> BoxFuture<'_, ProviderResult<Vec<RawEvent>>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let result = self.lookup(&request).map_err(|e| e.with_provider("memory"));
        Box::pin(async move { result })
    }
}

/// A source that always returns an error.
///
/// Used as a stand-in when the configured source fails to initialize.
#[derive(Debug)]
pub struct ErrorSource {
    name: String,
    error: ProviderError,
}

impl ErrorSource {
    pub fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

impl EventSource for ErrorSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_events(&self, _request: FetchRequest) -> BoxFuture<'_, ProviderResult<Vec<RawEvent>>> {
        // ProviderError holds a boxed source and cannot be cloned
        let error =
            ProviderError::new(self.error.code(), self.error.message()).with_provider(&self.name);
        Box::pin(async move { Err(error) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_event::RawEventTime;
    use chrono::NaiveDate;

    fn range(first: (i32, u32, u32), last: (i32, u32, u32)) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(first.0, first.1, first.2).unwrap(),
            NaiveDate::from_ymd_opt(last.0, last.1, last.2).unwrap(),
        )
        .unwrap()
    }

    fn event_on(id: &str, day: u32) -> RawEvent {
        let start = NaiveDate::from_ymd_opt(2022, 1, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        RawEvent::new(
            id,
            RawEventTime::Floating(start),
            RawEventTime::Floating(start + chrono::Duration::hours(2)),
            "9311",
        )
    }

    #[tokio::test]
    async fn memory_source_serves_registered_calendar() {
        let source = MemorySource::new()
            .with_calendar("9311", vec![event_on("a", 24), event_on("b", 31)])
            .with_empty_calendar("9312");

        let events = source
            .fetch_events(FetchRequest::new("9311", range((2022, 1, 24), (2022, 1, 28))))
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "a");

        let empty = source
            .fetch_events(FetchRequest::new("9312", range((2022, 1, 24), (2022, 1, 28))))
            .await
            .unwrap();
        assert!(empty.is_empty());
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn memory_source_unknown_identity() {
        let source = MemorySource::new();
        let err = source
            .fetch_events(FetchRequest::new("0000", range((2022, 1, 24), (2022, 1, 24))))
            .await
            .unwrap_err();
        assert!(err.is_unknown_identity());
        assert_eq!(err.provider(), Some("memory"));
    }

    #[tokio::test]
    async fn memory_source_injected_failure() {
        let source = MemorySource::new().with_empty_calendar("9311");
        source.fail_with("9311", ProviderErrorCode::EmptyPayload);

        let err = source
            .fetch_events(FetchRequest::new("9311", range((2022, 1, 24), (2022, 1, 24))))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::EmptyPayload);
        assert!(err.is_source_unavailable());
    }

    #[tokio::test]
    async fn error_source_returns_error() {
        let source = ErrorSource::new("ade", ProviderError::configuration("not configured"));
        assert_eq!(source.name(), "ade");

        let err = source
            .fetch_events(FetchRequest::new("9311", range((2022, 1, 24), (2022, 1, 24))))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert_eq!(err.provider(), Some("ade"));
    }
}
