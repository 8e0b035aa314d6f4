//! ADE timetable source implementation.

use edtslots_core::{DateRange, GroupUniverse};
use tracing::{debug, info};
use url::Url;

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::RawEvent;
use crate::source::{BoxFuture, EventSource, FetchRequest};

use super::client::AdeClient;
use super::config::AdeConfig;
use super::ics::parse_ics_content;

/// ADE timetable source.
///
/// Downloads the anonymous iCalendar export of one student group per fetch.
/// Only groups of the configured universe are ever requested.
#[derive(Debug, Clone)]
pub struct AdeSource {
    client: AdeClient,
    groups: GroupUniverse,
}

impl AdeSource {
    /// Creates a new ADE source serving the given groups.
    pub fn new(config: AdeConfig, groups: GroupUniverse) -> ProviderResult<Self> {
        Ok(Self {
            client: AdeClient::new(config)?,
            groups,
        })
    }

    /// Builds the export URL of `group` over `range`.
    pub fn calendar_url(&self, group: &str, range: &DateRange) -> Url {
        let config = self.client.config();
        let mut url = config.url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("resources", group)
            .append_pair("projectId", &config.project_id.to_string())
            .append_pair("calType", "ical")
            .append_pair("firstDate", &range.first.format("%Y-%m-%d").to_string())
            .append_pair("lastDate", &range.last.format("%Y-%m-%d").to_string());
        url
    }

    async fn fetch_calendar(&self, request: FetchRequest) -> ProviderResult<Vec<RawEvent>> {
        if !self.groups.contains(&request.identity) {
            return Err(ProviderError::unknown_identity(&request.identity));
        }

        let url = self.calendar_url(&request.identity, &request.range);
        debug!(group = %request.identity, range = %request.range, "Fetching ADE calendar");

        let body = self.client.get(&url).await?;
        if body.trim().is_empty() {
            return Err(ProviderError::empty_payload(format!(
                "calendar '{}' returned an empty body",
                request.identity
            )));
        }

        let events: Vec<_> = parse_ics_content(&body, &request.identity)?
            .into_iter()
            .filter(|e| !e.is_cancelled())
            .collect();

        info!(
            group = %request.identity,
            count = events.len(),
            "Fetched and parsed events"
        );

        Ok(events)
    }
}

impl EventSource for AdeSource {
    fn name(&self) -> &str {
        "ade"
    }

    fn fetch_events(&self, request: FetchRequest) -> BoxFuture<'_, ProviderResult<Vec<RawEvent>>> {
        Box::pin(async move {
            self.fetch_calendar(request)
                .await
                .map_err(|e| e.with_provider("ade"))
        })
    }
}
