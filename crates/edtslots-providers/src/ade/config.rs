//! ADE source configuration.

use std::time::Duration;
use url::Url;

/// Configuration for the ADE timetable source.
#[derive(Debug, Clone)]
pub struct AdeConfig {
    /// Anonymous export endpoint (`.../anonymous_cal.jsp`).
    pub url: Url,

    /// The ADE project the group resources belong to.
    pub project_id: u32,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl AdeConfig {
    /// The Lyon 1 anonymous calendar export.
    pub const DEFAULT_URL: &'static str =
        "https://adelb.univ-lyon1.fr/jsp/custom/modules/plannings/anonymous_cal.jsp";

    pub const DEFAULT_PROJECT_ID: u32 = 1;

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a new ADE configuration with the given export URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(url.as_ref())?;
        Ok(Self {
            url: parsed,
            project_id: Self::DEFAULT_PROJECT_ID,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("edtslots/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Sets the ADE project id.
    pub fn with_project_id(mut self, project_id: u32) -> Self {
        self.project_id = project_id;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the base URL as a string.
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }
}
