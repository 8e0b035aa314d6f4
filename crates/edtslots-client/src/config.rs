//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/edtslots/config.toml` by default. Every section is optional;
//! a missing section falls back to the IUT deployment defaults.
//!
//! ```toml
//! [source]
//! url = "https://adelb.univ-lyon1.fr/jsp/custom/modules/plannings/anonymous_cal.jsp"
//! project_id = 1
//!
//! [institution]
//! timezone = "Europe/Paris"
//!
//! [query]
//! max_concurrent_fetches = 4
//!
//! [[groups.members]]
//! id = "9311"
//! label = "S3 G1"
//!
//! [locations]
//! rooms = ["S10", "S11"]
//! ```

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use edtslots_core::{Group, GroupUniverse, LocationUniverse, WeeklyPolicy};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for the edtslots client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Timetable server settings.
    pub source: SourceSettings,

    /// Institution-wide settings.
    pub institution: InstitutionSettings,

    /// Query execution settings.
    pub query: QuerySettings,

    /// Monitored groups.
    pub groups: GroupSettings,

    /// Known rooms.
    pub locations: LocationSettings,

    /// Weekly business hours.
    pub policy: WeeklyPolicy,
}

/// Timetable server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Anonymous iCalendar export endpoint.
    pub url: String,

    /// ADE project id.
    pub project_id: u32,

    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            url: "https://adelb.univ-lyon1.fr/jsp/custom/modules/plannings/anonymous_cal.jsp"
                .to_string(),
            project_id: 1,
            timeout: 30,
        }
    }
}

/// Institution-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstitutionSettings {
    /// IANA timezone all wall-clock times are expressed in.
    pub timezone: Tz,
}

impl Default for InstitutionSettings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Europe::Paris,
        }
    }
}

/// Query execution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// How many group calendars are downloaded at the same time.
    pub max_concurrent_fetches: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 4,
        }
    }
}

/// Monitored groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSettings {
    pub members: Vec<Group>,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            members: GroupUniverse::institutional().groups().to_vec(),
        }
    }
}

/// Known rooms, in reporting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationSettings {
    pub rooms: Vec<String>,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            rooms: LocationUniverse::institutional().labels().to_vec(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| ClientError::Config(format!("failed to parse config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("edtslots")
    }

    /// Checks the settings that deserialization alone cannot catch.
    pub fn validate(&self) -> ClientResult<()> {
        self.policy
            .validate()
            .map_err(|e| ClientError::Config(format!("invalid policy: {}", e)))?;

        if self.groups.members.is_empty() {
            return Err(ClientError::Config(
                "[groups] must list at least one group".to_string(),
            ));
        }
        if self.locations.rooms.is_empty() {
            return Err(ClientError::Config(
                "[locations] must list at least one room".to_string(),
            ));
        }
        if self.query.max_concurrent_fetches == 0 {
            return Err(ClientError::Config(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        if self.source.timeout == 0 {
            return Err(ClientError::Config(
                "source timeout must be at least 1 second".to_string(),
            ));
        }
        url::Url::parse(&self.source.url)
            .map_err(|e| ClientError::Config(format!("invalid source url: {}", e)))?;

        Ok(())
    }

    pub fn group_universe(&self) -> GroupUniverse {
        GroupUniverse::new(self.groups.members.iter().cloned())
    }

    pub fn location_universe(&self) -> LocationUniverse {
        LocationUniverse::new(self.locations.rooms.iter().cloned())
    }

    pub fn timezone(&self) -> Tz {
        self.institution.timezone
    }

    /// Converts the `[source]` section to the ADE source configuration.
    #[cfg(feature = "ade")]
    pub fn ade_config(&self) -> ClientResult<edtslots_providers::ade::AdeConfig> {
        use edtslots_providers::ade::AdeConfig;
        use std::time::Duration;

        let config = AdeConfig::new(&self.source.url)
            .map_err(|e| ClientError::Config(format!("invalid source url: {}", e)))?;
        Ok(config
            .with_project_id(self.source.project_id)
            .with_timeout(Duration::from_secs(self.source.timeout)))
    }
}
