//! ADE timetable source implementation.
//!
//! This module provides an [`AdeSource`] that downloads the anonymous
//! iCalendar export of a student group from an ADE Campus server.
//!
//! # Example
//!
//! ```ignore
//! use edtslots_core::GroupUniverse;
//! use edtslots_providers::ade::{AdeConfig, AdeSource};
//!
//! let config = AdeConfig::new(AdeConfig::DEFAULT_URL)?.with_project_id(1);
//! let source = AdeSource::new(config, GroupUniverse::institutional())?;
//! let events = source.fetch_events(FetchRequest::new("9311", range)).await?;
//! ```

mod client;
mod config;
mod ics;
mod provider;

pub use config::AdeConfig;
pub use ics::parse_ics_content;
pub use provider::AdeSource;
