//! EventSource trait and implementations.
//!
//! This crate provides the abstraction layer for timetable backends:
//!
//! - [`EventSource`] - The trait every calendar backend implements
//! - [`RawEvent`] - Source-agnostic raw event data
//! - [`ProviderError`] - Error types for source operations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐
//! │  ADE export     │    │  canned events  │
//! └────────┬────────┘    └────────┬────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌─────────────────┐    ┌─────────────────┐
//! │   AdeSource     │    │  MemorySource   │
//! └────────┬────────┘    └────────┬────────┘
//!          │                      │
//!          │     EventSource      │
//!          └──────────┬───────────┘
//!                     │
//!                     ▼
//!              ┌─────────────┐
//!              │  RawEvent   │
//!              └──────┬──────┘
//!                     │
//!                     ▼ to_busy_interval()
//!              ┌──────────────────┐
//!              │  BusyInterval    │
//!              └──────────────────┘
//! ```

#[cfg(feature = "ade")]
pub mod ade;
pub mod error;
pub mod raw_event;
pub mod source;

// Re-export main types at crate root
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use raw_event::{RawEvent, RawEventTime};
pub use source::{BoxFuture, ErrorSource, EventSource, FetchRequest, MemorySource};
