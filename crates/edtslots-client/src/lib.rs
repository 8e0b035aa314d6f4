//! CLI, availability queries, output rendering, calendar export
//!
//! This crate provides the `edtslots` command-line interface.

pub mod calendar;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod query;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
pub use query::{AvailabilityQuery, QueryError};
