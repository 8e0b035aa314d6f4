//! Command-line interface definition.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// edtslots - Free slots and free rooms from the IUT timetable
#[derive(Debug, Parser)]
#[command(name = "edtslots")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "EDTSLOTS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the candidate slots of a date range
    Slots {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Find slots where both a group and a professor are free
    Free {
        #[command(flatten)]
        course: CourseArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Find free rooms for the slots where a course could be moved
    Rooms {
        #[command(flatten)]
        course: CourseArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print (or export) the events of one group
    Events {
        /// Group resource id
        #[arg(long, short)]
        group: String,

        #[command(flatten)]
        range: RangeArgs,

        /// Write the events to an iCalendar file
        #[arg(long, value_name = "PATH")]
        ics: Option<PathBuf>,
    },

    /// List the monitored groups
    Groups,

    /// List the known rooms
    Locations,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// An inclusive range of days.
#[derive(Debug, Clone, Args)]
pub struct RangeArgs {
    /// First day (YYYY-MM-DD)
    #[arg(long)]
    pub from: NaiveDate,

    /// Last day (YYYY-MM-DD), defaults to the first day
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl RangeArgs {
    pub fn last(&self) -> NaiveDate {
        self.to.unwrap_or(self.from)
    }
}

/// The course to place: who teaches it, to whom, and when.
#[derive(Debug, Clone, Args)]
pub struct CourseArgs {
    /// Professor name as it appears in event descriptions
    #[arg(long, short)]
    pub professor: String,

    /// Group resource id
    #[arg(long, short)]
    pub group: String,

    #[command(flatten)]
    pub range: RangeArgs,
}

/// Output selection for query results.
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Also write the result to an iCalendar file
    #[arg(long, value_name = "PATH")]
    pub ics: Option<PathBuf>,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
