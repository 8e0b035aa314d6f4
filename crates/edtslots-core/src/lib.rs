//! Core types: time slots, weekly policy, slot filtering, room occupancy
//!
//! Everything in this crate is pure, synchronous computation over values
//! supplied by the caller. Fetching calendars lives in `edtslots-providers`.

pub mod filter;
pub mod occupancy;
pub mod policy;
pub mod slot;
pub mod tracing;
pub mod universe;

pub use filter::{is_removed_by, remove_occupied};
pub use occupancy::{
    aggregate_occupancy, free_locations, restrict_to_slots, FreeLocations, OccupancyIndex,
};
pub use policy::{generate_slots, Break, DayRule, PolicyError, WeeklyPolicy};
pub use slot::{BusyInterval, DateRange, TimeSlot};
pub use crate::tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
pub use universe::{Group, GroupUniverse, LocationUniverse};
