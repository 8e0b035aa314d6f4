//! Output rendering for query results.
//!
//! Terminal output is one line per interval; JSON output is a structured
//! document for scripts.

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use edtslots_core::{FreeLocations, TimeSlot};
use edtslots_providers::RawEvent;
use serde::{Deserialize, Serialize};

/// Text shown when a query found nothing.
pub const NO_FREE_SLOT_TEXT: &str = "No free slot";

/// JSON document listing slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSlots {
    pub slots: Vec<JsonSlot>,
    /// Number of slots returned.
    pub count: usize,
}

/// One slot, with local ISO 8601 times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSlot {
    pub start: String,
    pub end: String,
}

/// JSON document listing free rooms per interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRooms {
    pub intervals: Vec<JsonRoomInterval>,
    /// Number of intervals returned.
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRoomInterval {
    pub start: String,
    pub end: String,
    /// Free rooms, in configured order.
    pub rooms: Vec<String>,
}

fn iso(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

impl From<&TimeSlot> for JsonSlot {
    fn from(slot: &TimeSlot) -> Self {
        Self {
            start: iso(slot.start()),
            end: iso(slot.end()),
        }
    }
}

pub fn slots_json(slots: &[TimeSlot]) -> JsonSlots {
    JsonSlots {
        slots: slots.iter().map(JsonSlot::from).collect(),
        count: slots.len(),
    }
}

pub fn rooms_json(rooms: &FreeLocations) -> JsonRooms {
    JsonRooms {
        intervals: rooms
            .iter()
            .map(|(slot, free)| JsonRoomInterval {
                start: iso(slot.start()),
                end: iso(slot.end()),
                rooms: free.clone(),
            })
            .collect(),
        count: rooms.len(),
    }
}

/// One line per slot.
pub fn format_slots_tty(slots: &[TimeSlot]) -> String {
    if slots.is_empty() {
        return NO_FREE_SLOT_TEXT.to_string();
    }
    slots
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per interval followed by its free rooms.
pub fn format_rooms_tty(rooms: &FreeLocations) -> String {
    if rooms.is_empty() {
        return NO_FREE_SLOT_TEXT.to_string();
    }
    rooms
        .iter()
        .map(|(slot, free)| {
            if free.is_empty() {
                format!("{}  (no free room)", slot)
            } else {
                format!("{}  {}", slot, free.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per event, in institution time.
pub fn format_events_tty(events: &[RawEvent], timezone: &Tz) -> String {
    if events.is_empty() {
        return "No event".to_string();
    }
    events
        .iter()
        .map(|event| {
            let when = event
                .to_busy_interval(timezone)
                .and_then(|interval| interval.as_slot())
                .map(|slot| slot.to_string())
                .unwrap_or_else(|| "all day".to_string());
            match event.location {
                Some(ref location) if !location.trim().is_empty() => {
                    format!("{}  {} @ {}", when, event.effective_title(), location)
                }
                _ => format!("{}  {}", when, event.effective_title()),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
