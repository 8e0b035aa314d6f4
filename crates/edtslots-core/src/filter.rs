//! Removal of occupied candidate slots.
//!
//! A slot is removed by a busy interval when it lies inside the interval, or
//! shares its start, or shares its end. A slot that only partially overlaps
//! an interval, without a shared boundary, is kept. This is the acceptance
//! rule the timetable office relies on and must not be widened into a
//! generic intersection test.

use tracing::{debug, trace};

use crate::slot::{BusyInterval, TimeSlot};

/// Returns `true` if `interval` removes `slot`.
pub fn is_removed_by(slot: &TimeSlot, interval: &BusyInterval) -> bool {
    (slot.start() >= interval.start && slot.end() <= interval.end)
        || slot.start() == interval.start
        || slot.end() == interval.end
}

/// Removes every slot occupied by an interval of any of `interval_sets`.
///
/// The relative order of the remaining slots is preserved. With no interval
/// sets (or only empty ones) the input is returned unchanged.
pub fn remove_occupied(slots: &[TimeSlot], interval_sets: &[&[BusyInterval]]) -> Vec<TimeSlot> {
    let free: Vec<TimeSlot> = slots
        .iter()
        .filter(|slot| {
            let hit = interval_sets
                .iter()
                .flat_map(|set| set.iter())
                .find(|interval| is_removed_by(slot, interval));
            if let Some(interval) = hit {
                trace!(
                    slot = %slot,
                    busy_start = %interval.start,
                    busy_end = %interval.end,
                    "Slot occupied"
                );
            }
            hit.is_none()
        })
        .copied()
        .collect();

    debug!(
        candidates = slots.len(),
        free = free.len(),
        sets = interval_sets.len(),
        "Removed occupied slots"
    );

    free
}
