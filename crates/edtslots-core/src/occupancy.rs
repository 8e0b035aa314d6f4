//! Room occupancy aggregation.
//!
//! [`OccupancyIndex`] records, for every interval in which at least one event
//! took place, the known locations in use. [`free_locations`] derives the
//! complement against the [`LocationUniverse`].

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::slot::{BusyInterval, TimeSlot};
use crate::universe::LocationUniverse;

/// Free locations per interval, ordered by interval.
///
/// Each list follows the universe's declaration order.
pub type FreeLocations = BTreeMap<TimeSlot, Vec<String>>;

/// Occupied locations keyed by event interval.
///
/// Entries only ever grow; merging two indexes is a per-key union.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyIndex {
    entries: BTreeMap<TimeSlot, BTreeSet<String>>,
}

impl OccupancyIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event: its interval becomes a key and its known locations
    /// are added to that key.
    ///
    /// Returns `false` (and records nothing) for empty or inverted intervals.
    pub fn record(&mut self, interval: &BusyInterval, universe: &LocationUniverse) -> bool {
        let Some(key) = interval.as_slot() else {
            debug!(
                start = %interval.start,
                end = %interval.end,
                "Skipping event with empty interval"
            );
            return false;
        };

        let occupied = self.entries.entry(key).or_default();
        for declared in &interval.locations {
            for label in universe.parse_field(declared) {
                occupied.insert(label.to_string());
            }
        }
        true
    }

    /// Unions `other` into this index.
    pub fn merge(&mut self, other: OccupancyIndex) {
        for (key, locations) in other.entries {
            self.entries.entry(key).or_default().extend(locations);
        }
    }

    /// Occupied locations for an interval, if any event used it.
    pub fn occupied(&self, key: &TimeSlot) -> Option<&BTreeSet<String>> {
        self.entries.get(key)
    }

    /// Iterates over intervals and their occupied locations, in interval order.
    pub fn iter(&self) -> impl Iterator<Item = (&TimeSlot, &BTreeSet<String>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the occupancy index of all events across all groups.
pub fn aggregate_occupancy<'a, I>(events: I, universe: &LocationUniverse) -> OccupancyIndex
where
    I: IntoIterator<Item = &'a BusyInterval>,
{
    let mut index = OccupancyIndex::new();
    let mut recorded = 0usize;
    for event in events {
        if index.record(event, universe) {
            recorded += 1;
        }
    }
    debug!(
        events = recorded,
        intervals = index.len(),
        "Aggregated room occupancy"
    );
    index
}

/// Computes, for every interval of `index`, the locations not in use.
pub fn free_locations(index: &OccupancyIndex, universe: &LocationUniverse) -> FreeLocations {
    index
        .iter()
        .map(|(key, occupied)| {
            let free = universe
                .labels()
                .iter()
                .filter(|label| !occupied.contains(label.as_str()))
                .cloned()
                .collect();
            (*key, free)
        })
        .collect()
}

/// Keeps only the intervals lying within (or equal to) one of `slots`.
pub fn restrict_to_slots(free: FreeLocations, slots: &[TimeSlot]) -> FreeLocations {
    free.into_iter()
        .filter(|(key, _)| slots.iter().any(|slot| slot.contains(key)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 1, 24)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn slot(from: (u32, u32), to: (u32, u32)) -> TimeSlot {
        TimeSlot::new(at(from.0, from.1), at(to.0, to.1)).unwrap()
    }

    fn event(from: (u32, u32), to: (u32, u32), locations: &[&str]) -> BusyInterval {
        BusyInterval::new(at(from.0, from.1), at(to.0, to.1)).with_locations(locations.iter().copied())
    }

    fn universe() -> LocationUniverse {
        LocationUniverse::new(["Amphi1", "S10", "S11", "S12", "S21", "S10"])
    }

    #[test]
    fn aggregates_across_groups_without_duplicates() {
        let group_a = vec![event((9, 0), (11, 0), &["S10,S11"])];
        let group_b = vec![
            event((9, 0), (11, 0), &["S11"]),
            event((13, 0), (15, 0), &["Amphi1"]),
        ];

        let index = aggregate_occupancy(group_a.iter().chain(&group_b), &universe());
        assert_eq!(index.len(), 2);

        let occupied: Vec<_> = index
            .occupied(&slot((9, 0), (11, 0)))
            .unwrap()
            .iter()
            .cloned()
            .collect();
        assert_eq!(occupied, vec!["S10".to_string(), "S11".to_string()]);
    }

    #[test]
    fn unknown_labels_are_never_recorded() {
        let events = vec![event((9, 0), (11, 0), &["Préfa 1,S99"])];
        let index = aggregate_occupancy(&events, &universe());

        // The interval exists but nothing known is occupied
        let occupied = index.occupied(&slot((9, 0), (11, 0))).unwrap();
        assert!(occupied.is_empty());

        let free = free_locations(&index, &universe());
        assert_eq!(free[&slot((9, 0), (11, 0))].len(), universe().len());
    }

    #[test]
    fn inverted_events_are_skipped() {
        let events = vec![event((11, 0), (9, 0), &["S10"])];
        assert!(aggregate_occupancy(&events, &universe()).is_empty());
    }

    #[test]
    fn free_locations_follow_universe_order() {
        let events = vec![
            event((9, 0), (11, 0), &["S21"]),
            event((9, 0), (11, 0), &["Amphi1"]),
        ];
        let index = aggregate_occupancy(&events, &universe());
        let free = free_locations(&index, &universe());
        assert_eq!(
            free[&slot((9, 0), (11, 0))],
            vec!["S10".to_string(), "S11".to_string(), "S12".to_string()]
        );
    }

    #[test]
    fn occupied_and_free_partition_the_universe() {
        let universe = universe();
        let events = vec![
            event((7, 0), (9, 0), &["S10,S12"]),
            event((7, 0), (9, 0), &["S12,Amphi1"]),
            event((9, 0), (11, 0), &[]),
            event((13, 0), (15, 0), &["S21", "S11"]),
        ];
        let index = aggregate_occupancy(&events, &universe);
        let free = free_locations(&index, &universe);

        for (key, free_list) in &free {
            let occupied = index.occupied(key).unwrap();
            let mut seen = BTreeSet::new();
            for label in free_list {
                assert!(universe.contains(label));
                assert!(!occupied.contains(label));
                assert!(seen.insert(label.clone()), "duplicate {label}");
            }
            assert_eq!(seen.len() + occupied.len(), universe.len());
        }
    }

    #[test]
    fn merge_is_a_union() {
        let universe = universe();
        let mut left = aggregate_occupancy(&[event((9, 0), (11, 0), &["S10"])], &universe);
        let right = aggregate_occupancy(
            &[
                event((9, 0), (11, 0), &["S11"]),
                event((13, 0), (15, 0), &["S12"]),
            ],
            &universe,
        );
        left.merge(right);

        assert_eq!(left.len(), 2);
        assert_eq!(left.occupied(&slot((9, 0), (11, 0))).unwrap().len(), 2);
    }

    #[test]
    fn restrict_keeps_contained_and_equal_intervals() {
        let universe = universe();
        let events = vec![
            event((7, 0), (9, 0), &["S10"]),
            event((7, 30), (8, 30), &["S11"]),
            event((8, 0), (10, 0), &["S12"]),
            event((13, 0), (15, 0), &["S21"]),
        ];
        let free = free_locations(&aggregate_occupancy(&events, &universe), &universe);
        let kept = restrict_to_slots(free, &[slot((7, 0), (9, 0))]);

        let keys: Vec<_> = kept.keys().copied().collect();
        assert_eq!(keys, vec![slot((7, 0), (9, 0)), slot((7, 30), (8, 30))]);
    }
}
