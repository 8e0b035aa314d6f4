//! Closed enumerations of monitored groups and physical locations.
//!
//! Both universes are loaded once (from built-in defaults or the
//! configuration file) and injected into the engine; they are never mutated
//! afterwards.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A monitored teaching group, identified by its timetable resource id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    /// Resource identifier on the timetable server.
    pub id: String,
    /// Human-readable label (promotion and group name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Group {
    /// Creates a group without a label.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
        }
    }

    /// Builder method to set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// The set of group identities the system accepts, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupUniverse {
    groups: Vec<Group>,
}

impl GroupUniverse {
    /// Builds a universe, dropping repeated ids (first declaration wins).
    pub fn new(groups: impl IntoIterator<Item = Group>) -> Self {
        let mut seen = HashSet::new();
        let groups = groups
            .into_iter()
            .filter(|g| seen.insert(g.id.clone()))
            .collect();
        Self { groups }
    }

    /// Checks whether `id` is a known group.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Looks up a group by id.
    pub fn get(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// All groups, in declaration order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// All group ids, in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The groups of the IUT department timetable.
    pub fn institutional() -> Self {
        const GROUPS: &[(&str, &str)] = &[
            ("12096", "S1 G1A"),
            ("12102", "S1 G1B"),
            ("12403", "S1 G2A"),
            ("12406", "S1 G2B"),
            ("12419", "S1 G3A"),
            ("12425", "S1 G3B"),
            ("12424", "S1 G4A"),
            ("12444", "S1 G4B"),
            ("12460", "S1 G5A"),
            ("12461", "S1 G5B"),
            ("51542", "S2 G1A"),
            ("51543", "S2 G1B"),
            ("51545", "S2 G2A"),
            ("51546", "S2 G2B"),
            ("51548", "S2 G3A"),
            ("51549", "S2 G3B"),
            ("51551", "S2 G4A"),
            ("51552", "S2 G4B"),
            ("51554", "S2 G5A"),
            ("51555", "S2 G5B"),
            ("9311", "S3 G1"),
            ("9312", "S3 G2"),
            ("9313", "S3 G3"),
            ("9314", "S3 G4"),
            ("9292", "S3 G6"),
            ("9315", "S4 G1"),
            ("9316", "S4 G2"),
            ("9317", "S4 G3"),
            ("9318", "S4 G4"),
            ("9293", "S4 G6A"),
            ("5484", "S4 G6B"),
            ("9272", "ASPE1"),
            ("18783", "ASPE2"),
            ("9319", "LP DEVOPS G1"),
            ("9320", "LP DEVOPS G2"),
            ("5700", "LP ESSIR"),
            ("9321", "LP SID"),
        ];
        Self::new(
            GROUPS
                .iter()
                .map(|(id, label)| Group::new(*id).with_label(*label)),
        )
    }
}

/// The set of valid location labels, in declaration order.
///
/// Declaration order is the order in which free rooms are reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationUniverse {
    labels: Vec<String>,
}

impl LocationUniverse {
    /// Builds a universe, dropping repeated labels (first declaration wins).
    ///
    /// Room pools are commonly listed under several categories; they are
    /// kept once, at their first position.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let labels = labels
            .into_iter()
            .map(Into::into)
            .filter(|l: &String| seen.insert(l.clone()))
            .collect();
        Self { labels }
    }

    /// Checks whether `label` is a known location.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Returns the universe's own copy of `label`, if known.
    pub fn canonical(&self, label: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|l| l.as_str() == label)
            .map(String::as_str)
    }

    /// All labels, in declaration order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Splits a comma-separated location field and keeps the known labels.
    pub fn parse_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        field
            .split(',')
            .map(str::trim)
            .filter_map(|piece| self.canonical(piece))
    }

    /// The rooms of the IUT building.
    pub fn institutional() -> Self {
        Self::new([
            // Lecture halls
            "Amphi1",
            "Amphi2",
            // Tutorial rooms
            "S10",
            "S11",
            "S12",
            "S15",
            "S26",
            // Lab rooms
            "S18 - TP Réseau",
            "S21",
            "S23 - TP Réseau",
            // Computer rooms
            "S01",
            "S03",
            "S13",
            "S14",
            "S16",
            "S17",
            "S22",
            "S24",
            // GEA
            "026-Langues",
            "028",
            "040",
            // Meeting rooms
            "S04 - Petite salle de réunion",
            "S25-Salle de réunion",
            // GC
            "H20",
            "H21",
            // Shared lab pool
            "S18 - TP Réseau",
            "S21",
            "S23 - TP Réseau",
        ])
    }
}
