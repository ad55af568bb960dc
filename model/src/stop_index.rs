use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gtfs::{Stop, StopID, StopIdSet};

/// Strips Unicode variation selectors. Feeds sometimes spell the same stop name with and without
/// them, and they're invisible anyway.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(*c, '\u{FE00}'..='\u{FE0F}' | '\u{E0100}'..='\u{E01EF}'))
        .collect()
}

/// One entry per distinct normalized stop name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StopName {
    /// The first stop seen with this name
    pub id: StopID,
    pub name: String,
    pub display_name: String,
}

/// A chosen departure or destination. One place may be represented by several stop IDs, and
/// matching has to consider all of them.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub primary_id: StopID,
    pub all_ids: StopIdSet,
    pub display_name: String,
}

/// The only place that maps between stop IDs and display names.
pub struct StopIndex {
    names: Vec<StopName>,
    // Keyed by display name. IDs in feed order, without repeats.
    ids_per_name: BTreeMap<String, Vec<StopID>>,
    // First stop record with each ID
    stop_per_id: BTreeMap<StopID, usize>,
}

impl StopIndex {
    pub fn new(stops: &[Stop]) -> Self {
        let mut index = Self {
            names: Vec::new(),
            ids_per_name: BTreeMap::new(),
            stop_per_id: BTreeMap::new(),
        };
        for (idx, stop) in stops.iter().enumerate() {
            index.stop_per_id.entry(stop.id.clone()).or_insert(idx);

            let display_name = normalize(&stop.name);
            let ids = index
                .ids_per_name
                .entry(display_name.clone())
                .or_insert_with(Vec::new);
            if ids.is_empty() {
                index.names.push(StopName {
                    id: stop.id.clone(),
                    name: stop.name.clone(),
                    display_name,
                });
            }
            if !ids.contains(&stop.id) {
                ids.push(stop.id.clone());
            }
        }
        index
    }

    /// Every distinct place, in feed order
    pub fn all_stop_names(&self) -> &[StopName] {
        &self.names
    }

    /// Autocomplete candidates whose display name contains the query. An empty query matches
    /// everything.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&StopName> {
        let query = normalize(query.trim());
        self.names
            .iter()
            .filter(|x| x.display_name.contains(&query))
            .take(limit)
            .collect()
    }

    /// All stop IDs whose name normalizes to this. Empty if nothing matches.
    pub fn resolve_ids(&self, display_name: &str) -> StopIdSet {
        self.ids_per_name
            .get(&normalize(display_name))
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn select(&self, display_name: &str) -> Option<Selection> {
        let display_name = normalize(display_name);
        let primary_id = self.ids_per_name.get(&display_name)?.first()?.clone();
        Some(Selection {
            primary_id,
            all_ids: self.resolve_ids(&display_name),
            display_name,
        })
    }

    /// The position in the stops artifact of the first record with this ID
    pub fn position(&self, id: &StopID) -> Option<usize> {
        self.stop_per_id.get(id).copied()
    }
}
