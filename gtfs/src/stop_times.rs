use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;

use crate::{StopID, Table, TimeOfDay, TripID};

#[derive(Clone, Debug, PartialEq)]
pub struct StopTime {
    pub stop_id: StopID,
    pub arrival_time: TimeOfDay,
    pub departure_time: TimeOfDay,
    pub stop_sequence: u32,
}

/// Stop times grouped per trip, each group sorted by stop_sequence. Trips are listed in the order
/// they first appear in the file, so anything built on top doesn't depend on map iteration order.
pub struct StopTimesByTrip {
    pub order: Vec<TripID>,
    pub per_trip: BTreeMap<TripID, Vec<StopTime>>,
}

impl StopTimesByTrip {
    pub fn iter(&self) -> impl Iterator<Item = (&TripID, &Vec<StopTime>)> {
        self.order
            .iter()
            .filter_map(|id| self.per_trip.get(id).map(|list| (id, list)))
    }

    pub fn len(&self) -> usize {
        self.per_trip.values().map(|list| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.per_trip.is_empty()
    }
}

/// Rows that can't be understood, like a missing stop_sequence or a line mangled by a stray
/// quote, are skipped and reported once at the end.
pub fn load(table: &Table) -> Result<StopTimesByTrip> {
    let mut order = Vec::new();
    let mut per_trip: BTreeMap<TripID, Vec<StopTime>> = BTreeMap::new();
    let mut skipped = Vec::new();
    for rec in table.deserialize() {
        let rec: Record = match rec {
            Ok(x) => x,
            Err(err) => {
                skipped.push(format!("{err:#}"));
                continue;
            }
        };
        let raw_sequence = rec.stop_sequence.unwrap_or_default();
        let stop_sequence = match raw_sequence.parse::<u32>() {
            Ok(x) => x,
            Err(_) => {
                skipped.push(format!(
                    "trip {} has stop_sequence {raw_sequence:?}",
                    rec.trip_id
                ));
                continue;
            }
        };
        let list = per_trip.entry(rec.trip_id.clone()).or_insert_with(|| {
            order.push(rec.trip_id.clone());
            Vec::new()
        });
        list.push(StopTime {
            stop_id: rec.stop_id,
            arrival_time: TimeOfDay::new(rec.arrival_time.unwrap_or_default()),
            departure_time: TimeOfDay::new(rec.departure_time.unwrap_or_default()),
            stop_sequence,
        });
    }

    if !skipped.is_empty() {
        warn!(
            "Skipped {} unreadable stop times: {:?}",
            skipped.len(),
            skipped
        );
    }

    // Sort by stop_sequence, in case the file isn't in order. The sort is stable.
    for list in per_trip.values_mut() {
        list.sort_by_key(|st| st.stop_sequence);
    }
    Ok(StopTimesByTrip { order, per_trip })
}

#[derive(Deserialize)]
struct Record {
    trip_id: TripID,
    arrival_time: Option<String>,
    departure_time: Option<String>,
    stop_id: StopID,
    stop_sequence: Option<String>,
}
