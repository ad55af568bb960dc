use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    DirectionID, RouteDirectionKey, RouteID, ServiceType, StopID, StopIdSet, TimeOfDay, GTFS,
};

/// Everything the query side needs, keyed by route direction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timetable {
    pub directions: BTreeMap<RouteDirectionKey, RouteDirection>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDirection {
    pub route_id: RouteID,
    pub direction_id: DirectionID,
    pub route_name: String,
    pub route_long_name: String,
    pub headsign: String,
    /// The order of the first trip seen for this direction. Later trips may skip stops or visit
    /// extra ones; look up their times by stop ID, not by position.
    pub stops: Vec<StopID>,
    /// Sorted by the departure time at each trip's first stop
    pub trips: Vec<TimetableTrip>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableTrip {
    pub service_type: ServiceType,
    pub times: Vec<StopVisit>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopVisit {
    pub stop_id: StopID,
    pub arr: TimeOfDay,
    pub dep: TimeOfDay,
}

impl Timetable {
    pub fn build(gtfs: &GTFS) -> Self {
        let mut timetable = Self::default();
        let mut unknown_trips = BTreeSet::new();
        let mut unknown_routes = BTreeSet::new();
        let mut unknown_stops = BTreeSet::new();

        for (trip_id, stop_times) in gtfs.stop_times.iter() {
            let trip = match gtfs.trips.get(trip_id) {
                Some(x) => x,
                None => {
                    unknown_trips.insert(trip_id.clone());
                    continue;
                }
            };
            let route = match gtfs.routes.get(&trip.route_id) {
                Some(x) => x,
                None => {
                    unknown_routes.insert(trip.route_id.clone());
                    continue;
                }
            };

            let times: Vec<StopVisit> = stop_times
                .iter()
                .filter(|st| {
                    if gtfs.stop_ids.contains(&st.stop_id) {
                        true
                    } else {
                        unknown_stops.insert(st.stop_id.clone());
                        false
                    }
                })
                .map(|st| StopVisit {
                    stop_id: st.stop_id.clone(),
                    arr: st.arrival_time.clone(),
                    dep: st.departure_time.clone(),
                })
                .collect();

            let key = RouteDirectionKey::new(&trip.route_id, &trip.direction_id);
            let direction = timetable
                .directions
                .entry(key)
                .or_insert_with(|| RouteDirection {
                    route_id: trip.route_id.clone(),
                    direction_id: trip.direction_id.clone(),
                    route_name: route.describe(),
                    route_long_name: route.long_name.clone().unwrap_or_default(),
                    headsign: trip.headsign.clone(),
                    stops: times.iter().map(|t| t.stop_id.clone()).collect(),
                    trips: Vec::new(),
                });
            direction.trips.push(TimetableTrip {
                service_type: gtfs.calendar.classify(&trip.service_id),
                times,
            });
        }

        for direction in timetable.directions.values_mut() {
            // Stable, so trips leaving at the same time keep their input order
            direction.trips.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
        }

        if !unknown_trips.is_empty() {
            warn!(
                "Skipped stop times for {} unknown trips: {:?}",
                unknown_trips.len(),
                unknown_trips
            );
        }
        if !unknown_routes.is_empty() {
            warn!(
                "Skipped trips on {} unknown routes: {:?}",
                unknown_routes.len(),
                unknown_routes
            );
        }
        if !unknown_stops.is_empty() {
            warn!(
                "Skipped stop times at {} unknown stops: {:?}",
                unknown_stops.len(),
                unknown_stops
            );
        }

        timetable
    }

    pub fn num_trips(&self) -> usize {
        self.directions.values().map(|d| d.trips.len()).sum()
    }
}

impl RouteDirection {
    /// The first position in the stop order holding any of these IDs
    pub fn find_stop(&self, ids: &StopIdSet) -> Option<usize> {
        self.stops.iter().position(|id| ids.contains(id))
    }

    /// Like `find_stop`, but only considering positions strictly after `after`
    pub fn find_stop_after(&self, ids: &StopIdSet, after: usize) -> Option<usize> {
        self.stops
            .iter()
            .enumerate()
            .skip(after + 1)
            .find(|(_, id)| ids.contains(id))
            .map(|(idx, _)| idx)
    }
}

impl TimetableTrip {
    /// The departure from the first stop. Trips without one sort last.
    pub fn sort_key(&self) -> &str {
        match self.times.first() {
            Some(st) if !st.dep.is_empty() => st.dep.as_str(),
            _ => TimeOfDay::SENTINEL,
        }
    }

    /// If the trip visits a stop twice, this is the first visit.
    pub fn times_at(&self, stop_id: &StopID) -> Option<&StopVisit> {
        self.times.iter().find(|st| &st.stop_id == stop_id)
    }
}
