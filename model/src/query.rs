use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gtfs::{ServiceType, StopID, TimeOfDay};

use crate::stop_index::normalize;
use crate::{Board, Model, Selection, Session};

/// A stop reachable from the departure without going backwards along some route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DestinationCandidate {
    pub id: StopID,
    pub name: String,
    pub display_name: String,
    /// Names of the routes serving this pair, without repeats
    pub routes: Vec<String>,
}

/// One trip going from the departure to the destination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripMatch {
    pub route_name: String,
    pub route_long_name: String,
    pub headsign: String,
    pub departure: TimeOfDay,
    pub arrival: TimeOfDay,
}

impl TripMatch {
    /// Used to group trips for display
    pub fn label(&self) -> String {
        format!("{} {}", self.route_name, self.headsign)
    }
}

pub enum QueryOutcome {
    /// The departure or destination hasn't been chosen yet
    NotSelected,
    /// Nothing connects the pair on this type of day
    NoService(ServiceType),
    Found(Board),
}

impl Model {
    pub fn destination_candidates(&self, departure: &Selection) -> Vec<DestinationCandidate> {
        let mut candidates: Vec<DestinationCandidate> = Vec::new();
        let mut by_name: BTreeMap<String, usize> = BTreeMap::new();

        for direction in self.timetable.directions.values() {
            let dep_idx = match direction.find_stop(&departure.all_ids) {
                Some(x) => x,
                None => continue,
            };
            for stop_id in &direction.stops[dep_idx + 1..] {
                let stop = match self.stop(stop_id) {
                    Some(x) => x,
                    None => continue,
                };
                let display_name = normalize(&stop.name);
                // A loop can come back to where it started
                if display_name == departure.display_name {
                    continue;
                }
                match by_name.get(&display_name) {
                    Some(idx) => {
                        let routes = &mut candidates[*idx].routes;
                        if !routes.contains(&direction.route_name) {
                            routes.push(direction.route_name.clone());
                        }
                    }
                    None => {
                        by_name.insert(display_name.clone(), candidates.len());
                        candidates.push(DestinationCandidate {
                            id: stop.id.clone(),
                            name: stop.name.clone(),
                            display_name,
                            routes: vec![direction.route_name.clone()],
                        });
                    }
                }
            }
        }
        candidates
    }

    /// Sorted by departure time. Empty if nothing connects the two on this type of day.
    pub fn matching_trips(
        &self,
        departure: &Selection,
        destination: &Selection,
        day_type: ServiceType,
    ) -> Vec<TripMatch> {
        let mut results = Vec::new();
        for direction in self.timetable.directions.values() {
            let dep_idx = match direction.find_stop(&departure.all_ids) {
                Some(x) => x,
                None => continue,
            };
            let dest_idx = match direction.find_stop_after(&destination.all_ids, dep_idx) {
                Some(x) => x,
                None => continue,
            };
            let dep_stop = &direction.stops[dep_idx];
            let dest_stop = &direction.stops[dest_idx];

            for trip in &direction.trips {
                if trip.service_type != day_type {
                    continue;
                }
                let (dep, arr) = match (trip.times_at(dep_stop), trip.times_at(dest_stop)) {
                    (Some(dep), Some(arr)) => (&dep.dep, &arr.arr),
                    _ => continue,
                };
                // Untimed stops can't be shown in a timetable
                if dep.is_empty() || arr.is_empty() {
                    continue;
                }
                results.push(TripMatch {
                    route_name: direction.route_name.clone(),
                    route_long_name: direction.route_long_name.clone(),
                    headsign: direction.headsign.clone(),
                    departure: dep.clone(),
                    arrival: arr.clone(),
                });
            }
        }

        // Stable, so ties keep route order
        results.sort_by(|a, b| a.departure.cmp(&b.departure));
        results
    }

    /// Everything needed to show the timetable for the session's current choices.
    pub fn departures(&self, session: &Session, now: &TimeOfDay) -> QueryOutcome {
        let (departure, destination) = match (session.departure(), session.destination()) {
            (Some(dep), Some(dest)) => (dep, dest),
            _ => return QueryOutcome::NotSelected,
        };
        let trips = self.matching_trips(departure, destination, session.day_type);
        if trips.is_empty() {
            return QueryOutcome::NoService(session.day_type);
        }
        QueryOutcome::Found(Board::new(trips, now.clone()))
    }
}
