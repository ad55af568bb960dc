use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{DirectionID, RouteID, ServiceID, Table, TripID};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: TripID,
    pub route_id: RouteID,
    pub service_id: ServiceID,
    /// "0" when the feed leaves it out. Inbound/outbound are arbitrary.
    pub direction_id: DirectionID,
    pub headsign: String,
}

pub fn load(table: &Table) -> Result<BTreeMap<TripID, Trip>> {
    let mut trips = BTreeMap::new();
    for rec in table.deserialize() {
        let rec: Record = rec?;
        if trips.contains_key(&rec.trip_id) {
            warn!("Duplicate {:?}, the last entry wins", rec.trip_id);
        }
        trips.insert(
            rec.trip_id.clone(),
            Trip {
                trip_id: rec.trip_id,
                route_id: rec.route_id,
                service_id: rec.service_id,
                direction_id: rec.direction_id.unwrap_or_default(),
                headsign: rec.trip_headsign.unwrap_or_default(),
            },
        );
    }
    Ok(trips)
}

#[derive(Deserialize)]
struct Record {
    trip_id: TripID,
    route_id: RouteID,
    service_id: ServiceID,
    trip_headsign: Option<String>,
    direction_id: Option<DirectionID>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let trips = load(&Table::parse(
            "route_id,service_id,trip_id,trip_headsign,direction_id\nR1,wk,T1,Sakae,1\nR1,wk,T2,,\n",
        ))
        .unwrap();
        let t1 = &trips[&TripID::new("T1")];
        assert_eq!(t1.direction_id, DirectionID::new("1"));
        assert_eq!(t1.headsign, "Sakae");
        let t2 = &trips[&TripID::new("T2")];
        assert_eq!(t2.direction_id, DirectionID::new("0"));
        assert_eq!(t2.headsign, "");
    }
}
