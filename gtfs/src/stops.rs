use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{StopID, Table};

/// One row of the stops artifact. The same physical stop may appear several times with different
/// IDs and names that only differ by invisible characters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopID,
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Keeps feed order and duplicate IDs.
pub fn load(table: &Table) -> Result<Vec<Stop>> {
    let mut stops = Vec::new();
    for rec in table.deserialize() {
        let rec: Record = rec?;
        stops.push(Stop {
            id: rec.stop_id,
            name: rec.stop_name.unwrap_or_default(),
            lat: parse_coordinate(rec.stop_lat.as_deref()),
            lon: parse_coordinate(rec.stop_lon.as_deref()),
        });
    }
    Ok(stops)
}

// Blank, garbage, and 0 all mean the feed doesn't know
fn parse_coordinate(x: Option<&str>) -> Option<f64> {
    x?.parse::<f64>()
        .ok()
        .filter(|x| x.is_finite() && *x != 0.0)
}

#[derive(Deserialize)]
struct Record {
    stop_id: StopID,
    stop_name: Option<String>,
    stop_lat: Option<String>,
    stop_lon: Option<String>,
    // TODO Parent stations (location_type = 1) are kept as ordinary stops
}
