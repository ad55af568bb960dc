use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{RouteID, Table};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Route {
    pub route_id: RouteID,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
}

impl Route {
    /// The short name, falling back to the long name, then the ID
    pub fn describe(&self) -> String {
        for x in [&self.short_name, &self.long_name].into_iter().flatten() {
            if !x.is_empty() {
                return x.to_string();
            }
        }
        self.route_id.to_string()
    }
}

pub fn load(table: &Table) -> Result<BTreeMap<RouteID, Route>> {
    let mut routes = BTreeMap::new();
    for rec in table.deserialize() {
        let rec: Record = rec?;
        if routes.contains_key(&rec.route_id) {
            warn!("Duplicate {:?}, the last entry wins", rec.route_id);
        }
        routes.insert(
            rec.route_id.clone(),
            Route {
                route_id: rec.route_id,
                short_name: rec.route_short_name,
                long_name: rec.route_long_name,
            },
        );
    }
    Ok(routes)
}

#[derive(Deserialize)]
struct Record {
    route_id: RouteID,
    route_short_name: Option<String>,
    route_long_name: Option<String>,
}
