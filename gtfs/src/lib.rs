#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod artifacts;
mod calendar;
mod ids;
mod routes;
mod source;
mod stop_times;
mod stops;
mod table;
mod time;
mod timetable;
mod trips;

use std::collections::BTreeMap;

use anyhow::{Context, Result};

pub use artifacts::Artifacts;
pub use calendar::{Calendar, DaysOfWeek, Service, ServiceType};
pub use ids::{DirectionID, RouteDirectionKey, RouteID, ServiceID, StopID, StopIdSet, TripID};
pub use routes::Route;
pub use source::FeedSource;
pub use stop_times::{StopTime, StopTimesByTrip};
pub use stops::Stop;
pub use table::Table;
pub use time::TimeOfDay;
pub use timetable::{RouteDirection, StopVisit, Timetable, TimetableTrip};
pub use trips::Trip;

/// The raw tables of one feed, joined only as far as needed to build a `Timetable`.
pub struct GTFS {
    /// In feed order, duplicates included
    pub stops: Vec<Stop>,
    pub stop_ids: StopIdSet,
    pub routes: BTreeMap<RouteID, Route>,
    pub trips: BTreeMap<TripID, Trip>,
    pub stop_times: StopTimesByTrip,
    pub calendar: Calendar,
}

impl GTFS {
    pub fn load(source: &mut FeedSource) -> Result<Self> {
        // Read everything required up-front, so a missing file fails before any work happens
        let stops_txt = source.required("stops.txt")?;
        let routes_txt = source.required("routes.txt")?;
        let trips_txt = source.required("trips.txt")?;
        let stop_times_txt = source.required("stop_times.txt")?;
        let calendar_txt = source.required("calendar.txt")?;
        let calendar_dates_txt = source.optional("calendar_dates.txt")?;

        let stops = stops::load(&parse("stops.txt", &stops_txt)).context("stops.txt")?;
        let routes = routes::load(&parse("routes.txt", &routes_txt)).context("routes.txt")?;
        let trips = trips::load(&parse("trips.txt", &trips_txt)).context("trips.txt")?;
        let stop_times = stop_times::load(&parse("stop_times.txt", &stop_times_txt))
            .context("stop_times.txt")?;
        let mut calendar =
            calendar::load(&parse("calendar.txt", &calendar_txt)).context("calendar.txt")?;
        if let Some(text) = calendar_dates_txt {
            calendar::load_exceptions(&mut calendar, &parse("calendar_dates.txt", &text))
                .context("calendar_dates.txt")?;
            info!(
                "Loaded {} calendar exceptions. They don't change which timetable a trip belongs to.",
                calendar.num_exceptions()
            );
        }

        info!("  stops: {}", stops.len());
        info!("  routes: {}", routes.len());
        info!("  trips: {}", trips.len());
        info!("  stop_times: {}", stop_times.len());
        info!("  calendar: {}", calendar.services.len());

        Ok(Self {
            stop_ids: stops.iter().map(|s| s.id.clone()).collect(),
            stops,
            routes,
            trips,
            stop_times,
            calendar,
        })
    }
}

fn parse(name: &str, text: &str) -> Table {
    let table = Table::parse(text);
    if table.is_empty() {
        warn!("{name} has no rows");
    } else {
        debug!("{name} has {} rows", table.len());
    }
    table
}
