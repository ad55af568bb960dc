#[macro_use]
extern crate log;

mod board;
pub mod clock;
mod query;
mod session;
mod stop_index;

use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::Result;

use gtfs::{Artifacts, Stop, StopID, Timetable};

pub use self::board::{display_window, next_trip_index, Board, RouteGroup, RowState};
pub use self::query::{DestinationCandidate, QueryOutcome, TripMatch};
pub use self::session::Session;
pub use self::stop_index::{normalize, Selection, StopIndex, StopName};

/// Everything the query side needs, loaded from the imported artifacts. Never modified once
/// built.
pub struct Model {
    pub stops: Vec<Stop>,
    pub timetable: Timetable,
    pub index: StopIndex,
}

impl Model {
    pub fn new(artifacts: Artifacts) -> Self {
        let index = StopIndex::new(&artifacts.stops);
        Self {
            stops: artifacts.stops,
            timetable: artifacts.timetable,
            index,
        }
    }

    pub fn load(data_dir: &Path) -> Result<Self> {
        let model = Self::new(Artifacts::read(data_dir)?);
        info!(
            "Loaded {} stops ({} distinct names) and {} route directions from {}",
            model.stops.len(),
            model.index.all_stop_names().len(),
            model.timetable.directions.len(),
            data_dir.display()
        );
        Ok(model)
    }

    pub fn stop(&self, id: &StopID) -> Option<&Stop> {
        self.stops.get(self.index.position(id)?)
    }
}

/// Holds the current model for a long-running process. Readers grab a snapshot; a refresh swaps
/// in a whole new model without disturbing them.
pub struct SharedModel {
    current: RwLock<Arc<Model>>,
}

impl SharedModel {
    pub fn new(model: Model) -> Self {
        Self {
            current: RwLock::new(Arc::new(model)),
        }
    }

    pub fn current(&self) -> Arc<Model> {
        // A panicking writer can't leave a half-replaced Arc behind
        self.current
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    pub fn replace(&self, model: Model) {
        *self
            .current
            .write()
            .unwrap_or_else(|err| err.into_inner()) = Arc::new(model);
    }
}
