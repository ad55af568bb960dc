use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};

use crate::{Stop, Timetable, GTFS};

pub const STOPS_FILE: &str = "stops.json";
pub const TIMETABLE_FILE: &str = "timetable.json";

/// The two files produced by importing a feed and consumed by the query side.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Artifacts {
    pub stops: Vec<Stop>,
    pub timetable: Timetable,
}

impl Artifacts {
    pub fn build(gtfs: GTFS) -> Self {
        info!("Building the timetable");
        let timetable = Timetable::build(&gtfs);
        Self {
            stops: gtfs.stops,
            timetable,
        }
    }

    /// Only called with a fully built timetable, so readers never see a partial one
    pub fn write(&self, dir: &Path) -> Result<()> {
        fs_err::create_dir_all(dir)?;
        write_json(&dir.join(STOPS_FILE), &self.stops)?;
        write_json(&dir.join(TIMETABLE_FILE), &self.timetable)?;
        info!(
            "Wrote {} ({} stops) and {} ({} route directions)",
            dir.join(STOPS_FILE).display(),
            self.stops.len(),
            dir.join(TIMETABLE_FILE).display(),
            self.timetable.directions.len()
        );
        Ok(())
    }

    pub fn read(dir: &Path) -> Result<Self> {
        let stops = read_json(&dir.join(STOPS_FILE))?;
        let timetable = read_json(&dir.join(TIMETABLE_FILE))?;
        Ok(Self { stops, timetable })
    }

    /// When the artifacts in this directory were last written, if they exist
    pub fn modified(dir: &Path) -> Option<SystemTime> {
        [STOPS_FILE, TIMETABLE_FILE]
            .into_iter()
            .filter_map(|name| std::fs::metadata(dir.join(name)).ok()?.modified().ok())
            .max()
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    // Write somewhere else first, so a concurrent reader never sees half a file
    let tmp = path.with_extension("json.tmp");
    fs_err::write(&tmp, serde_json::to_string_pretty(value)?)?;
    fs_err::rename(&tmp, path)?;
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.is_file() {
        bail!(
            "{} doesn't exist. Import a GTFS feed first with `bus-times import --gtfs <path>`",
            path.display()
        );
    }
    let text = fs_err::read_to_string(path)?;
    serde_json::from_str(&text).with_context(|| {
        format!(
            "{} is unreadable. Import the GTFS feed again to regenerate it",
            path.display()
        )
    })
}
