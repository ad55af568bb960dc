#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod bookmarks;
mod render;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveTime;
use structopt::StructOpt;

use gtfs::{Artifacts, FeedSource, ServiceType, GTFS};
use model::clock::{now, time_of_day, today_service_type};
use model::{Model, Selection, Session, SharedModel};

pub use self::bookmarks::{Bookmarks, RoutePair};

#[derive(StructOpt)]
#[structopt(name = "bus-times", about = "Bus timetables between two stops, from a GTFS feed")]
enum Args {
    /// Import a GTFS feed, writing the files every other command reads
    Import {
        /// The path to a GTFS directory or .zip file
        #[structopt(long)]
        gtfs: PathBuf,
        #[structopt(flatten)]
        data: DataDir,
    },
    /// List stop names containing some text
    Stops {
        query: Option<String>,
        #[structopt(long, default_value = "50")]
        limit: usize,
        #[structopt(flatten)]
        data: DataDir,
    },
    /// List the places reachable from a stop
    Destinations {
        #[structopt(long)]
        from: String,
        query: Option<String>,
        #[structopt(long, default_value = "50")]
        limit: usize,
        #[structopt(flatten)]
        data: DataDir,
    },
    /// Show the next buses between two stops
    Departures {
        #[structopt(flatten)]
        trip: TripArgs,
    },
    /// Like departures, but keep refreshing
    Watch {
        #[structopt(flatten)]
        trip: TripArgs,
        /// Seconds between refreshes
        #[structopt(long, default_value = "60")]
        interval: u64,
    },
    /// Add or remove a favorite pair of stops
    Favorite {
        #[structopt(long)]
        from: String,
        #[structopt(long)]
        to: String,
        #[structopt(flatten)]
        data: DataDir,
    },
    /// List favorites and recent searches
    Bookmarks {
        #[structopt(long)]
        remove_favorite: Option<usize>,
        #[structopt(long)]
        remove_history: Option<usize>,
        #[structopt(flatten)]
        data: DataDir,
    },
}

#[derive(StructOpt)]
struct DataDir {
    /// Where imported timetables and bookmarks live
    #[structopt(long = "data", default_value = "data")]
    path: PathBuf,
}

#[derive(StructOpt)]
struct TripArgs {
    #[structopt(long, requires = "to")]
    from: Option<String>,
    #[structopt(long, requires = "from")]
    to: Option<String>,
    /// Use a saved favorite, numbered as `bus-times bookmarks` lists them
    #[structopt(long, conflicts_with_all = &["from", "history"])]
    favorite: Option<usize>,
    /// Use a recent search, numbered as `bus-times bookmarks` lists them
    #[structopt(long, conflicts_with_all = &["from"])]
    history: Option<usize>,
    /// weekday, saturday, or holiday. Defaults to today's.
    #[structopt(long)]
    day: Option<ServiceType>,
    /// Pretend it's this time of day, as HH:MM or HH:MM:SS
    #[structopt(long, parse(try_from_str = parse_time))]
    now: Option<NaiveTime>,
    #[structopt(flatten)]
    data: DataDir,
}

fn parse_time(x: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(x, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(x, "%H:%M"))
        .map_err(|_| anyhow!("{x} isn't a time like 07:30 or 07:30:00"))
}

pub fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Args::from_args() {
        Args::Import { gtfs, data } => import(&gtfs, &data.path),
        Args::Stops { query, limit, data } => {
            let model = Model::load(&data.path)?;
            let hits = model.index.search(query.as_deref().unwrap_or(""), limit);
            println!("{}", render::stop_names(&hits));
            Ok(())
        }
        Args::Destinations {
            from,
            query,
            limit,
            data,
        } => {
            let model = Model::load(&data.path)?;
            let departure = select(&model, &from)?;
            let query = model::normalize(query.as_deref().unwrap_or("").trim());
            let candidates = model.destination_candidates(&departure);
            let hits: Vec<_> = candidates
                .iter()
                .filter(|x| x.display_name.contains(&query))
                .take(limit)
                .collect();
            println!("{}", render::destinations(&hits));
            Ok(())
        }
        Args::Departures { trip } => {
            let model = Model::load(&trip.data.path)?;
            let pair = trip.route_pair()?;
            let (text, selected) = departures(&model, &trip, &pair)?;
            println!("{text}");
            match selected {
                Some(pair) => record_history(&trip.data.path, pair),
                None => Ok(()),
            }
        }
        Args::Watch { trip, interval } => watch(trip, interval),
        Args::Favorite { from, to, data } => {
            let model = Model::load(&data.path)?;
            let pair = RoutePair::new(
                &select(&model, &from)?.display_name,
                &select(&model, &to)?.display_name,
            );
            let mut bookmarks = Bookmarks::load(&data.path);
            if bookmarks.toggle_favorite(pair.clone()) {
                println!("★ {} → {} をお気に入りに登録しました", pair.dep, pair.dest);
            } else {
                println!("☆ {} → {} をお気に入りから解除しました", pair.dep, pair.dest);
            }
            bookmarks.save(&data.path)
        }
        Args::Bookmarks {
            remove_favorite,
            remove_history,
            data,
        } => {
            let mut bookmarks = Bookmarks::load(&data.path);
            if remove_favorite.is_some() || remove_history.is_some() {
                if let Some(idx) = remove_favorite {
                    bookmarks.remove_favorite(idx)?;
                }
                if let Some(idx) = remove_history {
                    bookmarks.remove_history(idx)?;
                }
                bookmarks.save(&data.path)?;
            }
            println!("{}", render::bookmarks(&bookmarks));
            Ok(())
        }
    }
}

fn import(gtfs_path: &Path, data_dir: &Path) -> Result<()> {
    info!("Importing {}", gtfs_path.display());
    let gtfs = GTFS::load(&mut FeedSource::open(gtfs_path)?)?;

    let today = now().date();
    let running = gtfs
        .calendar
        .services
        .values()
        .filter(|s| s.runs_on(today))
        .count();
    info!(
        "{running} of {} services run today ({today})",
        gtfs.calendar.services.len()
    );
    if running == 0 {
        warn!("Nothing runs today according to the calendar. The feed might be out of date.");
    }

    let artifacts = Artifacts::build(gtfs);
    info!(
        "{} trips across {} route directions",
        artifacts.timetable.num_trips(),
        artifacts.timetable.directions.len()
    );
    artifacts.write(data_dir)
}

fn select(model: &Model, name: &str) -> Result<Selection> {
    model
        .index
        .select(name)
        .ok_or_else(|| anyhow!("There's no stop named {name}. Try `bus-times stops {name}`"))
}

impl TripArgs {
    /// The pair of names to look up, either typed in or from the bookmarks
    fn route_pair(&self) -> Result<PairChoice> {
        if let (Some(from), Some(to)) = (&self.from, &self.to) {
            return Ok(PairChoice::Typed(RoutePair::new(from, to)));
        }
        let bookmarks = Bookmarks::load(&self.data.path);
        let (list, idx, kind) = match (self.favorite, self.history) {
            (Some(idx), _) => (&bookmarks.favorites, idx, "favorite"),
            (None, Some(idx)) => (&bookmarks.history, idx, "recent search"),
            (None, None) => bail!("Pass --from and --to, or pick a bookmark with --favorite or --history"),
        };
        match list.get(idx) {
            Some(pair) => Ok(PairChoice::Saved(pair.clone())),
            None => bail!("There's no {kind} number {idx}; see `bus-times bookmarks`"),
        }
    }
}

enum PairChoice {
    Typed(RoutePair),
    Saved(RoutePair),
}

/// Samples the clock fresh every time. Also returns the pair by display name, if both stops
/// resolved.
fn departures(
    model: &Model,
    args: &TripArgs,
    choice: &PairChoice,
) -> Result<(String, Option<RoutePair>)> {
    let clock = now();
    let time = args.now.unwrap_or_else(|| clock.time());
    let day_type = args.day.unwrap_or_else(|| today_service_type(clock));

    let mut session = Session::new(day_type);
    match choice {
        PairChoice::Typed(pair) => {
            session.select_departure(select(model, &pair.dep)?);
            session.select_destination(select(model, &pair.dest)?);
        }
        PairChoice::Saved(pair) => {
            if !session.select_pair(&model.index, &pair.dep, &pair.dest) {
                return Ok((render::stale_bookmark(pair), None));
            }
        }
    }
    let (departure, destination) = match (session.departure(), session.destination()) {
        (Some(dep), Some(dest)) => (dep.display_name.clone(), dest.display_name.clone()),
        _ => bail!("Couldn't select both stops"),
    };

    let outcome = model.departures(&session, &time_of_day(time));
    let text = format!(
        "{departure} → {destination}  ({})\n\n{}",
        day_type.label(),
        render::outcome(&outcome, time)
    );
    Ok((text, Some(RoutePair::new(&departure, &destination))))
}

fn record_history(data_dir: &Path, pair: RoutePair) -> Result<()> {
    let mut bookmarks = Bookmarks::load(data_dir);
    bookmarks.add_history(pair);
    bookmarks.save(data_dir)
}

fn watch(args: TripArgs, interval: u64) -> Result<()> {
    let data_dir = &args.data.path;
    let shared = SharedModel::new(Model::load(data_dir)?);
    let mut loaded_at = Artifacts::modified(data_dir);
    let choice = args.route_pair()?;
    let mut recorded = false;

    loop {
        let modified = Artifacts::modified(data_dir);
        if modified != loaded_at {
            // Keep showing the old timetable if the new one is broken or half-written
            match Model::load(data_dir) {
                Ok(model) => {
                    info!("Timetable changed on disk, reloaded it");
                    shared.replace(model);
                    loaded_at = modified;
                }
                Err(err) => warn!("Couldn't reload the timetable: {err:#}"),
            }
        }

        match departures(&shared.current(), &args, &choice) {
            Ok((text, selected)) => {
                println!("\n{}\n", text);
                if let (false, Some(pair)) = (recorded, selected) {
                    record_history(data_dir, pair)?;
                    recorded = true;
                }
            }
            Err(err) => error!("{err:#}"),
        }
        std::thread::sleep(Duration::from_secs(interval.max(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Model {
        let gtfs = GTFS::load(&mut FeedSource::in_memory(vec![
            ("stops.txt", "stop_id,stop_name\nA,Alpha\nB,Beta\n"),
            ("routes.txt", "route_id,route_short_name\nR1,1\n"),
            (
                "trips.txt",
                "route_id,service_id,trip_id,trip_headsign,direction_id\nR1,wk,T1,Beta,0\n",
            ),
            (
                "stop_times.txt",
                "trip_id,arrival_time,departure_time,stop_id,stop_sequence
T1,08:00:00,08:00:00,A,1
T1,08:10:00,08:10:00,B,2
",
            ),
            (
                "calendar.txt",
                "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date
wk,1,1,1,1,1,0,0,20240101,20241231
",
            ),
        ]))
        .unwrap();
        Model::new(Artifacts::build(gtfs))
    }

    fn args() -> TripArgs {
        TripArgs {
            from: None,
            to: None,
            favorite: Some(0),
            history: None,
            day: Some(ServiceType::Weekday),
            now: NaiveTime::from_hms_opt(7, 0, 0),
            data: DataDir {
                path: PathBuf::from("unused"),
            },
        }
    }

    #[test]
    fn saved_pair_opens_the_board() {
        let choice = PairChoice::Saved(RoutePair::new("Alpha", "Beta"));
        let (text, selected) = departures(&model(), &args(), &choice).unwrap();
        assert!(text.starts_with("Alpha → Beta  (平日)"));
        assert!(text.contains("次のバス  1 Beta"));
        assert_eq!(selected, Some(RoutePair::new("Alpha", "Beta")));
    }

    #[test]
    fn saved_pair_with_a_vanished_stop() {
        let choice = PairChoice::Saved(RoutePair::new("Alpha", "Gamma"));
        let (text, selected) = departures(&model(), &args(), &choice).unwrap();
        assert_eq!(
            text,
            "Alpha → Gamma の停留所が見つかりません。時刻表が更新された可能性があります"
        );
        assert_eq!(selected, None);
    }

    #[test]
    fn typed_pair_with_an_unknown_stop_fails() {
        let choice = PairChoice::Typed(RoutePair::new("Alpha", "Gamma"));
        let err = departures(&model(), &args(), &choice).unwrap_err();
        assert!(err.to_string().contains("There's no stop named Gamma"));
    }

    #[test]
    fn bookmark_index_out_of_range() {
        let dir = std::env::temp_dir().join(format!("bus-times-pair-{}", std::process::id()));
        let _ = fs_err::remove_dir_all(&dir);
        let mut args = args();
        args.data.path = dir.clone();
        assert!(args.route_pair().is_err());

        let mut bookmarks = Bookmarks::default();
        bookmarks.toggle_favorite(RoutePair::new("Alpha", "Beta"));
        bookmarks.save(&dir).unwrap();
        match args.route_pair().unwrap() {
            PairChoice::Saved(pair) => assert_eq!(pair, RoutePair::new("Alpha", "Beta")),
            PairChoice::Typed(_) => panic!("expected the saved favorite"),
        }
        fs_err::remove_dir_all(&dir).unwrap();
    }
}
