use std::ops::Range;

use gtfs::TimeOfDay;

use crate::TripMatch;

/// How many trips to show before and after the next one
const CONTEXT: usize = 2;
/// When everything has left, how many of the last trips to show
const TAIL: usize = 4;

/// The sorted trips for one stop pair, positioned relative to the current time.
pub struct Board {
    pub trips: Vec<TripMatch>,
    pub now: TimeOfDay,
    /// Index of the first trip leaving at or after `now`
    pub next: Option<usize>,
    /// The part of `trips` to display
    pub window: Range<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowState {
    Past,
    Next,
    Upcoming,
}

/// Trips sharing a route and headsign, in the order they're first seen.
pub struct RouteGroup<'a> {
    pub label: String,
    /// Indices into `Board::trips`
    pub trips: Vec<(usize, &'a TripMatch)>,
}

impl Board {
    pub fn new(trips: Vec<TripMatch>, now: TimeOfDay) -> Self {
        let next = next_trip_index(&trips, &now);
        let window = display_window(trips.len(), next);
        Self {
            trips,
            now,
            next,
            window,
        }
    }

    pub fn next_trip(&self) -> Option<&TripMatch> {
        self.trips.get(self.next?)
    }

    pub fn groups(&self) -> Vec<RouteGroup<'_>> {
        let mut groups: Vec<RouteGroup> = Vec::new();
        for idx in self.window.clone() {
            let trip = &self.trips[idx];
            let label = trip.label();
            match groups.iter_mut().find(|g| g.label == label) {
                Some(group) => group.trips.push((idx, trip)),
                None => groups.push(RouteGroup {
                    label,
                    trips: vec![(idx, trip)],
                }),
            }
        }
        groups
    }

    pub fn row_state(&self, idx: usize) -> RowState {
        if Some(idx) == self.next {
            RowState::Next
        } else if self.trips[idx].departure < self.now {
            RowState::Past
        } else {
            RowState::Upcoming
        }
    }
}

/// The first trip departing at or after `now`. Since `now` is never past 23:59:59, trips after
/// midnight (hour 24 and up) always count as upcoming.
pub fn next_trip_index(trips: &[TripMatch], now: &TimeOfDay) -> Option<usize> {
    trips.iter().position(|t| &t.departure >= now)
}

pub fn display_window(len: usize, next: Option<usize>) -> Range<usize> {
    match next {
        Some(idx) => idx.saturating_sub(CONTEXT)..(idx + CONTEXT + 1).min(len),
        None => len.saturating_sub(TAIL)..len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(route: &str, headsign: &str, departure: &str) -> TripMatch {
        TripMatch {
            route_name: route.to_string(),
            route_long_name: String::new(),
            headsign: headsign.to_string(),
            departure: TimeOfDay::new(departure),
            arrival: TimeOfDay::new("99:00:00"),
        }
    }

    fn ten_trips() -> Vec<TripMatch> {
        (0..10)
            .map(|h| trip("1", "Sakae", &format!("{:02}:00:00", h + 8)))
            .collect()
    }

    #[test]
    fn window_around_next() {
        // Between the 4th (11:00) and 5th (12:00) trips, counting from one
        let board = Board::new(ten_trips(), TimeOfDay::new("11:30:00"));
        assert_eq!(board.next, Some(4));
        assert_eq!(board.window, 2..7);
        assert_eq!(board.window.len(), 5);
        assert_eq!(board.next_trip().unwrap().departure.as_str(), "12:00:00");

        // Between indices 4 (12:00) and 5 (13:00)
        let board = Board::new(ten_trips(), TimeOfDay::new("12:30:00"));
        assert_eq!(board.next, Some(5));
        assert_eq!(board.window, 3..8);
    }

    #[test]
    fn window_edges() {
        assert_eq!(display_window(10, Some(0)), 0..3);
        assert_eq!(display_window(10, Some(1)), 0..4);
        assert_eq!(display_window(10, Some(9)), 7..10);
        assert_eq!(display_window(10, None), 6..10);
        assert_eq!(display_window(3, None), 0..3);
        assert_eq!(display_window(1, Some(0)), 0..1);
    }

    #[test]
    fn next_includes_exact_time_and_after_midnight() {
        let trips = vec![
            trip("1", "Sakae", "07:00:00"),
            trip("1", "Sakae", "23:59:00"),
            trip("1", "Sakae", "24:10:00"),
        ];
        assert_eq!(next_trip_index(&trips, &TimeOfDay::new("07:00:00")), Some(0));
        assert_eq!(next_trip_index(&trips, &TimeOfDay::new("23:59:30")), Some(2));

        let all_gone = vec![trip("1", "Sakae", "07:00:00"), trip("1", "Sakae", "08:00:00")];
        let board = Board::new(all_gone, TimeOfDay::new("09:00:00"));
        assert!(board.next_trip().is_none());
        assert_eq!(board.window, 0..2);
        assert_eq!(board.row_state(1), RowState::Past);
    }

    #[test]
    fn grouping_keeps_first_seen_order() {
        let trips = vec![
            trip("2", "Ozone", "08:00:00"),
            trip("1", "Sakae", "08:05:00"),
            trip("2", "Ozone", "08:10:00"),
            trip("1", "Sakae", "08:20:00"),
        ];
        let board = Board::new(trips, TimeOfDay::new("08:06:00"));
        let groups = board.groups();
        let summary: Vec<(&str, Vec<usize>)> = groups
            .iter()
            .map(|g| (g.label.as_str(), g.trips.iter().map(|(idx, _)| *idx).collect()))
            .collect();
        assert_eq!(summary, vec![("2 Ozone", vec![0, 2]), ("1 Sakae", vec![1, 3])]);

        assert_eq!(board.row_state(0), RowState::Past);
        assert_eq!(board.row_state(1), RowState::Past);
        assert_eq!(board.row_state(2), RowState::Next);
        assert_eq!(board.row_state(3), RowState::Upcoming);
    }
}
