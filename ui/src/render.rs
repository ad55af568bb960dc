use chrono::NaiveTime;

use gtfs::ServiceType;
use model::clock::{countdown, describe_duration, format_time};
use model::{Board, DestinationCandidate, QueryOutcome, RowState, StopName};

use crate::bookmarks::{Bookmarks, RoutePair};

pub fn outcome(outcome: &QueryOutcome, clock: NaiveTime) -> String {
    match outcome {
        QueryOutcome::NotSelected => "出発地と目的地を選んでください".to_string(),
        QueryOutcome::NoService(day_type) => no_service(*day_type),
        QueryOutcome::Found(board) => self::board(board, clock),
    }
}

pub fn no_service(day_type: ServiceType) -> String {
    format!("この区間の{}ダイヤは見つかりませんでした", day_type.label())
}

/// A saved pair naming a stop the current timetable doesn't have
pub fn stale_bookmark(pair: &RoutePair) -> String {
    format!(
        "{} → {} の停留所が見つかりません。時刻表が更新された可能性があります",
        pair.dep, pair.dest
    )
}

pub fn board(board: &Board, clock: NaiveTime) -> String {
    let mut lines = Vec::new();

    if let Some(next) = board.next_trip() {
        lines.push(format!("次のバス  {}", next.label()));
        lines.push(format!(
            "  {} 発 → {} 着  ({})",
            format_time(&next.departure),
            format_time(&next.arrival),
            describe_duration(&next.departure, &next.arrival)
        ));
        if let Some(x) = countdown(clock, &next.departure) {
            lines.push(format!("  {x}"));
        }
        lines.push(String::new());
    }

    for group in board.groups() {
        lines.push(group.label.clone());
        for (idx, trip) in group.trips {
            let (marker, note) = match board.row_state(idx) {
                RowState::Past => (" ", "  (発車済)"),
                RowState::Next => ("▶", ""),
                RowState::Upcoming => (" ", ""),
            };
            lines.push(format!(
                "{marker} {:>10} → {:<10} {}{note}",
                format_time(&trip.departure),
                format_time(&trip.arrival),
                describe_duration(&trip.departure, &trip.arrival)
            ));
        }
    }
    lines.join("\n")
}

pub fn stop_names(names: &[&StopName]) -> String {
    names
        .iter()
        .map(|x| format!("{}  ({})", x.display_name, x.id))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn destinations(candidates: &[&DestinationCandidate]) -> String {
    candidates
        .iter()
        .map(|x| format!("{}  [{}]", x.display_name, x.routes.join("] [")))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn bookmarks(bookmarks: &Bookmarks) -> String {
    let mut lines = Vec::new();
    for (title, list) in [
        ("お気に入り", &bookmarks.favorites),
        ("履歴", &bookmarks.history),
    ] {
        if list.is_empty() {
            continue;
        }
        lines.push(title.to_string());
        for (idx, pair) in list.iter().enumerate() {
            lines.push(format!("  {idx}: {} → {}", pair.dep, pair.dest));
        }
    }
    if lines.is_empty() {
        lines.push("No bookmarks yet".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtfs::TimeOfDay;
    use model::TripMatch;

    fn trip(route: &str, dep: &str, arr: &str) -> TripMatch {
        TripMatch {
            route_name: route.to_string(),
            route_long_name: String::new(),
            headsign: "Sakae".to_string(),
            departure: TimeOfDay::new(dep),
            arrival: TimeOfDay::new(arr),
        }
    }

    #[test]
    fn next_trip_card() {
        let board = Board::new(
            vec![
                trip("1", "06:50:00", "07:05:00"),
                trip("1", "08:00:00", "08:20:00"),
                trip("2", "24:10:00", "25:20:00"),
            ],
            TimeOfDay::new("07:00:00"),
        );
        let text = self::board(&board, NaiveTime::from_hms_opt(7, 0, 0).unwrap());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "次のバス  1 Sakae");
        assert_eq!(lines[1], "  8:00 発 → 8:20 着  (20分)");
        assert_eq!(lines[2], "  あと60分");
        assert_eq!(lines[4], "1 Sakae");
        assert!(lines[5].ends_with("(発車済)"));
        assert!(lines[6].starts_with('▶'));
        assert_eq!(lines[7], "2 Sakae");
        assert!(lines[8].contains("0:10 (翌)"));
        assert!(lines[8].contains("1時間10分"));
    }

    #[test]
    fn messages() {
        assert_eq!(
            no_service(ServiceType::Saturday),
            "この区間の土曜ダイヤは見つかりませんでした"
        );
        assert_eq!(bookmarks(&Bookmarks::default()), "No bookmarks yet");

        let mut saved = Bookmarks::default();
        saved.add_history(RoutePair::new("Nagoya", "Sakae"));
        assert_eq!(bookmarks(&saved), "履歴\n  0: Nagoya → Sakae");
    }
}
