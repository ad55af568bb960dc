use gtfs::ServiceType;

use crate::{Selection, StopIndex};

/// What the user currently has chosen. The query engine itself keeps no state; callers pass this
/// in.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    departure: Option<Selection>,
    destination: Option<Selection>,
    pub day_type: ServiceType,
}

impl Session {
    pub fn new(day_type: ServiceType) -> Self {
        Self {
            departure: None,
            destination: None,
            day_type,
        }
    }

    pub fn departure(&self) -> Option<&Selection> {
        self.departure.as_ref()
    }

    pub fn destination(&self) -> Option<&Selection> {
        self.destination.as_ref()
    }

    /// Any previous destination might not be reachable anymore, so it's cleared.
    pub fn select_departure(&mut self, selection: Selection) {
        self.departure = Some(selection);
        self.destination = None;
    }

    pub fn select_destination(&mut self, selection: Selection) {
        self.destination = Some(selection);
    }

    /// Selects a saved pair of names. If either name doesn't resolve to any stops anymore,
    /// nothing changes and this returns false.
    pub fn select_pair(&mut self, index: &StopIndex, departure: &str, destination: &str) -> bool {
        match (index.select(departure), index.select(destination)) {
            (Some(dep), Some(dest)) => {
                self.select_departure(dep);
                self.select_destination(dest);
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.departure = None;
        self.destination = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtfs::{Stop, StopID};

    fn index() -> StopIndex {
        StopIndex::new(
            &["Sakae", "Nagoya", "Ozone"]
                .into_iter()
                .enumerate()
                .map(|(idx, name)| Stop {
                    id: StopID::new(idx.to_string()),
                    name: name.to_string(),
                    lat: None,
                    lon: None,
                })
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn new_departure_clears_destination() {
        let index = index();
        let mut session = Session::new(ServiceType::Weekday);
        assert!(session.departure().is_none());

        session.select_departure(index.select("Sakae").unwrap());
        session.select_destination(index.select("Nagoya").unwrap());
        assert_eq!(session.destination().unwrap().display_name, "Nagoya");

        session.select_departure(index.select("Ozone").unwrap());
        assert_eq!(session.departure().unwrap().display_name, "Ozone");
        assert!(session.destination().is_none());

        session.reset();
        assert!(session.departure().is_none());
        assert_eq!(session.day_type, ServiceType::Weekday);
    }

    #[test]
    fn saved_pairs() {
        let index = index();
        let mut session = Session::new(ServiceType::Saturday);
        assert!(session.select_pair(&index, "Sakae", "Ozone"));
        assert_eq!(session.destination().unwrap().primary_id, StopID::new("2"));

        // A stop that disappeared from the feed leaves everything alone
        assert!(!session.select_pair(&index, "Nagoya", "Gone"));
        assert_eq!(session.departure().unwrap().display_name, "Sakae");
    }
}
