use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{ServiceID, Table};

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Calendar {
    pub services: BTreeMap<ServiceID, Service>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Service {
    pub service_id: ServiceID,
    pub days_of_week: DaysOfWeek,
    // Unparseable dates leave the range open on that side
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    pub extra_days: BTreeSet<NaiveDate>,
    pub removed_days: BTreeSet<NaiveDate>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct DaysOfWeek {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

/// Which day's timetable a trip belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Weekday,
    Saturday,
    Holiday,
}

impl ServiceType {
    /// Sunday runs the holiday timetable
    pub fn for_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Sun => Self::Holiday,
            Weekday::Sat => Self::Saturday,
            _ => Self::Weekday,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekday => "weekday",
            Self::Saturday => "saturday",
            Self::Holiday => "holiday",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Weekday => "平日",
            Self::Saturday => "土曜",
            Self::Holiday => "休日",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = anyhow::Error;

    fn from_str(x: &str) -> Result<Self> {
        match x {
            "weekday" => Ok(Self::Weekday),
            "saturday" => Ok(Self::Saturday),
            "holiday" => Ok(Self::Holiday),
            _ => bail!("Unknown service type {x:?}, expected weekday, saturday, or holiday"),
        }
    }
}

impl Calendar {
    /// Services without a calendar entry run on weekdays.
    ///
    /// Exceptions from calendar_dates are intentionally not considered here; a service's type only
    /// depends on its weekly pattern.
    pub fn classify(&self, service_id: &ServiceID) -> ServiceType {
        match self.services.get(service_id) {
            Some(service) => service.service_type(),
            None => ServiceType::Weekday,
        }
    }

    pub fn num_exceptions(&self) -> usize {
        self.services
            .values()
            .map(|s| s.extra_days.len() + s.removed_days.len())
            .sum()
    }
}

impl Service {
    pub fn service_type(&self) -> ServiceType {
        if self.days_of_week.sunday {
            ServiceType::Holiday
        } else if self.days_of_week.saturday {
            ServiceType::Saturday
        } else {
            ServiceType::Weekday
        }
    }

    pub fn runs_on(&self, day: NaiveDate) -> bool {
        if self.extra_days.contains(&day) {
            return true;
        }
        if self.removed_days.contains(&day) {
            return false;
        }
        if self.start_date.map(|start| day < start).unwrap_or(false)
            || self.end_date.map(|end| day > end).unwrap_or(false)
        {
            return false;
        }
        self.days_of_week.includes(day)
    }
}

impl DaysOfWeek {
    /// Only true if Monday through Friday all operate
    pub fn weekday(&self) -> bool {
        self.monday && self.tuesday && self.wednesday && self.thursday && self.friday
    }

    pub fn includes(&self, day: NaiveDate) -> bool {
        match day.weekday() {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }
}

pub fn load(table: &Table) -> Result<Calendar> {
    let mut calendar = Calendar::default();
    for rec in table.deserialize() {
        let rec: Record = rec?;
        if calendar.services.contains_key(&rec.service_id) {
            warn!("Duplicate {:?}, the last entry wins", rec.service_id);
        }
        calendar.services.insert(
            rec.service_id.clone(),
            Service {
                service_id: rec.service_id,
                days_of_week: DaysOfWeek {
                    monday: rec.monday,
                    tuesday: rec.tuesday,
                    wednesday: rec.wednesday,
                    thursday: rec.thursday,
                    friday: rec.friday,
                    saturday: rec.saturday,
                    sunday: rec.sunday,
                },
                start_date: parse_date(rec.start_date.as_deref()),
                end_date: parse_date(rec.end_date.as_deref()),

                extra_days: BTreeSet::new(),
                removed_days: BTreeSet::new(),
            },
        );
    }

    let partial: Vec<&ServiceID> = calendar
        .services
        .values()
        .filter(|s| s.service_type() == ServiceType::Weekday && !s.days_of_week.weekday())
        .map(|s| &s.service_id)
        .collect();
    if !partial.is_empty() {
        info!(
            "{} services don't run every weekday, but still use the weekday timetable: {:?}",
            partial.len(),
            partial
        );
    }
    Ok(calendar)
}

pub fn load_exceptions(calendar: &mut Calendar, table: &Table) -> Result<()> {
    let mut unknown = 0;
    for rec in table.deserialize() {
        let rec: DateRecord = rec?;
        let service = if let Some(x) = calendar.services.get_mut(&rec.service_id) {
            x
        } else {
            unknown += 1;
            continue;
        };
        let date = match parse_date(Some(&rec.date)) {
            Some(x) => x,
            None => {
                warn!("Skipping exception for {:?} with bad date {:?}", rec.service_id, rec.date);
                continue;
            }
        };
        match rec.exception_type.as_str() {
            "1" => {
                service.extra_days.insert(date);
            }
            "2" => {
                service.removed_days.insert(date);
            }
            x => warn!("Unknown exception_type {x:?} for {:?}", rec.service_id),
        }
    }
    if unknown > 0 {
        warn!("{unknown} calendar exceptions reference unknown services");
    }
    Ok(())
}

fn parse_date(x: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(x?, "%Y%m%d").ok()
}

#[derive(Deserialize)]
struct Record {
    service_id: ServiceID,
    #[serde(default, deserialize_with = "parse_flag")]
    monday: bool,
    #[serde(default, deserialize_with = "parse_flag")]
    tuesday: bool,
    #[serde(default, deserialize_with = "parse_flag")]
    wednesday: bool,
    #[serde(default, deserialize_with = "parse_flag")]
    thursday: bool,
    #[serde(default, deserialize_with = "parse_flag")]
    friday: bool,
    #[serde(default, deserialize_with = "parse_flag")]
    saturday: bool,
    #[serde(default, deserialize_with = "parse_flag")]
    sunday: bool,
    start_date: Option<String>,
    end_date: Option<String>,
}

// Anything other than exactly "1" means the day doesn't operate
fn parse_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let x = <Option<String>>::deserialize(d)?;
    Ok(x.as_deref() == Some("1"))
}

#[derive(Deserialize)]
struct DateRecord {
    service_id: ServiceID,
    date: String,
    exception_type: String,
}
