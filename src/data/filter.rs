use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime, Weekday};
use log::{debug, warn};

use super::model::{TripDataset, TripRecord};
use crate::error::BikeshareError;

/// Token meaning "do not filter" for both months and days.
pub const ALL: &str = "all";

// ---------------------------------------------------------------------------
// Months
// ---------------------------------------------------------------------------

/// Months covered by the trip data, in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
}

impl Month {
    pub const ALL: [Month; 6] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
    ];

    /// 1-based calendar number (January = 1).
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "january",
            Month::February => "february",
            Month::March => "march",
            Month::April => "april",
            Month::May => "may",
            Month::June => "june",
        }
    }
}

/// Days in the order used for filtering (Monday = 0).
pub const DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

// ---------------------------------------------------------------------------
// Filter values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthFilter {
    #[default]
    All,
    Only(Month),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayFilter {
    #[default]
    All,
    Only(Weekday),
}

impl MonthFilter {
    /// Whether a trip touches the month at either end.
    pub fn matches(&self, start: &NaiveDateTime, end: &NaiveDateTime) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Only(m) => start.month() == m.number() || end.month() == m.number(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MonthFilter::All => ALL,
            MonthFilter::Only(m) => m.name(),
        }
    }
}

impl DayFilter {
    /// Whether a trip touches the weekday at either end.
    pub fn matches(&self, start: &NaiveDateTime, end: &NaiveDateTime) -> bool {
        match self {
            DayFilter::All => true,
            DayFilter::Only(d) => {
                let idx = d.num_days_from_monday();
                start.weekday().num_days_from_monday() == idx
                    || end.weekday().num_days_from_monday() == idx
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DayFilter::All => ALL,
            DayFilter::Only(d) => day_name(*d),
        }
    }
}

impl FromStr for MonthFilter {
    type Err = BikeshareError;

    /// Case-insensitive; blank input means `all`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        if token.is_empty() || token == ALL {
            return Ok(MonthFilter::All);
        }
        Month::ALL
            .iter()
            .find(|m| m.name() == token)
            .map(|m| MonthFilter::Only(*m))
            .ok_or_else(|| {
                BikeshareError::Validation(format!("'{}' is not a valid month filter", s.trim()))
            })
    }
}

impl FromStr for DayFilter {
    type Err = BikeshareError;

    /// Case-insensitive; blank input means `all`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        if token.is_empty() || token == ALL {
            return Ok(DayFilter::All);
        }
        DAYS.iter()
            .find(|d| day_name(**d) == token)
            .map(|d| DayFilter::Only(*d))
            .ok_or_else(|| {
                BikeshareError::Validation(format!("'{}' is not a valid day filter", s.trim()))
            })
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Applying the filters
// ---------------------------------------------------------------------------

/// Month and day selection applied to a loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TripFilter {
    pub month: MonthFilter,
    pub day: DayFilter,
}

impl TripFilter {
    pub fn new(month: MonthFilter, day: DayFilter) -> Self {
        TripFilter { month, day }
    }

    /// A trip passes when it satisfies both the month and the day filter.
    pub fn matches(&self, record: &TripRecord) -> bool {
        self.month.matches(&record.start_time, &record.end_time)
            && self.day.matches(&record.start_time, &record.end_time)
    }

    /// Drop, in place, every trip that does not pass. Order is preserved.
    pub fn apply(&self, dataset: &mut TripDataset) {
        if *self == TripFilter::default() {
            debug!("No month/day filter requested, keeping {} trips", dataset.len());
            return;
        }

        let before = dataset.len();
        dataset.records.retain(|r| self.matches(r));
        debug!(
            "Filter month={} day={} kept {} of {} trips",
            self.month,
            self.day,
            dataset.len(),
            before
        );
        if dataset.is_empty() && before > 0 {
            warn!("No trips match month={} day={}", self.month, self.day);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FieldValue;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn trip(start: NaiveDateTime, end: NaiveDateTime) -> TripRecord {
        TripRecord {
            start_time: start,
            end_time: end,
            fields: vec![
                FieldValue::Text(start.to_string()),
                FieldValue::Text(end.to_string()),
            ],
        }
    }

    fn dataset(records: Vec<TripRecord>) -> TripDataset {
        TripDataset::new(vec!["Start Time".into(), "End Time".into()], records)
    }

    #[test]
    fn test_month_and_day_tokens() {
        assert_eq!("".parse::<MonthFilter>().unwrap(), MonthFilter::All);
        assert_eq!("  ".parse::<DayFilter>().unwrap(), DayFilter::All);
        assert_eq!("ALL".parse::<MonthFilter>().unwrap(), MonthFilter::All);
        assert_eq!(
            " March ".parse::<MonthFilter>().unwrap(),
            MonthFilter::Only(Month::March)
        );
        assert_eq!(
            "SUNDAY".parse::<DayFilter>().unwrap(),
            DayFilter::Only(Weekday::Sun)
        );
        assert!("july".parse::<MonthFilter>().is_err());
        assert!("mon".parse::<DayFilter>().is_err());
    }

    #[test]
    fn test_month_numbers_are_one_based() {
        assert_eq!(Month::January.number(), 1);
        assert_eq!(Month::June.number(), 6);
    }

    #[test]
    fn test_month_filter_keeps_trips_touching_the_month() {
        let crossing = trip(at(2017, 2, 28, 23, 50), at(2017, 3, 1, 0, 10));
        let april = trip(at(2017, 4, 3, 9, 0), at(2017, 4, 3, 9, 30));
        let mut ds = dataset(vec![crossing.clone(), april]);

        TripFilter::new(MonthFilter::Only(Month::March), DayFilter::All).apply(&mut ds);

        assert_eq!(ds.records, vec![crossing]);
    }

    #[test]
    fn test_day_filter_handles_midnight_crossing() {
        // 2017-01-01 was a Sunday.
        let sunday_night = trip(at(2017, 1, 1, 23, 50), at(2017, 1, 2, 0, 10));
        let tuesday = trip(at(2017, 1, 3, 12, 0), at(2017, 1, 3, 12, 25));
        let mut ds = dataset(vec![sunday_night.clone(), tuesday]);

        TripFilter::new(MonthFilter::All, DayFilter::Only(Weekday::Mon)).apply(&mut ds);

        assert_eq!(ds.records, vec![sunday_night]);
    }

    #[test]
    fn test_month_and_day_combined() {
        // Monday 2017-03-06 and Monday 2017-04-03.
        let march_monday = trip(at(2017, 3, 6, 8, 0), at(2017, 3, 6, 8, 20));
        let april_monday = trip(at(2017, 4, 3, 8, 0), at(2017, 4, 3, 8, 20));
        let march_friday = trip(at(2017, 3, 10, 8, 0), at(2017, 3, 10, 8, 20));
        let mut ds = dataset(vec![march_monday.clone(), april_monday, march_friday]);

        TripFilter::new(
            MonthFilter::Only(Month::March),
            DayFilter::Only(Weekday::Mon),
        )
        .apply(&mut ds);

        assert_eq!(ds.records, vec![march_monday]);
    }

    #[test]
    fn test_all_all_keeps_every_trip() {
        let records = vec![
            trip(at(2017, 1, 1, 0, 0), at(2017, 1, 1, 0, 5)),
            trip(at(2017, 6, 30, 23, 0), at(2017, 7, 1, 1, 0)),
        ];
        let mut ds = dataset(records.clone());
        TripFilter::default().apply(&mut ds);
        assert_eq!(ds.records, records);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(MonthFilter::Only(Month::May).to_string(), "may");
        assert_eq!(DayFilter::Only(Weekday::Wed).to_string(), "wednesday");
        assert_eq!(DayFilter::All.to_string(), "all");
    }
}
