//! Calendar bucketing.
//!
//! Irregularly sampled products are compared by mapping every date onto a
//! coarse [`Period`] (a quarter or a year) and walking the contiguous range of
//! periods between two dates.

use crate::series::SeriesSet;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Size of the calendar buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Quarter,
    Year,
}

impl Granularity {
    /// Maps a date to the period containing it.
    pub fn period_of(&self, date: NaiveDate) -> Period {
        match self {
            Granularity::Quarter => Period::quarter(date.year(), (date.month0() / 3 + 1) as u8),
            Granularity::Year => Period::year(date.year()),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Quarter => write!(f, "quarter"),
            Granularity::Year => write!(f, "year"),
        }
    }
}

impl FromStr for Granularity {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quarter" | "quarterly" | "q" => Ok(Granularity::Quarter),
            "year" | "yearly" | "annual" | "y" => Ok(Granularity::Year),
            _ => Err(ParsePeriodError(s.to_string())),
        }
    }
}

/// A calendar bucket labelled `Q<1-4>-<year>` or `<year>`.
///
/// Periods order by year, then by quarter within the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Period {
    year: i32,
    // 1-4 for quarters, 0 for whole years
    index: u8,
    granularity: Granularity,
}

impl Period {
    /// Creates a quarter period. `quarter` is clamped to 1..=4.
    pub fn quarter(year: i32, quarter: u8) -> Self {
        Period {
            year,
            index: quarter.clamp(1, 4),
            granularity: Granularity::Quarter,
        }
    }

    pub fn year(year: i32) -> Self {
        Period {
            year,
            index: 0,
            granularity: Granularity::Year,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn calendar_year(&self) -> i32 {
        self.year
    }

    /// Quarter number (1-4) for quarter periods, `None` for year periods.
    pub fn quarter_index(&self) -> Option<u8> {
        match self.granularity {
            Granularity::Quarter => Some(self.index),
            Granularity::Year => None,
        }
    }

    /// The period immediately after this one; Q4 rolls into Q1 of the next year.
    pub fn next(&self) -> Period {
        match self.granularity {
            Granularity::Quarter if self.index >= 4 => Period::quarter(self.year + 1, 1),
            Granularity::Quarter => Period::quarter(self.year, self.index + 1),
            Granularity::Year => Period::year(self.year + 1),
        }
    }

    /// Whether `date` falls inside this period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.granularity.period_of(date) == *self
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.granularity {
            Granularity::Quarter => write!(f, "Q{}-{}", self.index, self.year),
            Granularity::Year => write!(f, "{}", self.year),
        }
    }
}

/// Error returned when a period or granularity label cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePeriodError(pub String);

impl fmt::Display for ParsePeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid period label: '{}'", self.0)
    }
}

impl std::error::Error for ParsePeriodError {}

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePeriodError(s.to_string());

        if let Some(rest) = s.strip_prefix('Q') {
            let (quarter, year) = rest.split_once('-').ok_or_else(err)?;
            let quarter: u8 = quarter.parse().map_err(|_| err())?;
            if !(1..=4).contains(&quarter) {
                return Err(err());
            }
            let year: i32 = year.parse().map_err(|_| err())?;
            return Ok(Period::quarter(year, quarter));
        }

        s.parse::<i32>().map(Period::year).map_err(|_| err())
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

impl TryFrom<String> for Period {
    type Error = ParsePeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Every period from the one containing `from` through the one containing
/// `to`, inclusive. Empty when `from` is after `to`.
pub fn enumerate_periods(granularity: Granularity, from: NaiveDate, to: NaiveDate) -> Vec<Period> {
    if from > to {
        return Vec::new();
    }

    let last = granularity.period_of(to);
    let mut current = granularity.period_of(from);
    let mut periods = Vec::new();

    while current <= last {
        periods.push(current);
        current = current.next();
    }

    periods
}

/// The shared period range of a run: from the earliest to the latest
/// observation across every product in the set.
pub fn global_period_range(granularity: Granularity, series: &SeriesSet) -> Vec<Period> {
    match series.date_span() {
        Some((start, end)) => enumerate_periods(granularity, start, end),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_quarter_bucketing() {
        let q = Granularity::Quarter;
        assert_eq!(q.period_of(date(2023, 5, 15)).to_string(), "Q2-2023");
        assert_eq!(q.period_of(date(2023, 12, 31)).to_string(), "Q4-2023");
        assert_eq!(q.period_of(date(2023, 1, 1)).to_string(), "Q1-2023");
        assert_eq!(q.period_of(date(2023, 3, 31)).to_string(), "Q1-2023");
        assert_eq!(q.period_of(date(2023, 7, 1)).to_string(), "Q3-2023");
    }

    #[test]
    fn test_year_bucketing() {
        let period = Granularity::Year.period_of(date(2023, 5, 15));
        assert_eq!(period.to_string(), "2023");
        assert_eq!(period.quarter_index(), None);
    }

    #[test]
    fn test_quarter_steps_past_q4() {
        let q4: Period = "Q4-2022".parse().unwrap();
        assert_eq!(q4.next().to_string(), "Q1-2023");
        assert_eq!(Period::quarter(2022, 2).next(), Period::quarter(2022, 3));
        assert_eq!(Period::year(2022).next(), Period::year(2023));
    }

    #[test]
    fn test_period_ordering() {
        assert!(Period::quarter(2022, 4) < Period::quarter(2023, 1));
        assert!(Period::quarter(2023, 1) < Period::quarter(2023, 2));
        assert!(Period::year(2022) < Period::year(2023));
    }

    #[test]
    fn test_enumerate_periods_inclusive() {
        let periods = enumerate_periods(Granularity::Quarter, date(2022, 11, 3), date(2023, 8, 1));
        let labels: Vec<String> = periods.iter().map(Period::to_string).collect();
        assert_eq!(labels, vec!["Q4-2022", "Q1-2023", "Q2-2023", "Q3-2023"]);

        let years = enumerate_periods(Granularity::Year, date(2020, 6, 1), date(2022, 1, 1));
        assert_eq!(years.len(), 3);
    }

    #[test]
    fn test_enumerate_periods_single_and_reversed() {
        let single = enumerate_periods(Granularity::Quarter, date(2023, 4, 1), date(2023, 6, 30));
        assert_eq!(single, vec![Period::quarter(2023, 2)]);
        assert!(enumerate_periods(Granularity::Quarter, date(2024, 1, 1), date(2023, 1, 1)).is_empty());
    }

    #[test]
    fn test_parse_period_labels() {
        assert_eq!("Q3-2021".parse::<Period>().unwrap(), Period::quarter(2021, 3));
        assert_eq!("2021".parse::<Period>().unwrap(), Period::year(2021));
        assert!("Q5-2021".parse::<Period>().is_err());
        assert!("Q2 - 2021".parse::<Period>().is_err());
        assert!("spring".parse::<Period>().is_err());
    }

    #[test]
    fn test_period_serializes_as_label() {
        let json = serde_json::to_string(&Period::quarter(2023, 2)).unwrap();
        assert_eq!(json, "\"Q2-2023\"");
        let back: Period = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Period::quarter(2023, 2));
    }

    #[test]
    fn test_parse_granularity() {
        assert_eq!("quarter".parse::<Granularity>().unwrap(), Granularity::Quarter);
        assert_eq!("Year".parse::<Granularity>().unwrap(), Granularity::Year);
        assert!("weekly".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_contains() {
        let period = Period::quarter(2023, 2);
        assert!(period.contains(date(2023, 4, 1)));
        assert!(!period.contains(date(2023, 7, 1)));
    }
}
