use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// A "YYYY-WW" key identifying an ISO calendar week. This is the join key
/// between the chart dataset and the weather datasets.
///
/// The year part is taken from whatever year the record itself carries, not
/// from the ISO week-numbering year, so a reading on 2021-01-01 (ISO week 53
/// of 2020) keys as `2021-53`.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

/// Errors produced when parsing a week key string.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum WeekKeyError {
    Format(String),
    WeekOutOfRange(u32),
}

impl fmt::Display for WeekKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekKeyError::Format(s) => write!(f, "week key must look like YYYY-WW, got {:?}", s),
            WeekKeyError::WeekOutOfRange(w) => write!(f, "week {} is outside 1..=53", w),
        }
    }
}

impl std::error::Error for WeekKeyError {}

impl WeekKey {
    pub fn new(year: i32, week: u32) -> Result<WeekKey, WeekKeyError> {
        if !(1..=53).contains(&week) {
            return Err(WeekKeyError::WeekOutOfRange(week));
        }
        Ok(WeekKey { year, week })
    }

    /// Key for a calendar date, pairing `year` with the ISO week number of
    /// `date`. The two are not reconciled at year boundaries.
    pub fn from_year_and_date(year: i32, date: &NaiveDate) -> WeekKey {
        WeekKey {
            year,
            week: date.iso_week().week(),
        }
    }

    /// Key for a calendar date using the date's own calendar year.
    pub fn from_date(date: &NaiveDate) -> WeekKey {
        WeekKey::from_year_and_date(date.year(), date)
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.week)
    }
}

impl FromStr for WeekKey {
    type Err = WeekKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year_str, week_str) = trimmed
            .split_once('-')
            .ok_or_else(|| WeekKeyError::Format(s.to_string()))?;
        if year_str.len() != 4 || week_str.is_empty() || week_str.len() > 2 {
            return Err(WeekKeyError::Format(s.to_string()));
        }
        let year = year_str
            .parse::<i32>()
            .map_err(|_| WeekKeyError::Format(s.to_string()))?;
        let week = week_str
            .parse::<u32>()
            .map_err(|_| WeekKeyError::Format(s.to_string()))?;
        WeekKey::new(year, week)
    }
}

impl Serialize for WeekKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
