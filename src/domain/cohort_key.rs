//! Cohort keys: the ISO (year, week) a customer joined in.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CohortKeyError {
    #[error("cohort key must look like YYYY_WW, got {0:?}")]
    Malformed(String),
    #[error("week {week} does not exist in ISO year {year}")]
    NoSuchWeek { year: i32, week: u32 },
    #[error("the week containing {0} is outside the supported calendar range")]
    OutOfRange(NaiveDate),
}

/// ISO week identifier, rendered as the sortable token `YYYY_WW`.
///
/// Stored as the Monday that starts the week, so ordering is chronological
/// and every key maps to a real calendar week. Construction guarantees the
/// whole week, Monday through Sunday, is representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CohortKey(NaiveDate);

impl CohortKey {
    /// Build a key from an ISO week-year and week number (1..=53).
    pub fn new(year: i32, week: u32) -> Result<Self, CohortKeyError> {
        let monday = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
            .ok_or(CohortKeyError::NoSuchWeek { year, week })?;
        Self::from_date(monday)
    }

    /// The cohort a calendar date falls in.
    ///
    /// Fails only at the extremes of the calendar, where the week's Monday or
    /// Sunday cannot be represented.
    pub fn from_date(date: NaiveDate) -> Result<Self, CohortKeyError> {
        let offset = date.weekday().num_days_from_monday() as i64;
        let monday = date
            .checked_sub_signed(Duration::days(offset))
            .ok_or(CohortKeyError::OutOfRange(date))?;
        monday
            .checked_add_signed(Duration::days(6))
            .ok_or(CohortKeyError::OutOfRange(date))?;
        Ok(CohortKey(monday))
    }

    /// The cohort a UTC timestamp falls in.
    pub fn from_datetime(at: &DateTime<Utc>) -> Result<Self, CohortKeyError> {
        Self::from_date(at.date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0.iso_week().year()
    }

    pub fn week(&self) -> u32 {
        self.0.iso_week().week()
    }

    /// Monday of the cohort week.
    pub fn week_start(&self) -> NaiveDate {
        self.0
    }

    /// Sunday of the cohort week.
    pub fn week_end(&self) -> NaiveDate {
        self.0
            .checked_add_signed(Duration::days(6))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Human label for the week, `M/DD - M/DD`.
    pub fn date_range_label(&self) -> String {
        format!(
            "{} - {}",
            self.week_start().format("%-m/%d"),
            self.week_end().format("%-m/%d")
        )
    }
}

impl std::fmt::Display for CohortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}_{:02}", self.year(), self.week())
    }
}

impl FromStr for CohortKey {
    type Err = CohortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CohortKeyError::Malformed(s.to_string());
        let (year, week) = s.trim().split_once('_').ok_or_else(malformed)?;
        let year = year.parse::<i32>().map_err(|_| malformed())?;
        let week = week.parse::<u32>().map_err(|_| malformed())?;
        CohortKey::new(year, week)
    }
}

impl Serialize for CohortKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
