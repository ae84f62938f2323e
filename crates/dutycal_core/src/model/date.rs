//! Naive calendar date used as the key of every duty, grid cell and lookup.
//!
//! # Responsibility
//! - Parse and format the canonical `YYYY-MM-DD` text form.
//! - Provide the month/week arithmetic needed by grid synthesis.
//!
//! # Invariants
//! - A `CalendarDate` never carries a time-of-day or timezone component.
//! - Ordering is chronological, which equals componentwise (year, month, day).
//! - Public constructors only accept years in `MIN_YEAR..=MAX_YEAR`.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Smallest year accepted from external input.
pub const MIN_YEAR: i32 = 1;
/// Largest year accepted from external input; keeps the text form four digits wide.
pub const MAX_YEAR: i32 = 9999;
/// Earliest `(year, month)` whose grid padding stays inside the year range.
pub const FIRST_GRID_MONTH: (i32, u32) = (MIN_YEAR, 2);
/// Latest `(year, month)` whose grid padding stays inside the year range.
pub const LAST_GRID_MONTH: (i32, u32) = (MAX_YEAR, 11);

/// Malformed or out-of-range calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidDateError {
    /// Text is not shaped like `YYYY-MM-DD`.
    Malformed(String),
    /// Components are well-formed but name no real day (e.g. Feb 30).
    NotARealDate { year: i32, month: u32, day: u32 },
    /// Year falls outside `MIN_YEAR..=MAX_YEAR`, or arithmetic left that range.
    OutOfRange(String),
}

impl Display for InvalidDateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => {
                write!(f, "invalid date `{value}`: expected YYYY-MM-DD")
            }
            Self::NotARealDate { year, month, day } => write!(
                f,
                "invalid date {year:04}-{month:02}-{day:02}: no such calendar day"
            ),
            Self::OutOfRange(details) => write!(f, "date out of supported range: {details}"),
        }
    }
}

impl Error for InvalidDateError {}

/// Year/month/day triple with no time or zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Builds a date from components, rejecting impossible days.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, InvalidDateError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(InvalidDateError::OutOfRange(format!(
                "year {year} not in {MIN_YEAR}..={MAX_YEAR}"
            )));
        }
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or(InvalidDateError::NotARealDate { year, month, day })
    }

    /// Parses the strict canonical `YYYY-MM-DD` form.
    pub fn parse(value: &str) -> Result<Self, InvalidDateError> {
        let malformed = || InvalidDateError::Malformed(value.to_string());
        let mut parts = value.split('-');
        let (Some(y), Some(m), Some(d), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };
        if y.len() != 4 || m.len() != 2 || d.len() != 2 {
            return Err(malformed());
        }
        if ![y, m, d]
            .iter()
            .all(|part| part.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(malformed());
        }

        let year = y.parse::<i32>().map_err(|_| malformed())?;
        let month = m.parse::<u32>().map_err(|_| malformed())?;
        let day = d.parse::<u32>().map_err(|_| malformed())?;
        Self::from_ymd(year, month, day)
    }

    /// Parses a `YYYY-MM` month key into the first day of that month.
    ///
    /// Only `FIRST_GRID_MONTH..=LAST_GRID_MONTH` is accepted: the grids of
    /// `0001-01` and `9999-12` would pad into year 0 or year 10000.
    pub fn parse_month(value: &str) -> Result<Self, InvalidDateError> {
        let first = match value.split_once('-') {
            Some((_, month)) if !month.contains('-') => Self::parse(&format!("{value}-01"))
                .map_err(|err| match err {
                    InvalidDateError::Malformed(_) => InvalidDateError::Malformed(value.to_string()),
                    other => other,
                })?,
            _ => return Err(InvalidDateError::Malformed(value.to_string())),
        };
        let key = (first.year(), first.month());
        if !(FIRST_GRID_MONTH..=LAST_GRID_MONTH).contains(&key) {
            return Err(InvalidDateError::OutOfRange(format!(
                "month {value} has no grid inside {MIN_YEAR}..={MAX_YEAR}"
            )));
        }
        Ok(first)
    }

    /// Wraps a chrono date without range checks. Internal arithmetic only.
    pub(crate) fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Returns `true` when both dates fall in the same year and month.
    pub fn is_same_month(&self, other: &CalendarDate) -> bool {
        self.year() == other.year() && self.month() == other.month()
    }

    /// First day of this date's month.
    pub fn first_of_month(&self) -> CalendarDate {
        // Day 1 exists in every month.
        Self(self.0.with_day(1).unwrap_or(self.0))
    }

    /// Last day of this date's month.
    pub fn last_of_month(&self) -> CalendarDate {
        let first = self.first_of_month().0;
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next_first| next_first.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self(last)
    }

    /// Number of days in this date's month.
    pub fn days_in_month(&self) -> u32 {
        self.last_of_month().day()
    }

    /// Next calendar day, or `None` past the supported year range.
    pub fn succ(&self) -> Option<CalendarDate> {
        self.0
            .succ_opt()
            .filter(|next| next.year() <= MAX_YEAR)
            .map(Self)
    }

    /// Previous calendar day, or `None` before the supported year range.
    pub fn pred(&self) -> Option<CalendarDate> {
        self.0
            .pred_opt()
            .filter(|prev| prev.year() >= MIN_YEAR)
            .map(Self)
    }

    /// Shifts by whole days in either direction without range checks.
    pub(crate) fn offset_days(&self, days: i64) -> CalendarDate {
        let shifted = if days >= 0 {
            self.0.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.0.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        Self(shifted.unwrap_or(if days >= 0 {
            NaiveDate::MAX
        } else {
            NaiveDate::MIN
        }))
    }

    /// Adds (or subtracts) whole months, clamping the day to the target month length.
    ///
    /// `2024-01-31 + 1 month == 2024-02-29`.
    pub fn add_months(&self, months: i32) -> Result<CalendarDate, InvalidDateError> {
        let shifted = if months >= 0 {
            self.0.checked_add_months(Months::new(months.unsigned_abs()))
        } else {
            self.0.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        match shifted {
            Some(date) if (MIN_YEAR..=MAX_YEAR).contains(&date.year()) => Ok(Self(date)),
            _ => Err(InvalidDateError::OutOfRange(format!(
                "{self} shifted by {months} month(s)"
            ))),
        }
    }

    pub fn next_month(&self) -> Result<CalendarDate, InvalidDateError> {
        self.add_months(1)
    }

    pub fn previous_month(&self) -> Result<CalendarDate, InvalidDateError> {
        self.add_months(-1)
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(&self, other: &CalendarDate) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }

    /// Human month title, e.g. `April 2024`.
    pub fn month_title(&self) -> String {
        self.0.format("%B %Y").to_string()
    }
}

impl Display for CalendarDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl FromStr for CalendarDate {
    type Err = InvalidDateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = InvalidDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str())
    }
}

impl From<CalendarDate> for String {
    fn from(value: CalendarDate) -> Self {
        value.to_string()
    }
}
