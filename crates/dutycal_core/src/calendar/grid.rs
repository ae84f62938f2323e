//! Month grid synthesis.
//!
//! # Responsibility
//! - Expand one month into display cells padded to complete weeks.
//!
//! # Invariants
//! - Cell count is a multiple of 7.
//! - Consecutive cells are exactly one day apart.
//! - Every day of the target month appears exactly once, flagged in-month.
//! - `today` is supplied by the caller; no clock is read here.

use crate::model::date::CalendarDate;
use chrono::Weekday;
use serde::{Deserialize, Serialize};

pub const DAYS_PER_WEEK: usize = 7;

/// First column of each displayed week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            Self::Sunday => Weekday::Sun,
            Self::Monday => Weekday::Mon,
        }
    }

    /// Days between the start of the week and `date` (0..=6).
    pub fn offset_of(self, date: &CalendarDate) -> u32 {
        let from_sunday = date.weekday().num_days_from_sunday();
        match self {
            Self::Sunday => from_sunday,
            Self::Monday => (from_sunday + 6) % 7,
        }
    }

    /// Short weekday header labels in column order.
    pub fn labels(self) -> [&'static str; DAYS_PER_WEEK] {
        match self {
            Self::Sunday => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
            Self::Monday => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
        }
    }
}

/// One day's slot in the month view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCell {
    pub date: CalendarDate,
    pub is_in_target_month: bool,
    pub is_today: bool,
}

/// Ordered cells for one displayed month, always whole weeks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMonth {
    pub year: i32,
    pub month: u32,
    pub week_start: WeekStart,
    pub cells: Vec<CalendarCell>,
}

impl GridMonth {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn week_count(&self) -> usize {
        self.cells.len() / DAYS_PER_WEEK
    }

    /// Cells chunked into display rows of seven.
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(DAYS_PER_WEEK)
    }

    pub fn first_date(&self) -> Option<CalendarDate> {
        self.cells.first().map(|cell| cell.date)
    }

    pub fn last_date(&self) -> Option<CalendarDate> {
        self.cells.last().map(|cell| cell.date)
    }

    pub fn contains(&self, date: &CalendarDate) -> bool {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => first <= *date && *date <= last,
            _ => false,
        }
    }
}

/// Builds the display grid for the month containing `target`.
///
/// Padding days come from the adjacent months so the first row starts on
/// `week_start` and the last row ends the day before the next week start.
/// The loop runs to the computed end date, so a month that spills into a
/// sixth row yields 42 cells.
///
/// Callers pass months in `FIRST_GRID_MONTH..=LAST_GRID_MONTH` (what
/// `CalendarDate::parse_month` accepts). Outside it, padding cells fall in
/// year 0 or 10000 and no longer round-trip through serde.
pub fn compute_month_grid(
    target: CalendarDate,
    week_start: WeekStart,
    today: CalendarDate,
) -> GridMonth {
    let month_start = target.first_of_month();
    let month_end = target.last_of_month();
    let grid_start = month_start.offset_days(-i64::from(week_start.offset_of(&month_start)));
    let trailing = (DAYS_PER_WEEK as u32 - 1) - week_start.offset_of(&month_end);
    let grid_end = month_end.offset_days(i64::from(trailing));

    let span = grid_start.days_until(&grid_end);
    let mut cells = Vec::with_capacity(usize::try_from(span + 1).unwrap_or(0));
    let mut day = grid_start;
    while day <= grid_end {
        cells.push(CalendarCell {
            date: day,
            is_in_target_month: day.is_same_month(&target),
            is_today: day == today,
        });
        day = day.offset_days(1);
    }

    GridMonth {
        year: target.year(),
        month: target.month(),
        week_start,
        cells,
    }
}
