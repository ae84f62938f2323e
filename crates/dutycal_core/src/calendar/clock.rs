//! Injected time source.
//!
//! Grid and invite code take dates as values; callers obtain them from a
//! `Clock` so tests can pin "today".

use crate::model::date::CalendarDate;
use chrono::{Local, NaiveDateTime, Utc};

pub trait Clock {
    /// Current local calendar date.
    fn today(&self) -> CalendarDate;
    /// Current UTC wall-clock time, used for `.ics` stamps.
    fn now_utc(&self) -> NaiveDateTime;
}

/// Reads the host clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> CalendarDate {
        CalendarDate::from_naive(Local::now().date_naive())
    }

    fn now_utc(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    today: CalendarDate,
    now_utc: NaiveDateTime,
}

impl FixedClock {
    pub fn new(today: CalendarDate, now_utc: NaiveDateTime) -> Self {
        Self { today, now_utc }
    }

    /// Pins both values to midnight of `today`.
    pub fn at(today: CalendarDate) -> Self {
        Self::new(today, today.as_naive().and_hms_opt(0, 0, 0).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn today(&self) -> CalendarDate {
        self.today
    }

    fn now_utc(&self) -> NaiveDateTime {
        self.now_utc
    }
}
