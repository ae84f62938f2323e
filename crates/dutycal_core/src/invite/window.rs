//! Invite time window for one duty.
//!
//! # Invariants
//! - Times are local wall-clock values; no timezone conversion happens.
//! - With the overnight policy the window always spans 14 hours and crosses
//!   exactly one midnight.
//! - Invalid dates never produce a window.

use crate::model::date::{CalendarDate, InvalidDateError};
use crate::model::duty::Duty;
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

/// Start/end hours and reminder lead time of a duty shift.
///
/// When `end_hour <= start_hour` the shift ends on the following day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvitePolicy {
    pub start_hour: u32,
    pub end_hour: u32,
    pub reminder_minutes: u32,
}

impl InvitePolicy {
    /// Evening-to-morning shift: 18:00 to 08:00 next day, reminder 2 hours ahead.
    pub const OVERNIGHT: InvitePolicy = InvitePolicy {
        start_hour: 18,
        end_hour: 8,
        reminder_minutes: 120,
    };

    pub fn ends_next_day(&self) -> bool {
        self.end_hour <= self.start_hour
    }
}

impl Default for InvitePolicy {
    fn default() -> Self {
        Self::OVERNIGHT
    }
}

/// Derived invite timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InviteWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub reminder_offset_minutes: u32,
}

impl InviteWindow {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Instant at which the reminder fires.
    pub fn reminder_at(&self) -> NaiveDateTime {
        self.start - Duration::minutes(i64::from(self.reminder_offset_minutes))
    }

    /// `[year, month, day, hour, minute]` of `start`.
    pub fn start_parts(&self) -> [i32; 5] {
        date_time_parts(&self.start)
    }

    /// `[year, month, day, hour, minute]` of `end`.
    pub fn end_parts(&self) -> [i32; 5] {
        date_time_parts(&self.end)
    }
}

/// Computes the invite window of `duty` under the overnight policy.
pub fn compute_window(duty: &Duty) -> Result<InviteWindow, InvalidDateError> {
    compute_window_with(duty.date, InvitePolicy::OVERNIGHT)
}

/// Computes the invite window for a raw `YYYY-MM-DD` duty date.
pub fn compute_window_for_text(
    date: &str,
    policy: InvitePolicy,
) -> Result<InviteWindow, InvalidDateError> {
    compute_window_with(CalendarDate::parse(date)?, policy)
}

/// Computes the invite window of a duty dated `date` under `policy`.
pub fn compute_window_with(
    date: CalendarDate,
    policy: InvitePolicy,
) -> Result<InviteWindow, InvalidDateError> {
    let start_time = hour_of_day(policy.start_hour)?;
    let end_time = hour_of_day(policy.end_hour)?;

    let end_date = if policy.ends_next_day() {
        date.succ().ok_or_else(|| {
            InvalidDateError::OutOfRange(format!("no calendar day after {date}"))
        })?
    } else {
        date
    };

    Ok(InviteWindow {
        start: date.as_naive().and_time(start_time),
        end: end_date.as_naive().and_time(end_time),
        reminder_offset_minutes: policy.reminder_minutes,
    })
}

fn hour_of_day(hour: u32) -> Result<NaiveTime, InvalidDateError> {
    NaiveTime::from_hms_opt(hour, 0, 0)
        .ok_or_else(|| InvalidDateError::OutOfRange(format!("hour {hour} is not in 0..=23")))
}

fn date_time_parts(value: &NaiveDateTime) -> [i32; 5] {
    [
        value.year(),
        value.month() as i32,
        value.day() as i32,
        value.hour() as i32,
        value.minute() as i32,
    ]
}

#[cfg(test)]
mod tests {
    use super::{compute_window, compute_window_for_text, compute_window_with, InvitePolicy};
    use crate::model::date::{CalendarDate, InvalidDateError};
    use crate::model::duty::Duty;
    use chrono::{Duration, NaiveDateTime, Timelike};
    use uuid::Uuid;

    fn at(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").expect("valid datetime")
    }

    #[test]
    fn overnight_window_for_mid_april() {
        let duty = Duty::new(
            Uuid::new_v4(),
            "Primary On-Call",
            CalendarDate::parse("2024-04-15").unwrap(),
        );
        let window = compute_window(&duty).unwrap();

        assert_eq!(window.start, at("2024-04-15T18:00"));
        assert_eq!(window.end, at("2024-04-16T08:00"));
        assert_eq!(window.reminder_offset_minutes, 120);
        assert_eq!(window.reminder_at(), at("2024-04-15T16:00"));
        assert_eq!(window.start_parts(), [2024, 4, 15, 18, 0]);
        assert_eq!(window.end_parts(), [2024, 4, 16, 8, 0]);
    }

    #[test]
    fn window_crosses_month_year_and_leap_boundaries() {
        for (day, next) in [
            ("2024-02-28", "2024-02-29T08:00"),
            ("2024-02-29", "2024-03-01T08:00"),
            ("2023-02-28", "2023-03-01T08:00"),
            ("2024-12-31", "2025-01-01T08:00"),
            ("2024-04-30", "2024-05-01T08:00"),
        ] {
            let window =
                compute_window_with(CalendarDate::parse(day).unwrap(), InvitePolicy::OVERNIGHT)
                    .unwrap();
            assert_eq!(window.end, at(next), "{day}");
            assert_eq!(window.duration(), Duration::hours(14));
            assert_eq!(window.start.hour(), 18);
            assert_eq!(window.end.hour(), 8);
        }
    }

    #[test]
    fn invalid_text_date_fails() {
        let err = compute_window_for_text("2024-02-30", InvitePolicy::OVERNIGHT)
            .expect_err("feb 30 has no window");
        assert!(matches!(err, InvalidDateError::NotARealDate { .. }));
        assert!(compute_window_for_text("15/04/2024", InvitePolicy::OVERNIGHT).is_err());
    }

    #[test]
    fn last_supported_day_has_no_next_morning() {
        let last = CalendarDate::parse("9999-12-31").unwrap();
        let err = compute_window_with(last, InvitePolicy::OVERNIGHT).unwrap_err();
        assert!(matches!(err, InvalidDateError::OutOfRange(_)));
    }

    #[test]
    fn same_day_policy_stays_on_duty_date() {
        let policy = InvitePolicy {
            start_hour: 9,
            end_hour: 17,
            reminder_minutes: 30,
        };
        let window =
            compute_window_with(CalendarDate::parse("2024-04-15").unwrap(), policy).unwrap();
        assert_eq!(window.end, at("2024-04-15T17:00"));
        assert_eq!(window.reminder_at(), at("2024-04-15T08:30"));
    }
}
