//! Core domain logic for the duty calendar.
//!
//! The crate owns the roster store, the month-grid engine and invite export.
//! FFI and CLI crates are thin adapters on top of it.

pub mod calendar;
pub mod config;
pub mod db;
pub mod invite;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use calendar::clock::{Clock, FixedClock, SystemClock};
pub use calendar::grid::{compute_month_grid, CalendarCell, GridMonth, WeekStart};
pub use calendar::group::{group_by_rubric, DutyGroup, UnknownRubricError};
pub use calendar::index::DutyIndex;
pub use calendar::palette::RubricPalette;
pub use config::{ConfigError, DutycalConfig};
pub use invite::ics::{invite_file_name, render_ics, Organizer};
pub use invite::window::{compute_window, InvitePolicy, InviteWindow};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::date::{CalendarDate, InvalidDateError};
pub use model::duty::{Duty, DutyId, DutyPatch, DutyWithUser};
pub use model::snapshot::RosterSnapshot;
pub use model::user::{User, UserId, UserPatch, UserRole};
pub use model::ModelValidationError;
pub use repo::{RepoError, RepoResult};
pub use service::calendar_service::{
    CalendarService, CalendarServiceError, DayView, DutyEntryView, InviteExport, MonthView,
    RubricGroupView,
};
pub use service::roster_service::{
    NewUser, RosterServiceError, RosterUpdate, SqliteRosterService,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
