//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose roster and calendar use cases to Dart via FRB.
//! - Flatten core types into plain string/number envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures are reported through `ok=false` plus a message, never by
//!   throwing.
//! - Each call opens its own connection; no connection is shared across
//!   calls.

use dutycal_core::db::open_db;
use dutycal_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CalendarDate, CalendarService, DayView, DutycalConfig, NewUser, RosterServiceError,
    RosterSnapshot, SqliteRosterService, UserRole,
};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static CONFIG: OnceLock<DutycalConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message on failure.
/// Repeating the call with the same `level + log_dir` is a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Outcome of a roster mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterActionResponse {
    pub ok: bool,
    /// ID of the created or affected record, when there is one.
    pub id: Option<String>,
    pub message: String,
}

impl RosterActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DutyItem {
    pub duty_id: String,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubricGroupItem {
    pub rubric: String,
    pub color: String,
    pub duties: Vec<DutyItem>,
}

/// One grid cell as shown by the month screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayItem {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub day: u32,
    pub is_in_target_month: bool,
    pub is_today: bool,
    pub duty_count: u32,
    pub groups: Vec<RubricGroupItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthViewResponse {
    pub ok: bool,
    pub message: String,
    pub title: String,
    pub weekday_labels: Vec<String>,
    pub days: Vec<DayItem>,
    pub warnings: Vec<String>,
}

impl MonthViewResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            title: String::new(),
            weekday_labels: Vec::new(),
            days: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubricListResponse {
    pub ok: bool,
    pub message: String,
    pub rubrics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteExportResponse {
    pub ok: bool,
    pub message: String,
    pub file_name: String,
    /// `.ics` document text.
    pub content: String,
}

/// Builds the month screen for `year_month` (`YYYY-MM`).
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn month_view(year_month: String) -> MonthViewResponse {
    let target = match CalendarDate::parse_month(year_month.trim()) {
        Ok(target) => target,
        Err(err) => return MonthViewResponse::failure(format!("month_view failed: {err}")),
    };
    let snapshot = match load_snapshot() {
        Ok(snapshot) => snapshot,
        Err(err) => return MonthViewResponse::failure(format!("month_view failed: {err}")),
    };

    let view = CalendarService::from_config(resolve_config()).month_view(&snapshot, target);
    MonthViewResponse {
        ok: true,
        message: format!("{} duty record(s) this month.", view.duty_count_in_month),
        title: view.title,
        weekday_labels: view.weekday_labels,
        days: view.days.into_iter().map(to_day_item).collect(),
        warnings: view.warnings.iter().map(ToString::to_string).collect(),
    }
}

/// Adds a roster member. `role` is `admin` or `user`.
#[flutter_rust_bridge::frb(sync)]
pub fn user_add(name: String, email: String, phone: String, role: String) -> RosterActionResponse {
    let role = match UserRole::parse(&role) {
        Ok(role) => role,
        Err(err) => return RosterActionResponse::failure(format!("user_add failed: {err}")),
    };
    let input = NewUser {
        name,
        email,
        phone,
        role,
    };
    match with_roster(|roster| roster.add_user(&input).map(|update| update.value)) {
        Ok(id) => RosterActionResponse::success("User added.", Some(id.to_string())),
        Err(err) => RosterActionResponse::failure(format!("user_add failed: {err}")),
    }
}

/// Assigns a user to a rubric on `date` (`YYYY-MM-DD`).
#[flutter_rust_bridge::frb(sync)]
pub fn duty_add(user_id: String, rubric: String, date: String) -> RosterActionResponse {
    let parsed = parse_id(&user_id).and_then(|user_id| {
        CalendarDate::parse(date.trim())
            .map(|date| (user_id, date))
            .map_err(|err| err.to_string())
    });
    let (user_id, date) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => return RosterActionResponse::failure(format!("duty_add failed: {err}")),
    };

    match with_roster(|roster| roster.add_duty(user_id, &rubric, date).map(|update| update.value))
    {
        Ok(id) => RosterActionResponse::success("Duty added.", Some(id.to_string())),
        Err(err) => RosterActionResponse::failure(format!("duty_add failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn duty_remove(duty_id: String) -> RosterActionResponse {
    let id = match parse_id(&duty_id) {
        Ok(id) => id,
        Err(err) => return RosterActionResponse::failure(format!("duty_remove failed: {err}")),
    };
    match with_roster(|roster| roster.remove_duty(id).map(|_| id)) {
        Ok(id) => RosterActionResponse::success("Duty removed.", Some(id.to_string())),
        Err(err) => RosterActionResponse::failure(format!("duty_remove failed: {err}")),
    }
}

/// Lists rubric names in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn rubric_list() -> RubricListResponse {
    match load_snapshot() {
        Ok(snapshot) => RubricListResponse {
            ok: true,
            message: format!("{} rubric(s).", snapshot.rubrics.len()),
            rubrics: snapshot.rubrics,
        },
        Err(err) => RubricListResponse {
            ok: false,
            message: format!("rubric_list failed: {err}"),
            rubrics: Vec::new(),
        },
    }
}

/// Renders the `.ics` invite for one duty.
#[flutter_rust_bridge::frb(sync)]
pub fn invite_export(duty_id: String) -> InviteExportResponse {
    let failure = |err: String| InviteExportResponse {
        ok: false,
        message: format!("invite_export failed: {err}"),
        file_name: String::new(),
        content: String::new(),
    };

    let id = match parse_id(&duty_id) {
        Ok(id) => id,
        Err(err) => return failure(err),
    };
    let snapshot = match load_snapshot() {
        Ok(snapshot) => snapshot,
        Err(err) => return failure(err),
    };
    match CalendarService::from_config(resolve_config()).export_invite(&snapshot, id) {
        Ok(export) => InviteExportResponse {
            ok: true,
            message: "Invite ready.".to_string(),
            file_name: export.file_name,
            content: export.content,
        },
        Err(err) => failure(err.to_string()),
    }
}

/// `database.path` from config; relative values live under the temp dir.
fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| db_path_from(resolve_config()))
        .clone()
}

fn db_path_from(config: &DutycalConfig) -> PathBuf {
    config.database.resolve_under(&std::env::temp_dir())
}

fn resolve_config() -> &'static DutycalConfig {
    CONFIG.get_or_init(|| {
        DutycalConfig::load(None).unwrap_or_else(|err| {
            warn!("event=config_load module=ffi status=fallback error={}", err);
            DutycalConfig::default()
        })
    })
}

fn parse_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid id `{}`", raw.trim()))
}

fn with_roster<T>(
    f: impl FnOnce(&SqliteRosterService<'_>) -> Result<T, RosterServiceError>,
) -> Result<T, String> {
    let conn = open_db(resolve_db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    let roster =
        SqliteRosterService::open(&conn).map_err(|err| format!("roster init failed: {err}"))?;
    f(&roster).map_err(|err| err.to_string())
}

fn load_snapshot() -> Result<RosterSnapshot, String> {
    with_roster(|roster| roster.snapshot())
}

fn to_day_item(day: DayView) -> DayItem {
    DayItem {
        date: day.date.to_string(),
        day: day.day,
        is_in_target_month: day.is_in_target_month,
        is_today: day.is_today,
        duty_count: u32::try_from(day.duty_count).unwrap_or(u32::MAX),
        groups: day
            .groups
            .into_iter()
            .map(|group| RubricGroupItem {
                rubric: group.rubric,
                color: group.color,
                duties: group
                    .duties
                    .into_iter()
                    .map(|duty| DutyItem {
                        duty_id: duty.duty_id.to_string(),
                        user_name: duty.user_name,
                    })
                    .collect(),
            })
            .collect(),
    }
}
