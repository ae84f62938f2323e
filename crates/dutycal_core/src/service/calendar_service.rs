//! Calendar read-side service: month views and invite export.
//!
//! # Responsibility
//! - Combine grid, index, grouping and palette into one `MonthView`.
//! - Produce `.ics` exports for single duties.
//!
//! # Invariants
//! - Works on a borrowed `RosterSnapshot` only; never touches the store.
//! - "Today" and the `.ics` stamp come from the injected `Clock`.

use crate::calendar::clock::{Clock, SystemClock};
use crate::calendar::grid::{compute_month_grid, WeekStart};
use crate::calendar::group::{find_unknown_rubrics, group_by_rubric, UnknownRubricError};
use crate::calendar::index::DutyIndex;
use crate::calendar::palette::RubricPalette;
use crate::config::{CalendarConfig, DutycalConfig, InviteConfig};
use crate::invite::ics::{invite_file_name, render_ics};
use crate::invite::window::compute_window_with;
use crate::model::date::{CalendarDate, InvalidDateError};
use crate::model::duty::{DutyId, DutyWithUser};
use crate::model::snapshot::RosterSnapshot;
use crate::model::user::UserId;
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum CalendarServiceError {
    DutyNotFound(DutyId),
    /// The duty date has no representable invite window.
    InvalidDate(InvalidDateError),
}

impl Display for CalendarServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DutyNotFound(id) => write!(f, "duty not found: {id}"),
            Self::InvalidDate(err) => write!(f, "cannot build invite: {err}"),
        }
    }
}

impl Error for CalendarServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDate(err) => Some(err),
            Self::DutyNotFound(_) => None,
        }
    }
}

impl From<InvalidDateError> for CalendarServiceError {
    fn from(value: InvalidDateError) -> Self {
        Self::InvalidDate(value)
    }
}

/// One rendered month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthView {
    /// e.g. `"April 2024"`.
    pub title: String,
    pub year: i32,
    pub month: u32,
    pub week_start: WeekStart,
    pub weekday_labels: Vec<String>,
    pub days: Vec<DayView>,
    /// Duties in the target month, padding days excluded.
    pub duty_count_in_month: usize,
    /// Duties shown in the grid whose rubric is not in the rubric list.
    pub warnings: Vec<UnknownRubricError>,
}

impl MonthView {
    pub fn weeks(&self) -> impl Iterator<Item = &[DayView]> {
        self.days.chunks(7)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayView {
    pub date: CalendarDate,
    pub day: u32,
    pub is_in_target_month: bool,
    pub is_today: bool,
    pub duty_count: usize,
    pub groups: Vec<RubricGroupView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RubricGroupView {
    pub rubric: String,
    pub palette_index: usize,
    pub color: String,
    pub duties: Vec<DutyEntryView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DutyEntryView {
    pub duty_id: DutyId,
    pub user_id: UserId,
    pub user_name: String,
}

/// A generated invite ready to be written or shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteExport {
    pub file_name: String,
    pub content: String,
}

pub struct CalendarService<C: Clock = SystemClock> {
    calendar: CalendarConfig,
    invite: InviteConfig,
    clock: C,
}

impl CalendarService<SystemClock> {
    /// Service reading the host clock.
    pub fn from_config(config: &DutycalConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> CalendarService<C> {
    pub fn with_clock(config: &DutycalConfig, clock: C) -> Self {
        Self {
            calendar: config.calendar.clone(),
            invite: config.invite.clone(),
            clock,
        }
    }

    pub fn today(&self) -> CalendarDate {
        self.clock.today()
    }

    /// Builds the view of the month containing `target`.
    pub fn month_view(&self, snapshot: &RosterSnapshot, target: CalendarDate) -> MonthView {
        let week_start = self.calendar.week_start;
        let grid = compute_month_grid(target, week_start, self.clock.today());
        let index = DutyIndex::build(&snapshot.duties);
        let palette = RubricPalette::new(&self.calendar.palette, &snapshot.rubrics);

        let mut shown: Vec<&DutyWithUser> = Vec::new();
        let days = grid
            .cells
            .iter()
            .map(|cell| {
                let duties = index.duties_on(&cell.date);
                shown.extend(duties.iter().copied());
                let groups = group_by_rubric(duties.iter().copied())
                    .into_iter()
                    .map(|group| RubricGroupView {
                        rubric: group.rubric.to_string(),
                        palette_index: palette.index_for(group.rubric),
                        color: palette.color_for(group.rubric).to_string(),
                        duties: group
                            .duties
                            .iter()
                            .map(|duty| DutyEntryView {
                                duty_id: duty.id(),
                                user_id: duty.user.id,
                                user_name: duty.user.name.clone(),
                            })
                            .collect(),
                    })
                    .collect();
                DayView {
                    date: cell.date,
                    day: cell.date.day(),
                    is_in_target_month: cell.is_in_target_month,
                    is_today: cell.is_today,
                    duty_count: duties.len(),
                    groups,
                }
            })
            .collect();

        let warnings = find_unknown_rubrics(shown, &snapshot.rubrics);
        if !warnings.is_empty() {
            warn!(
                "event=month_view module=calendar status=degraded unknown_rubric_duties={}",
                warnings.len()
            );
        }

        MonthView {
            title: target.month_title(),
            year: grid.year,
            month: grid.month,
            week_start,
            weekday_labels: week_start.labels().iter().map(|l| l.to_string()).collect(),
            days,
            duty_count_in_month: index.duties_in_month(grid.year, grid.month).len(),
            warnings,
        }
    }

    /// Renders the invite for duty `id`.
    pub fn export_invite(
        &self,
        snapshot: &RosterSnapshot,
        id: DutyId,
    ) -> Result<InviteExport, CalendarServiceError> {
        let duty = snapshot
            .duty(id)
            .ok_or(CalendarServiceError::DutyNotFound(id))?;
        self.render_invite(duty)
    }

    pub fn render_invite(&self, duty: &DutyWithUser) -> Result<InviteExport, CalendarServiceError> {
        let window = compute_window_with(duty.date(), self.invite.policy())?;
        let content = render_ics(
            duty,
            &window,
            &self.invite.organizer(),
            self.clock.now_utc(),
        );
        info!(
            "event=invite_export module=invite status=ok duty_id={} bytes={}",
            duty.id(),
            content.len()
        );
        Ok(InviteExport {
            file_name: invite_file_name(duty),
            content,
        })
    }
}
