//! Command-line probe for `dutycal_core`.
//!
//! # Responsibility
//! - Verify core linkage (`ping`).
//! - Render a month grid as plain text.
//! - Write a single duty's `.ics` invite to disk.

use clap::{Parser, Subcommand};
use dutycal_core::db::open_db;
use dutycal_core::logging::init_from_config;
use dutycal_core::{
    CalendarDate, CalendarService, DutycalConfig, MonthView, RosterSnapshot, SqliteRosterService,
    WeekStart,
};
use log::info;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use uuid::Uuid;

/// Duty calendar tools.
#[derive(Parser)]
#[command(name = "dutycal")]
#[command(about = "Duty calendar month grids and invites", long_about = None)]
struct Cli {
    /// Config file (defaults to ./dutycal.toml when present)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core ping and version.
    Ping,

    /// Print the month grid for YYYY-MM with per-day duty counts.
    Grid {
        #[arg(short, long)]
        month: String,

        /// Start weeks on Monday instead of the configured day
        #[arg(long)]
        monday: bool,

        /// Roster database (defaults to `database.path` from config)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Write the .ics invite for one duty.
    Invite {
        /// Roster database (defaults to `database.path` from config)
        #[arg(long)]
        db: Option<PathBuf>,

        #[arg(long)]
        duty: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Grid { .. } => "grid",
            Self::Invite { .. } => "invite",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = DutycalConfig::load(cli.config.as_deref())?;
    init_from_config(&config.logging)?;
    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );

    match cli.command {
        Commands::Ping => {
            println!("dutycal_core ping={}", dutycal_core::ping());
            println!("dutycal_core version={}", dutycal_core::core_version());
        }
        Commands::Grid { month, monday, db } => {
            if monday {
                config.calendar.week_start = WeekStart::Monday;
            }
            let target = CalendarDate::parse_month(month.trim())?;
            let snapshot = load_snapshot(&db_path(db, &config))?;
            let view = CalendarService::from_config(&config).month_view(&snapshot, target);
            print!("{}", render_grid(&view));
        }
        Commands::Invite { db, duty, out } => {
            let id = Uuid::parse_str(duty.trim())?;
            let snapshot = load_snapshot(&db_path(db, &config))?;
            let export = CalendarService::from_config(&config).export_invite(&snapshot, id)?;
            let path = out.join(&export.file_name);
            std::fs::write(&path, export.content)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn db_path(flag: Option<PathBuf>, config: &DutycalConfig) -> PathBuf {
    flag.unwrap_or_else(|| config.database.file_path())
}

fn load_snapshot(path: &Path) -> Result<RosterSnapshot, Box<dyn Error>> {
    let conn = open_db(path)?;
    let roster = SqliteRosterService::open(&conn)?;
    Ok(roster.snapshot()?)
}

/// Fixed-width text grid: padding days in parentheses, today marked `*`,
/// duty counts as `+n`.
fn render_grid(view: &MonthView) -> String {
    let mut out = format!("{}\n", view.title);
    for label in &view.weekday_labels {
        out.push_str(&format!("{label:>7}"));
    }
    out.push('\n');

    for week in view.weeks() {
        for day in week {
            let mark = if day.is_today { "*" } else { " " };
            let cell = if !day.is_in_target_month {
                format!("({})", day.day)
            } else if day.duty_count > 0 {
                format!("{}+{}", day.day, day.duty_count)
            } else {
                day.day.to_string()
            };
            out.push_str(&format!("{cell:>6}{mark}"));
        }
        out.push('\n');
    }

    for warning in &view.warnings {
        out.push_str(&format!("warning: {warning}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{db_path, render_grid};
    use dutycal_core::model::rubric::DEFAULT_RUBRICS;
    use dutycal_core::{
        CalendarDate, CalendarService, Duty, DutyWithUser, DutycalConfig, FixedClock,
        RosterSnapshot, User, UserRole,
    };
    use std::path::PathBuf;

    fn date(value: &str) -> CalendarDate {
        CalendarDate::parse(value).unwrap()
    }

    #[test]
    fn april_2024_grid_marks_padding_today_and_duty_counts() {
        let user = User::new("Al", "al@example.com", "", UserRole::User);
        let duty = DutyWithUser {
            duty: Duty::new(user.id, "Support", date("2024-04-15")),
            user: user.clone(),
        };
        let snapshot = RosterSnapshot::new(
            vec![user],
            DEFAULT_RUBRICS.map(String::from).to_vec(),
            vec![duty],
        );
        let service =
            CalendarService::with_clock(&DutycalConfig::default(), FixedClock::at(date("2024-04-10")));
        let text = render_grid(&service.month_view(&snapshot, date("2024-04-01")));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 7, "{text}");
        assert_eq!(lines[0], "April 2024");
        assert!(lines[1].starts_with("    Sun    Mon"));
        assert!(lines[2].starts_with("  (31)      1 "), "{}", lines[2]);
        assert!(lines[3].contains("    10*"), "{}", lines[3]);
        assert!(lines[4].contains("  15+1 "), "{}", lines[4]);
        assert!(lines[6].ends_with("   (4) "), "{}", lines[6]);
        assert!(!text.contains("warning:"));
    }

    #[test]
    fn db_flag_overrides_configured_path() {
        let mut config = DutycalConfig::default();
        config.database.path = "/srv/roster.sqlite3".to_string();

        assert_eq!(db_path(None, &config), PathBuf::from("/srv/roster.sqlite3"));
        assert_eq!(
            db_path(Some(PathBuf::from("other.sqlite3")), &config),
            PathBuf::from("other.sqlite3")
        );
    }
}
